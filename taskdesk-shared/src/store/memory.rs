/// In-process [`Store`]
///
/// Mirrors the PostgreSQL schema closely enough that services behave the
/// same against either backend:
///
/// - ids are assigned from 1 and never reused
/// - usernames are unique (exact, case-sensitive)
/// - lookup tables hold the seeded rows with ids 1..=3
/// - deleting a user deletes their tasks
/// - `updated_at` strictly increases on every task update
///
/// # Example
///
/// ```
/// use taskdesk_shared::models::role::Role;
/// use taskdesk_shared::models::user::CreateUser;
/// use taskdesk_shared::store::{memory::MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store
///     .insert_user(CreateUser {
///         username: "alice".into(),
///         password_hash: "hash".into(),
///         role: Role::User,
///     })
///     .await?;
/// assert_eq!(user.id, 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{LookupStore, Store, StoreError, StoreResult, TaskStore, UserStore};
use crate::models::lookup::LookupKind;
use crate::models::role::Role;
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{CreateUser, User};
use crate::tasks::filter::TaskFilter;

#[derive(Debug, Clone)]
struct TaskRow {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    status_id: i64,
    priority_id: i64,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, TaskRow>,
    next_user_id: i64,
    next_task_id: i64,
}

impl State {
    fn lookup_name(kind: LookupKind, id: i64) -> Option<&'static str> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        kind.seeded_names().get(index).copied()
    }

    fn join(&self, row: &TaskRow) -> StoreResult<Task> {
        let owner = self
            .users
            .get(&row.user_id)
            .ok_or_else(|| StoreError::MissingReference("user".to_string()))?;
        let status = Self::lookup_name(LookupKind::Status, row.status_id)
            .ok_or_else(|| StoreError::MissingReference("status".to_string()))?;
        let priority = Self::lookup_name(LookupKind::Priority, row.priority_id)
            .ok_or_else(|| StoreError::MissingReference("priority".to_string()))?;

        Ok(Task {
            id: row.id,
            user_id: row.user_id,
            title: row.title.clone(),
            description: row.description.clone(),
            status: status.to_string(),
            priority: priority.to_string(),
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
            owner: Some(owner.username.clone()),
        })
    }
}

/// Store backed by in-memory maps behind a `tokio` lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username".to_string()));
        }

        state.next_user_id += 1;
        let created = User {
            id: state.next_user_id,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            is_active: true,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn search_username(&self, query: &str) -> StoreResult<Option<i64>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;

        // BTreeMap iteration is id-ordered, so min_by_key keeps the lowest id on ties.
        let best = state
            .users
            .values()
            .filter_map(|u| {
                let name = u.username.to_lowercase();
                if !name.contains(&needle) {
                    return None;
                }
                let rank = if name == needle {
                    0
                } else if name.starts_with(&needle) {
                    1
                } else {
                    2
                };
                Some((rank, u.id))
            })
            .min_by_key(|(rank, _)| *rank);

        Ok(best.map(|(_, id)| id))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(match state.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                true
            }
            None => false,
        })
    }

    async fn set_role(&self, id: i64, role: Role) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(match state.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                true
            }
            None => false,
        })
    }

    async fn set_active(&self, id: i64, is_active: bool) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(match state.users.get_mut(&id) {
            Some(user) => {
                user.is_active = is_active;
                true
            }
            None => false,
        })
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.tasks.retain(|_, task| task.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&task.user_id) {
            return Err(StoreError::MissingReference("user".to_string()));
        }

        let now = Utc::now();
        state.next_task_id += 1;
        let row = TaskRow {
            id: state.next_task_id,
            user_id: task.user_id,
            title: task.title,
            description: task.description,
            status_id: task.status_id,
            priority_id: task.priority_id,
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
        };

        let joined = state.join(&row)?;
        state.tasks.insert(row.id, row);
        Ok(joined)
    }

    async fn task_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        let state = self.state.read().await;
        state.tasks.get(&id).map(|row| state.join(row)).transpose()
    }

    async fn query_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;

        let mut tasks = Vec::new();
        for row in state.tasks.values() {
            let task = state.join(row)?;
            if filter.matches(&task) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;

        let Some(current) = state.tasks.get(&id).cloned() else {
            return Ok(None);
        };

        let mut row = current.clone();
        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(due_date) = changes.due_date {
            row.due_date = due_date;
        }
        if let Some(status_id) = changes.status_id {
            row.status_id = status_id;
        }
        if let Some(priority_id) = changes.priority_id {
            row.priority_id = priority_id;
        }
        row.updated_at = Utc::now().max(current.updated_at + Duration::microseconds(1));

        let joined = state.join(&row)?;
        state.tasks.insert(id, row);
        Ok(Some(joined))
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        Ok(self.state.write().await.tasks.remove(&id).is_some())
    }
}

#[async_trait]
impl LookupStore for MemoryStore {
    async fn lookup_id(&self, kind: LookupKind, name: &str) -> StoreResult<Option<i64>> {
        Ok(kind
            .seeded_names()
            .iter()
            .position(|n| *n == name)
            .map(|index| index as i64 + 1))
    }

    async fn lookup_names(&self, kind: LookupKind) -> StoreResult<Vec<String>> {
        Ok(kind.seeded_names().iter().map(|n| n.to_string()).collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::filter::TaskPredicate;

    async fn add_user(store: &MemoryStore, name: &str) -> User {
        store
            .insert_user(CreateUser {
                username: name.to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap()
    }

    async fn add_task(store: &MemoryStore, user_id: i64, title: &str) -> Task {
        store
            .insert_task(NewTask {
                user_id,
                title: title.to_string(),
                description: String::new(),
                status_id: 1,
                priority_id: 2,
                due_date: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        add_user(&store, "alice").await;

        let err = store
            .insert_user(CreateUser {
                username: "alice".to_string(),
                password_hash: "other".to_string(),
                role: Role::User,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(field) if field == "username"));
    }

    #[tokio::test]
    async fn test_search_ranking() {
        let store = MemoryStore::new();
        let xbob = add_user(&store, "xbob").await;
        let bobby = add_user(&store, "Bobby").await;
        let bob = add_user(&store, "bob").await;

        assert_eq!(store.search_username("BOB").await.unwrap(), Some(bob.id));
        assert_eq!(store.search_username("bo").await.unwrap(), Some(bobby.id));
        assert_eq!(store.search_username("xb").await.unwrap(), Some(xbob.id));
        assert_eq!(store.search_username("ob").await.unwrap(), Some(xbob.id));
        assert_eq!(store.search_username("zed").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_task_joins_names() {
        let store = MemoryStore::new();
        let alice = add_user(&store, "alice").await;

        let task = add_task(&store, alice.id, "buy milk").await;
        assert_eq!(task.status, "pending");
        assert_eq!(task.priority, "medium");
        assert_eq!(task.owner.as_deref(), Some("alice"));
        assert_eq!(task.created_at, task.updated_at);
    }

    #[tokio::test]
    async fn test_insert_task_for_unknown_user() {
        let store = MemoryStore::new();
        let err = store
            .insert_task(NewTask {
                user_id: 99,
                title: "orphan".to_string(),
                description: String::new(),
                status_id: 1,
                priority_id: 1,
                due_date: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_update_is_partial_and_advances_updated_at() {
        let store = MemoryStore::new();
        let alice = add_user(&store, "alice").await;
        let task = add_task(&store, alice.id, "buy milk").await;

        let first = store
            .update_task(
                task.id,
                TaskChanges {
                    status_id: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        let second = store
            .update_task(task.id, TaskChanges::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.title, "buy milk");
        assert_eq!(first.status, "completed");
        assert_eq!(first.priority, "medium");
        assert!(first.updated_at > task.updated_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let store = MemoryStore::new();
        let result = store.update_task(5, TaskChanges::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_tasks() {
        let store = MemoryStore::new();
        let alice = add_user(&store, "alice").await;
        let bob = add_user(&store, "bob").await;
        add_task(&store, alice.id, "a1").await;
        add_task(&store, alice.id, "a2").await;
        let kept = add_task(&store, bob.id, "b1").await;

        assert!(store.delete_user(alice.id).await.unwrap());
        assert!(!store.delete_user(alice.id).await.unwrap());

        let remaining = store.query_tasks(&TaskFilter::new()).await.unwrap();
        assert_eq!(remaining.iter().map(|t| t.id).collect::<Vec<_>>(), vec![kept.id]);
    }

    #[tokio::test]
    async fn test_query_applies_filter_in_id_order() {
        let store = MemoryStore::new();
        let alice = add_user(&store, "alice").await;
        let bob = add_user(&store, "bob").await;
        let a1 = add_task(&store, alice.id, "first").await;
        add_task(&store, bob.id, "other").await;
        let a2 = add_task(&store, alice.id, "second").await;

        let filter = TaskFilter::new().and(TaskPredicate::OwnedBy(alice.id));
        let ids: Vec<i64> = store
            .query_tasks(&filter)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![a1.id, a2.id]);
    }

    #[tokio::test]
    async fn test_lookups_match_seed_rows() {
        let store = MemoryStore::new();
        assert_eq!(store.lookup_id(LookupKind::Status, "pending").await.unwrap(), Some(1));
        assert_eq!(store.lookup_id(LookupKind::Priority, "high").await.unwrap(), Some(3));
        assert_eq!(store.lookup_id(LookupKind::Priority, "urgent").await.unwrap(), None);
        assert_eq!(
            store.lookup_names(LookupKind::Status).await.unwrap(),
            vec!["pending", "in_progress", "completed"]
        );
    }
}
