/// PostgreSQL-backed [`Store`]
///
/// Thin adapter from the store traits to the query functions on the models.
/// Unique violations on `users.username` surface as
/// [`StoreError::Conflict`] so services can report them as validation
/// failures.

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;
use tracing::debug;

use super::{LookupStore, Store, StoreError, StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::lookup::{self, LookupKind};
use crate::models::role::Role;
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{CreateUser, User};
use crate::tasks::filter::TaskFilter;

/// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_unique(err: sqlx::Error, field: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Conflict(field.to_string())
        }
        _ => StoreError::Database(err),
    }
}

fn map_foreign_key(err: sqlx::Error, parent: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            StoreError::MissingReference(parent.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, user)
            .await
            .map_err(|e| map_unique(e, "username"))
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn search_username(&self, query: &str) -> StoreResult<Option<i64>> {
        Ok(User::search_by_username(&self.pool, query).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<bool> {
        Ok(User::update_password(&self.pool, id, password_hash).await?)
    }

    async fn set_role(&self, id: i64, role: Role) -> StoreResult<bool> {
        Ok(User::update_role(&self.pool, id, role).await?)
    }

    async fn set_active(&self, id: i64, is_active: bool) -> StoreResult<bool> {
        Ok(User::set_active(&self.pool, id, is_active).await?)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: NewTask) -> StoreResult<Task> {
        Task::create(&self.pool, task)
            .await
            .map_err(|e| map_foreign_key(e, "user"))
    }

    async fn task_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn query_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let start = Instant::now();
        let tasks = Task::query(&self.pool, filter).await?;

        debug!(
            predicates = filter.predicates().len(),
            rows = tasks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Task query finished"
        );
        Ok(tasks)
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, changes).await?)
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl LookupStore for PgStore {
    async fn lookup_id(&self, kind: LookupKind, name: &str) -> StoreResult<Option<i64>> {
        Ok(lookup::find_id(&self.pool, kind, name).await?)
    }

    async fn lookup_names(&self, kind: LookupKind) -> StoreResult<Vec<String>> {
        Ok(lookup::list_names(&self.pool, kind).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = map_unique(sqlx::Error::RowNotFound, "username");
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));

        let err = map_foreign_key(sqlx::Error::PoolTimedOut, "user");
        assert!(matches!(err, StoreError::Database(sqlx::Error::PoolTimedOut)));
    }
}
