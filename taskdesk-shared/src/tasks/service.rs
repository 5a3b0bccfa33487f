/// Task listing and mutation
///
/// Every entry point takes the acting user and consults the policy in
/// [`crate::auth::authorization`] before touching a row it does not own.
/// Status and priority arrive as names and are resolved to lookup ids here;
/// an unknown name falls back to the kind's default (`pending` / `medium`),
/// then to the seeded row with id 1.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};

use super::filter::{build_filter, owner_search, TaskListParams};
use crate::auth::authorization::{check, Action, Actor};
use crate::error::{ServiceError, ServiceResult};
use crate::models::lookup::{LookupKind, FALLBACK_LOOKUP_ID};
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::store::{Store, StoreError};

/// Longest accepted title, matching `tasks.title VARCHAR(255)`
pub const MAX_TITLE_LENGTH: usize = 255;

/// Client-supplied task fields
///
/// On create, `title` is required and the rest default. On update, absent
/// fields leave the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,

    /// `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is used.
    /// An empty string means no date, and clears it on update.
    pub due_date: Option<String>,
}

/// Lists the tasks `actor` may see, narrowed by `params`
///
/// Owner usernames are only included for callers who may view all tasks.
pub async fn list_tasks(
    store: &dyn Store,
    actor: &Actor,
    params: &TaskListParams,
) -> ServiceResult<Vec<Task>> {
    let owner_match = match owner_search(actor, params) {
        Some(query) => {
            let found = store.search_username(query).await?;
            debug!(query, owner_id = ?found, "Resolved owner search");
            found
        }
        None => None,
    };

    let filter = build_filter(actor, params, owner_match);
    let mut tasks = store.query_tasks(&filter).await?;

    if !filter.includes_owner() {
        for task in &mut tasks {
            task.owner = None;
        }
    }

    Ok(tasks)
}

/// Creates a task owned by `actor`
///
/// # Errors
///
/// `Validation` when the title is missing, blank or too long, or the due date
/// does not parse.
pub async fn create_task(store: &dyn Store, actor: &Actor, input: TaskInput) -> ServiceResult<Task> {
    let title = match input.title.as_deref() {
        Some(title) => validate_title(title)?,
        None => return Err(ServiceError::Validation("Title is required".to_string())),
    };
    let due_date = parse_due_date(input.due_date.as_deref())?;

    let status_id = resolve_lookup(store, LookupKind::Status, input.status.as_deref()).await?;
    let priority_id = resolve_lookup(store, LookupKind::Priority, input.priority.as_deref()).await?;

    let mut task = store
        .insert_task(NewTask {
            user_id: actor.id,
            title,
            description: input.description.unwrap_or_default(),
            status_id,
            priority_id,
            due_date,
        })
        .await
        .map_err(|e| match e {
            StoreError::MissingReference(_) => ServiceError::NotFound("User not found".to_string()),
            other => ServiceError::Store(other),
        })?;

    info!(task_id = task.id, user_id = actor.id, "Task created");

    task.owner = None;
    Ok(task)
}

/// Applies a partial update
///
/// # Errors
///
/// `NotFound` when the task does not exist, `Forbidden` when `actor` neither
/// owns it nor is a super admin, `Validation` for a blank title or bad date.
pub async fn update_task(
    store: &dyn Store,
    actor: &Actor,
    task_id: i64,
    input: TaskInput,
) -> ServiceResult<Task> {
    let existing = store
        .task_by_id(task_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

    check(actor, Action::UpdateTask { owner_id: existing.user_id })?;

    let title = input.title.as_deref().map(validate_title).transpose()?;
    let due_date = match input.due_date.as_deref() {
        Some(value) => Some(parse_due_date(Some(value))?),
        None => None,
    };

    let status_id = match non_empty(input.status.as_deref()) {
        Some(name) => Some(resolve_lookup(store, LookupKind::Status, Some(name)).await?),
        None => None,
    };
    let priority_id = match non_empty(input.priority.as_deref()) {
        Some(name) => Some(resolve_lookup(store, LookupKind::Priority, Some(name)).await?),
        None => None,
    };

    let changes = TaskChanges {
        title,
        description: input.description,
        due_date,
        status_id,
        priority_id,
    };

    let mut task = store
        .update_task(task_id, changes)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

    info!(task_id, user_id = actor.id, "Task updated");

    task.owner = None;
    Ok(task)
}

/// Deletes a task
///
/// # Errors
///
/// `NotFound` when the task does not exist, `Forbidden` when `actor` neither
/// owns it nor is a super admin.
pub async fn delete_task(store: &dyn Store, actor: &Actor, task_id: i64) -> ServiceResult<()> {
    let existing = store
        .task_by_id(task_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

    check(actor, Action::DeleteTask { owner_id: existing.user_id })?;

    if !store.delete_task(task_id).await? {
        return Err(ServiceError::NotFound("Task not found".to_string()));
    }

    info!(task_id, user_id = actor.id, "Task deleted");
    Ok(())
}

/// Names of every row in a lookup table, ordered by id
pub async fn lookup_names(store: &dyn Store, kind: LookupKind) -> ServiceResult<Vec<String>> {
    Ok(store.lookup_names(kind).await?)
}

/// Resolves a status or priority name to its id
///
/// Absent or unknown names resolve to the kind's default row, and to
/// [`FALLBACK_LOOKUP_ID`] if even that is missing.
pub async fn resolve_lookup(
    store: &dyn Store,
    kind: LookupKind,
    name: Option<&str>,
) -> ServiceResult<i64> {
    let requested = non_empty(name).unwrap_or(kind.default_name());

    if let Some(id) = store.lookup_id(kind, requested).await? {
        return Ok(id);
    }

    debug!(kind = kind.table(), name = requested, "Unknown lookup name, using default");

    if requested != kind.default_name() {
        if let Some(id) = store.lookup_id(kind, kind.default_name()).await? {
            return Ok(id);
        }
    }

    Ok(FALLBACK_LOOKUP_ID)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn validate_title(title: &str) -> ServiceResult<String> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

/// Parses an optional due date; empty means none
pub fn parse_due_date(value: Option<&str>) -> ServiceResult<Option<NaiveDate>> {
    let Some(value) = non_empty(value.map(str::trim)) else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.date_naive()));
    }

    Err(ServiceError::Validation(format!(
        "Invalid due_date '{}', expected YYYY-MM-DD",
        value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_date() {
        assert_eq!(parse_due_date(None).unwrap(), None);
        assert_eq!(parse_due_date(Some("")).unwrap(), None);
        assert_eq!(
            parse_due_date(Some("2025-01-31")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
        assert_eq!(
            parse_due_date(Some("2025-01-31T10:00:00Z")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
        assert!(matches!(
            parse_due_date(Some("31/01/2025")),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title("buy milk").unwrap(), "buy milk");
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }
}
