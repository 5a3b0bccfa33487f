/// Task endpoints
///
/// - `GET /api/tasks?q=&status=&priority=` - Tasks visible to the caller
/// - `POST /api/tasks` - Create a task owned by the caller
/// - `PUT /api/tasks/:id` - Partial update (owner or super admin)
/// - `DELETE /api/tasks/:id` - Delete (owner or super admin)
///
/// For ordinary users `q` searches title and description of their own tasks.
/// For super admins, who see every task, `q` selects the owner by username.

use super::MessageResponse;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use taskdesk_shared::{
    auth::middleware::AuthContext,
    models::task::Task,
    tasks::{
        filter::TaskListParams,
        service::{self, TaskInput},
    },
};

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<TaskListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(params) = query?;
    let tasks = service::list_tasks(state.store.as_ref(), &auth.actor(), &params).await?;
    Ok(Json(tasks))
}

/// Create a task
///
/// ```text
/// POST /api/tasks
/// { "title": "buy milk", "priority": "high", "due_date": "2025-01-31" }
/// ```
///
/// Unknown or absent status and priority fall back to `pending` and `medium`.
///
/// # Errors
///
/// - `400 Bad Request`: missing title or malformed due date
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = payload?;
    let task = service::create_task(state.store.as_ref(), &auth.actor(), input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task; absent fields keep their stored value
///
/// # Errors
///
/// - `400 Bad Request`: empty title or malformed due date
/// - `403 Forbidden`: caller neither owns the task nor is a super admin
/// - `404 Not Found`: no such task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let task = service::update_task(state.store.as_ref(), &auth.actor(), id, input).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;
    service::delete_task(state.store.as_ref(), &auth.actor(), id).await?;
    Ok(Json(MessageResponse::new("Task deleted")))
}
