/// Administration endpoints
///
/// - `GET /api/admin/check` - Confirms super admin access
/// - `GET /api/admin/users` - List users
/// - `DELETE /api/admin/users/:id` - Delete a user and their tasks
/// - `PUT /api/admin/users/:id/role` - Change a user's role
/// - `PUT /api/admin/users/:id/active` - Activate or deactivate a user
/// - `GET /api/admin/export` - Stream a `pg_dump` of the database
///
/// Every endpoint requires a token; the role policy decides the rest. User
/// deletion is open to admins for plain users, everything else is super
/// admin only.

use super::MessageResponse;
use crate::{app::AppState, backup, error::ApiResult};
use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdesk_shared::{
    admin,
    auth::{
        authorization::{check, Action},
        middleware::AuthContext,
    },
    models::user::{UserListItem, UserSummary},
};
use validator::Validate;

/// Admin check response
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub message: String,
    pub user: AuthContext,
}

/// Role change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Role change response
#[derive(Debug, Serialize)]
pub struct ChangeRoleResponse {
    pub message: String,
    pub user: UserSummary,
}

/// Activation request
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

pub async fn admin_check(Extension(auth): Extension<AuthContext>) -> ApiResult<Json<CheckResponse>> {
    check(&auth.actor(), Action::AdminCheck)?;

    Ok(Json(CheckResponse {
        message: "Welcome Super Admin".to_string(),
        user: auth,
    }))
}

/// List all users
///
/// ```json
/// [{ "id": 1, "username": "superAdmin", "is_active": true,
///    "role": "super_admin", "created_at": "2025-01-31 09:15" }]
/// ```
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<UserListItem>>> {
    let users = admin::list_users(state.store.as_ref(), &auth.actor()).await?;
    Ok(Json(users))
}

/// Delete a user
///
/// # Errors
///
/// - `403 Forbidden`: self-deletion, or a role pair the policy rejects
/// - `404 Not Found`: no such user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = path?;
    admin::delete_user(state.store.as_ref(), &auth.actor(), id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Change a user's role
///
/// ```text
/// PUT /api/admin/users/:id/role
/// { "role": "admin" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: unknown role name
/// - `403 Forbidden`: caller is not a super admin, or targets themselves
/// - `404 Not Found`: no such user
pub async fn change_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> ApiResult<Json<ChangeRoleResponse>> {
    let Path(id) = path?;
    check(&auth.actor(), Action::ChangeUserRole { target_id: id })?;

    let Json(req) = payload?;
    req.validate()?;

    let user = admin::change_role(state.store.as_ref(), &auth.actor(), id, &req.role).await?;

    Ok(Json(ChangeRoleResponse {
        message: "Role updated successfully".to_string(),
        user,
    }))
}

pub async fn set_active(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> ApiResult<Json<UserListItem>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let user = admin::set_active(state.store.as_ref(), &auth.actor(), id, req.is_active).await?;
    Ok(Json(user))
}

/// Download a SQL dump
///
/// Responds with `Content-Type: application/sql` and an attachment named
/// `backup-<timestamp>.sql`. If `pg_dump` cannot start or fails before
/// writing anything, the response is a JSON 500 instead.
pub async fn export_database(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Response> {
    check(&auth.actor(), Action::ExportDatabase)?;

    let export = backup::start_export(
        &state.config.backup.pg_dump_path,
        &state.config.database.url,
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        filename = %export.filename,
        "Database export started"
    );

    let disposition = format!("attachment; filename=\"{}\"", export.filename);

    Ok((
        [
            (header::CONTENT_TYPE, "application/sql".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(export.body),
    )
        .into_response())
}
