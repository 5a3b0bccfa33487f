/// Authentication endpoints
///
/// - `POST /api/auth/register` - Create an account
/// - `POST /api/auth/login` - Exchange credentials for a bearer token
/// - `PUT /api/auth/password` - Change the caller's password
/// - `GET /api/auth/me` - Identity carried by the caller's token

use super::MessageResponse;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskdesk_shared::{
    auth::{middleware::AuthContext, service},
    error::ServiceError,
    models::{role::Role, user::UserSummary},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserSummary,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub role: Role,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub new_password: String,
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
/// { "username": "alice", "password": "secret1" }
/// ```
///
/// Responds 201 with `{ "message", "user": { "id", "username", "role" } }`.
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, short password, or username taken
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let user = service::register(state.store.as_ref(), &req.username, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Login
///
/// ```text
/// POST /api/auth/login
/// { "username": "alice", "password": "secret1" }
/// ```
///
/// Responds 200 with `{ "message", "token", "role" }`.
///
/// # Errors
///
/// - `400 Bad Request`: unknown user, wrong password, or deactivated account
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;

    let session = service::login(
        state.store.as_ref(),
        &req.username,
        &req.password,
        state.jwt_secret(),
        state.config.jwt.expires_in,
    )
    .await
    .map_err(|e| match e {
        // The login contract reports every credential failure as 400
        ServiceError::NotFound(msg) | ServiceError::Unauthorized(msg) => ApiError::BadRequest(msg),
        other => ApiError::from(other),
    })?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: session.token,
        role: session.user.role,
    }))
}

/// Change the caller's password
///
/// ```text
/// PUT /api/auth/password
/// { "old_password": "secret1", "new_password": "secret2" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: new password too short
/// - `401 Unauthorized`: old password does not match
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    service::change_password(
        state.store.as_ref(),
        auth.user_id,
        &req.old_password,
        &req.new_password,
    )
    .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// Identity of the token holder
pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<AuthContext> {
    Json(auth)
}
