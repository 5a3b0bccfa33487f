/// Registration, login and password change
///
/// All three operate on the credential store through [`Store`] and never
/// see a plaintext password outside this module.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskdesk_shared::auth::service::{login, register};
/// use taskdesk_shared::models::role::Role;
/// use taskdesk_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let secret = "secret-key-at-least-32-bytes-long!";
///
/// let user = register(&store, "alice", "secret1").await?;
/// assert_eq!(user.role, Role::User);
///
/// let session = login(&store, "alice", "secret1", secret, Duration::hours(1)).await?;
/// assert_eq!(session.user.id, user.id);
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use serde::Serialize;
use tracing::{info, warn};

use super::jwt::{create_token, Claims};
use super::password::{
    hash_password_async, validate_password_length, verify_password_async,
};
use crate::error::{ServiceError, ServiceResult};
use crate::models::role::Role;
use crate::models::user::{CreateUser, UserSummary};
use crate::store::{Store, StoreError};

/// Longest accepted username, matching `users.username VARCHAR(64)`
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: UserSummary,
}

fn normalize_username(username: &str) -> ServiceResult<&str> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ServiceError::Validation("Username is required".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        )));
    }

    Ok(username)
}

/// Creates an account with the default `user` role
///
/// # Errors
///
/// `Validation` for an empty or overlong username, a short password, or a
/// username that is already taken.
pub async fn register(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> ServiceResult<UserSummary> {
    let username = normalize_username(username)?;
    validate_password_length(password).map_err(ServiceError::Validation)?;

    if store.user_by_username(username).await?.is_some() {
        return Err(ServiceError::Validation("Username already exists".to_string()));
    }

    let password_hash = hash_password_async(password.to_string()).await?;

    let user = store
        .insert_user(CreateUser {
            username: username.to_string(),
            password_hash,
            role: Role::default(),
        })
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent registration
            StoreError::Conflict(_) => {
                ServiceError::Validation("Username already exists".to_string())
            }
            other => ServiceError::Store(other),
        })?;

    info!(user_id = user.id, username = %user.username, "User registered");

    Ok(UserSummary::from(&user))
}

/// Checks credentials and issues a bearer token
///
/// # Errors
///
/// `NotFound` for an unknown username, `Unauthorized` for a wrong password
/// or a deactivated account.
pub async fn login(
    store: &dyn Store,
    username: &str,
    password: &str,
    jwt_secret: &str,
    expires_in: Duration,
) -> ServiceResult<Session> {
    let user = store
        .user_by_username(username.trim())
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

    if !verify_password_async(password.to_string(), user.password_hash.clone()).await? {
        warn!(user_id = user.id, "Login rejected: wrong password");
        return Err(ServiceError::Unauthorized("Invalid password".to_string()));
    }

    if !user.is_active {
        warn!(user_id = user.id, "Login rejected: account deactivated");
        return Err(ServiceError::Unauthorized("Account is deactivated".to_string()));
    }

    let claims = Claims::new(user.id, &user.username, user.role, expires_in);
    let token = create_token(&claims, jwt_secret)?;

    info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Session {
        token,
        user: UserSummary::from(&user),
    })
}

/// Replaces the caller's password after checking the old one
///
/// # Errors
///
/// `Unauthorized` when `old_password` does not match, `Validation` when the
/// new password is too short, `NotFound` when the account no longer exists.
pub async fn change_password(
    store: &dyn Store,
    user_id: i64,
    old_password: &str,
    new_password: &str,
) -> ServiceResult<()> {
    let user = store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

    if !verify_password_async(old_password.to_string(), user.password_hash).await? {
        return Err(ServiceError::Unauthorized("Old password is incorrect".to_string()));
    }

    validate_password_length(new_password).map_err(ServiceError::Validation)?;

    let password_hash = hash_password_async(new_password.to_string()).await?;
    if !store.set_password_hash(user_id, &password_hash).await? {
        return Err(ServiceError::NotFound("User not found".to_string()));
    }

    info!(user_id, "Password changed");
    Ok(())
}
