/// Service-layer error taxonomy
///
/// Every operation in [`crate::auth::service`], [`crate::tasks::service`] and
/// [`crate::admin`] returns [`ServiceResult`]. The HTTP layer maps variants to
/// status codes:
///
/// | Variant | Status |
/// |---|---|
/// | `Validation` | 400 |
/// | `Unauthorized` | 401 |
/// | `Forbidden` | 403 |
/// | `NotFound` | 404 |
/// | `Store`, `Password`, `Token` | 500 |

use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Denied by the role policy
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Entity does not exist
    #[error("{0}")]
    NotFound(String),

    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

impl ServiceError {
    /// True for failures the caller caused, false for internal ones
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_)
                | ServiceError::Unauthorized(_)
                | ServiceError::Forbidden(_)
                | ServiceError::NotFound(_)
        )
    }
}
