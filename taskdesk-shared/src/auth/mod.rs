/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the password length rule
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Bearer-token extraction for Axum
/// - [`authorization`]: The role policy table
/// - [`service`]: Registration, login and password change
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::password::{hash_password, verify_password};
/// use taskdesk_shared::auth::jwt::{create_token, Claims};
/// use taskdesk_shared::models::role::Role;
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("secret1")?;
/// assert!(verify_password("secret1", &hash)?);
///
/// let claims = Claims::new(1, "alice", Role::User, Duration::hours(1));
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
