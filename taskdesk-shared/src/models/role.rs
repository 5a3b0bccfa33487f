/// User roles
///
/// Roles live in the `roles` lookup table and are referenced from
/// `users.role_id`. In Rust they are a closed enum so every permission
/// decision in [`crate::auth::authorization`] can be matched exhaustively.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id SMALLINT PRIMARY KEY,
///     name VARCHAR(32) NOT NULL UNIQUE
/// );
/// ```
///
/// # Example
///
/// ```
/// use taskdesk_shared::models::role::Role;
///
/// let role: Role = "super_admin".parse().unwrap();
/// assert_eq!(role, Role::SuperAdmin);
/// assert_eq!(role.as_str(), "super_admin");
/// assert!("root".parse::<Role>().is_err());
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a role name is not one of the seeded roles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular account, sees only its own tasks
    User,

    /// Can delete plain users
    Admin,

    /// Full administrative access
    SuperAdmin,
}

impl Role {
    /// Every role, in hierarchy order
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    /// Role name as stored in the `roles` table
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_is_case_sensitive() {
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert_eq!(
            "superadmin".parse::<Role>().unwrap_err(),
            UnknownRole("superadmin".to_string())
        );
    }

    #[test]
    fn test_default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
