/// User model and database operations
///
/// This module provides the User model and the queries backing the
/// credential store. Every query joins `roles` so callers always receive a
/// typed [`Role`] rather than a raw `role_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(64) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role_id SMALLINT NOT NULL DEFAULT 1 REFERENCES roles(id),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{User, CreateUser};
/// use taskdesk_shared::models::role::Role;
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::User,
/// }).await?;
///
/// let found = User::find_by_username(&pool, "alice").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use super::role::Role;
use crate::tasks::filter::escape_like;

/// User account as stored in the credential store
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name, unique across all users
    pub username: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role, resolved through the `roles` table
    #[sqlx(try_from = "String")]
    pub role: Role,

    /// Deactivated accounts cannot log in
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Login name
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Initial role
    pub role: Role,
}

/// Public identity of a user (no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Row of the administrative user listing
#[derive(Debug, Clone, Serialize)]
pub struct UserListItem {
    pub id: i64,
    pub username: String,
    pub is_active: bool,
    pub role: Role,

    /// `YYYY-MM-DD HH:MM` in UTC
    pub created_at: String,
}

impl From<User> for UserListItem {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: format_created_at(user.created_at),
            username: user.username,
            is_active: user.is_active,
            role: user.role,
        }
    }
}

/// Formats an account creation time for the admin listing
pub fn format_created_at(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

const USER_COLUMNS: &str = r#"
    u.id, u.username, u.password_hash, r.name AS role, u.is_active, u.created_at
"#;

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a database error on unique violation of `username`.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            WITH u AS (
                INSERT INTO users (username, password_hash, role_id)
                VALUES ($1, $2, (SELECT id FROM roles WHERE name = $3))
                RETURNING id, username, password_hash, role_id, is_active, created_at
            )
            SELECT u.id, u.username, u.password_hash, r.name AS role, u.is_active, u.created_at
            FROM u
            JOIN roles r ON r.id = u.role_id
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.role.as_str())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by exact username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.username = $1"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Searches for a single user whose name contains `query`, ignoring case
    ///
    /// An exact match wins, then a prefix match, then the lowest id.
    pub async fn search_by_username(
        pool: &PgPool,
        query: &str,
    ) -> Result<Option<i64>, sqlx::Error> {
        let escaped = escape_like(query);

        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM users
            WHERE username ILIKE $1
            ORDER BY lower(username) = lower($3) DESC,
                     username ILIKE $2 DESC,
                     id ASC
            LIMIT 1
            "#,
        )
        .bind(format!("%{escaped}%"))
        .bind(format!("{escaped}%"))
        .bind(query)
        .fetch_optional(pool)
        .await
    }

    /// Lists every user ordered by id
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id ORDER BY u.id ASC"
        );

        sqlx::query_as::<_, User>(&sql).fetch_all(pool).await
    }

    /// Replaces the stored password hash
    pub async fn update_password(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Points the user at a different role row
    pub async fn update_role(pool: &PgPool, id: i64, role: Role) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role_id = (SELECT id FROM roles WHERE name = $2)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Activates or deactivates an account
    pub async fn set_active(pool: &PgPool, id: i64, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// The user's tasks go with it (`ON DELETE CASCADE` on `tasks.user_id`).
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Admin,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap(),
        }
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_list_item_formats_created_at() {
        let item = UserListItem::from(sample_user());
        assert_eq!(item.created_at, "2025-03-04 05:06");
        assert_eq!(item.username, "alice");
    }

    #[test]
    fn test_summary_from_user() {
        let summary = UserSummary::from(&sample_user());
        assert_eq!(summary.id, 7);
        assert_eq!(summary.role, Role::Admin);
    }
}
