/// Status and priority lookup tables
///
/// Both tables are small reference enumerations mapping a name to a surrogate
/// id. Tasks reference them by id; the API speaks names.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE statuses (id BIGSERIAL PRIMARY KEY, name VARCHAR(32) NOT NULL UNIQUE);
/// CREATE TABLE priorities (id BIGSERIAL PRIMARY KEY, name VARCHAR(32) NOT NULL UNIQUE);
/// ```

use sqlx::PgPool;

/// Id of the seeded fallback row in every lookup table
pub const FALLBACK_LOOKUP_ID: i64 = 1;

/// Which lookup table to consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// `statuses` table
    Status,

    /// `priorities` table
    Priority,
}

impl LookupKind {
    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            LookupKind::Status => "statuses",
            LookupKind::Priority => "priorities",
        }
    }

    /// Name used when a task does not specify one
    pub fn default_name(&self) -> &'static str {
        match self {
            LookupKind::Status => "pending",
            LookupKind::Priority => "medium",
        }
    }

    /// Rows seeded by the initial migration, in id order
    pub fn seeded_names(&self) -> &'static [&'static str] {
        match self {
            LookupKind::Status => &["pending", "in_progress", "completed"],
            LookupKind::Priority => &["low", "medium", "high"],
        }
    }
}

/// Finds the id of a lookup row by exact name
pub async fn find_id(
    pool: &PgPool,
    kind: LookupKind,
    name: &str,
) -> Result<Option<i64>, sqlx::Error> {
    // Table names come from a closed enum, never from input.
    let sql = format!("SELECT id FROM {} WHERE name = $1", kind.table());

    sqlx::query_scalar::<_, i64>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Lists lookup names ordered by id
pub async fn list_names(pool: &PgPool, kind: LookupKind) -> Result<Vec<String>, sqlx::Error> {
    let sql = format!("SELECT name FROM {} ORDER BY id", kind.table());

    sqlx::query_scalar::<_, String>(&sql).fetch_all(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_seeded() {
        for kind in [LookupKind::Status, LookupKind::Priority] {
            assert!(kind.seeded_names().contains(&kind.default_name()));
        }
    }

    #[test]
    fn test_table_names() {
        assert_eq!(LookupKind::Status.table(), "statuses");
        assert_eq!(LookupKind::Priority.table(), "priorities");
    }
}
