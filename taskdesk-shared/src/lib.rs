//! # TaskDesk Shared Library
//!
//! Domain types, the role policy and the services behind the TaskDesk API.
//!
//! ## Module Organization
//!
//! - `models`: Rows and their PostgreSQL queries
//! - `auth`: Passwords, tokens, the policy table and account services
//! - `tasks`: Scoped task listing and task mutation
//! - `admin`: User administration
//! - `store`: Storage traits with PostgreSQL and in-memory backends
//! - `db`: Connection pool and migrations
//! - `error`: Service error taxonomy

pub mod admin;
pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

/// Current version of the TaskDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
