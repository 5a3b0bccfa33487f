/// Database models for TaskDesk
///
/// This module contains the persisted entities and the queries that back
/// the PostgreSQL store.
///
/// # Models
///
/// - `role`: Closed role enumeration (`user`, `admin`, `super_admin`)
/// - `user`: User accounts and credentials
/// - `task`: Personal tasks joined with lookup names
/// - `lookup`: Status and priority reference tables

pub mod lookup;
pub mod role;
pub mod task;
pub mod user;
