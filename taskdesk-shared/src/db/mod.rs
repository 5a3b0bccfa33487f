/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a connectivity check
/// - `migrations`: Embedded schema migrations from `migrations/`
///
/// Queries live next to their models in [`crate::models`].

pub mod migrations;
pub mod pool;
