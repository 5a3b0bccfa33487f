/// Storage capability injected into services
///
/// Services never reach for a global connection; they receive a
/// `&dyn Store` (usually behind an `Arc` in application state). Two
/// implementations exist:
///
/// - [`postgres::PgStore`]: the production store over a sqlx pool
/// - [`memory::MemoryStore`]: an in-process store with the same semantics,
///   used by tests and local tooling
///
/// Both apply task filters through [`TaskFilter`], so visibility rules are
/// identical regardless of backend.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::lookup::LookupKind;
use crate::models::role::Role;
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{CreateUser, User};
use crate::tasks::filter::TaskFilter;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique constraint violated on the named field
    #[error("Duplicate value for {0}")]
    Conflict(String),

    /// Row refers to a parent that does not exist
    #[error("Referenced {0} does not exist")]
    MissingReference(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; `StoreError::Conflict` when the username is taken
    async fn insert_user(&self, user: CreateUser) -> StoreResult<User>;

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Best case-insensitive substring match on username
    ///
    /// Ranking: exact match, then prefix match, then lowest id.
    async fn search_username(&self, query: &str) -> StoreResult<Option<i64>>;

    /// Every user, ordered by id
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<bool>;

    async fn set_role(&self, id: i64, role: Role) -> StoreResult<bool>;

    async fn set_active(&self, id: i64, is_active: bool) -> StoreResult<bool>;

    /// Deletes the user and every task they own
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;
}

/// Task store
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: NewTask) -> StoreResult<Task>;

    async fn task_by_id(&self, id: i64) -> StoreResult<Option<Task>>;

    /// Tasks matching `filter`, ordered by id; owner names included
    async fn query_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;

    /// Applies `changes`; `None` when the task does not exist
    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<Option<Task>>;

    async fn delete_task(&self, id: i64) -> StoreResult<bool>;
}

/// Status and priority lookup tables
#[async_trait]
pub trait LookupStore: Send + Sync {
    async fn lookup_id(&self, kind: LookupKind, name: &str) -> StoreResult<Option<i64>>;

    /// Names ordered by id
    async fn lookup_names(&self, kind: LookupKind) -> StoreResult<Vec<String>>;
}

/// Everything the services need from storage
#[async_trait]
pub trait Store: UserStore + TaskStore + LookupStore {
    /// Connectivity probe for health checks
    async fn ping(&self) -> StoreResult<()>;
}
