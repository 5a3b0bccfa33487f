/// Task model and database operations
///
/// Tasks are personal to-do items owned by exactly one user. Rows reference
/// the `statuses` and `priorities` lookup tables by id; the [`Task`] type is
/// the joined view carrying the human-readable names.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL CHECK (length(title) > 0),
///     description TEXT NOT NULL DEFAULT '',
///     status_id BIGINT NOT NULL REFERENCES statuses(id),
///     priority_id BIGINT NOT NULL REFERENCES priorities(id),
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::task::{Task, NewTask};
/// use taskdesk_shared::tasks::filter::{TaskFilter, TaskPredicate};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, NewTask {
///     user_id: 1,
///     title: "buy milk".to_string(),
///     description: String::new(),
///     status_id: 1,
///     priority_id: 2,
///     due_date: None,
/// }).await?;
///
/// let mine = Task::query(&pool, &TaskFilter::new().and(TaskPredicate::OwnedBy(1))).await?;
/// assert!(mine.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::tasks::filter::TaskFilter;

/// Task joined with its status, priority and owner names
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Required, non-empty
    pub title: String,

    pub description: String,

    /// Status name (e.g. "pending")
    pub status: String,

    /// Priority name (e.g. "medium")
    pub priority: String,

    pub due_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    /// Strictly increases on every update
    pub updated_at: DateTime<Utc>,

    /// Owner username, only exposed in the all-tasks view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Input for inserting a task, lookups already resolved to ids
#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub status_id: i64,
    pub priority_id: i64,
    pub due_date: Option<NaiveDate>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the date
    pub due_date: Option<Option<NaiveDate>>,
    pub status_id: Option<i64>,
    pub priority_id: Option<i64>,
}

const TASK_SELECT: &str = r#"
    SELECT t.id, t.user_id, t.title, t.description,
           s.name AS status, p.name AS priority,
           t.due_date, t.created_at, t.updated_at,
           u.username AS owner
    FROM tasks t
    JOIN statuses s ON s.id = t.status_id
    JOIN priorities p ON p.id = t.priority_id
    JOIN users u ON u.id = t.user_id
"#;

impl Task {
    /// Inserts a task with both timestamps set to now
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            WITH t AS (
                INSERT INTO tasks
                    (user_id, title, description, status_id, priority_id, due_date, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
                RETURNING *
            )
            SELECT t.id, t.user_id, t.title, t.description,
                   s.name AS status, p.name AS priority,
                   t.due_date, t.created_at, t.updated_at,
                   u.username AS owner
            FROM t
            JOIN statuses s ON s.id = t.status_id
            JOIN priorities p ON p.id = t.priority_id
            JOIN users u ON u.id = t.user_id
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status_id)
        .bind(data.priority_id)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("{TASK_SELECT} WHERE t.id = $1");

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Runs a scoped listing, ordered by id
    pub async fn query(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(TASK_SELECT);
        filter.push_where(&mut qb);
        qb.push(" ORDER BY t.id ASC");

        qb.build_query_as::<Task>().fetch_all(pool).await
    }

    /// Applies a partial update
    ///
    /// `updated_at` moves to `NOW()`, or one microsecond past its previous
    /// value when the clock has not advanced.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: TaskChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            WITH t AS (
                UPDATE tasks
                SET title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    due_date = CASE WHEN $4 THEN $5 ELSE due_date END,
                    status_id = COALESCE($6, status_id),
                    priority_id = COALESCE($7, priority_id),
                    updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
                WHERE id = $1
                RETURNING *
            )
            SELECT t.id, t.user_id, t.title, t.description,
                   s.name AS status, p.name AS priority,
                   t.due_date, t.created_at, t.updated_at,
                   u.username AS owner
            FROM t
            JOIN statuses s ON s.id = t.status_id
            JOIN priorities p ON p.id = t.priority_id
            JOIN users u ON u.id = t.user_id
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.due_date.is_some())
        .bind(changes.due_date.flatten())
        .bind(changes.status_id)
        .bind(changes.priority_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task by ID
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
