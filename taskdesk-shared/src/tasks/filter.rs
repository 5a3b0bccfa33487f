/// Role-scoped task filters
///
/// A [`TaskFilter`] is a list of typed predicates combined with `AND`. The
/// same filter can be rendered into SQL with bound parameters (for
/// PostgreSQL) or evaluated against an in-memory [`Task`], so every store
/// applies identical visibility rules.
///
/// # Scoping rules
///
/// 1. Callers who may not view all tasks only ever see their own.
/// 2. For a super admin, `q` names a task owner (case-insensitive substring
///    match on username). No match yields an empty result, not an error.
/// 3. For everyone else, `q` is a case-insensitive substring match against
///    title or description.
/// 4. `status` and `priority` narrow by exact lookup name.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::authorization::Actor;
/// use taskdesk_shared::models::role::Role;
/// use taskdesk_shared::tasks::filter::{build_filter, TaskListParams, TaskPredicate};
///
/// let actor = Actor { id: 4, role: Role::User };
/// let params = TaskListParams { q: Some("milk".into()), ..Default::default() };
///
/// let filter = build_filter(&actor, &params, None);
/// assert_eq!(
///     filter.predicates(),
///     &[TaskPredicate::OwnedBy(4), TaskPredicate::TextContains("milk".into())]
/// );
/// ```

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::auth::authorization::{can, Action, Actor};
use crate::models::task::Task;

/// Query string accepted by the task listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListParams {
    /// Free-text search
    pub q: Option<String>,

    /// Exact status name
    pub status: Option<String>,

    /// Exact priority name
    pub priority: Option<String>,
}

impl TaskListParams {
    pub fn query(&self) -> Option<&str> {
        non_empty(&self.q)
    }

    pub fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }

    pub fn priority(&self) -> Option<&str> {
        non_empty(&self.priority)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Single condition on a task row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPredicate {
    /// `tasks.user_id` equals the given user
    OwnedBy(i64),

    /// Title or description contains the text, ignoring case
    TextContains(String),

    /// Status name equals
    StatusIs(String),

    /// Priority name equals
    PriorityIs(String),

    /// Matches no row
    Nothing,
}

impl TaskPredicate {
    /// Evaluates the predicate against a joined task
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskPredicate::OwnedBy(user_id) => task.user_id == *user_id,
            TaskPredicate::TextContains(text) => {
                let needle = text.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task.description.to_lowercase().contains(&needle)
            }
            TaskPredicate::StatusIs(name) => task.status == *name,
            TaskPredicate::PriorityIs(name) => task.priority == *name,
            TaskPredicate::Nothing => false,
        }
    }

    /// Appends the predicate as SQL with bound parameters
    ///
    /// Expects the query to alias `tasks t`, `statuses s` and `priorities p`.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            TaskPredicate::OwnedBy(user_id) => {
                qb.push("t.user_id = ").push_bind(*user_id);
            }
            TaskPredicate::TextContains(text) => {
                let pattern = format!("%{}%", escape_like(text));
                qb.push("(t.title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR t.description ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            TaskPredicate::StatusIs(name) => {
                qb.push("s.name = ").push_bind(name.clone());
            }
            TaskPredicate::PriorityIs(name) => {
                qb.push("p.name = ").push_bind(name.clone());
            }
            TaskPredicate::Nothing => {
                qb.push("FALSE");
            }
        }
    }
}

/// Conjunction of task predicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    predicates: Vec<TaskPredicate>,
    include_owner: bool,
}

impl TaskFilter {
    /// Empty filter: every task, owner names hidden
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate
    pub fn and(mut self, predicate: TaskPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Marks results as carrying owner usernames
    pub fn with_owner_names(mut self) -> Self {
        self.include_owner = true;
        self
    }

    pub fn predicates(&self) -> &[TaskPredicate] {
        &self.predicates
    }

    /// Whether owner usernames belong in the result
    pub fn includes_owner(&self) -> bool {
        self.include_owner
    }

    /// True when every predicate matches
    pub fn matches(&self, task: &Task) -> bool {
        self.predicates.iter().all(|p| p.matches(task))
    }

    /// Appends ` WHERE ... AND ...` (nothing for an empty filter)
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(qb);
        }
    }
}

/// Returns the owner search term when `q` must be resolved to a user first
///
/// Only callers who may view all tasks search by owner.
pub fn owner_search<'a>(actor: &Actor, params: &'a TaskListParams) -> Option<&'a str> {
    if can(actor, Action::ViewAllTasks) {
        params.query()
    } else {
        None
    }
}

/// Builds the scoped filter for a listing
///
/// `owner_match` is the result of resolving [`owner_search`]; it is ignored
/// when no owner search applies.
pub fn build_filter(actor: &Actor, params: &TaskListParams, owner_match: Option<i64>) -> TaskFilter {
    let mut filter = TaskFilter::new();

    if can(actor, Action::ViewAllTasks) {
        filter = filter.with_owner_names();
        if params.query().is_some() {
            filter = filter.and(match owner_match {
                Some(owner_id) => TaskPredicate::OwnedBy(owner_id),
                None => TaskPredicate::Nothing,
            });
        }
    } else {
        filter = filter.and(TaskPredicate::OwnedBy(actor.id));
        if let Some(q) = params.query() {
            filter = filter.and(TaskPredicate::TextContains(q.to_string()));
        }
    }

    if let Some(status) = params.status() {
        filter = filter.and(TaskPredicate::StatusIs(status.to_string()));
    }
    if let Some(priority) = params.priority() {
        filter = filter.and(TaskPredicate::PriorityIs(priority.to_string()));
    }

    filter
}

/// Escapes `LIKE` wildcards so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
