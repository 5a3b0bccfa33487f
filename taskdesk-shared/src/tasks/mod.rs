/// Personal tasks
///
/// - [`filter`]: role-scoped listing predicates, rendered to SQL or evaluated in memory
/// - [`service`]: list, create, update and delete with policy checks

pub mod filter;
pub mod service;
