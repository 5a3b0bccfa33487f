/// Middleware for the API server
///
/// Authentication lives in [`crate::app`] because it needs the application
/// state; this module holds the state-free layers.

pub mod security;
