/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Register, login, password change, identity
/// - `tasks`: Task listing and CRUD
/// - `admin`: User administration and database export
/// - `meta`: Status and priority names

pub mod admin;
pub mod auth;
pub mod health;
pub mod meta;
pub mod tasks;

use serde::{Deserialize, Serialize};

/// Body of responses that only confirm an action
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
