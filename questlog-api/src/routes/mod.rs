/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: health check endpoint
/// - `users`: user resource (nested tasks on reads)
/// - `tasks`: task resource (resolved attributes on reads)
/// - `attributes`: attribute resource, served under `/atributos`

pub mod attributes;
pub mod health;
pub mod tasks;
pub mod users;

use serde::{Deserialize, Serialize};

/// Response body for every successful create: the generated id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}
