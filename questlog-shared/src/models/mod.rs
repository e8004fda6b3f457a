/// Entity models for Questlog
///
/// This module contains the three entity models and their CRUD operations.
/// Every operation takes the store pool by reference and returns
/// `Result<_, ModelError>`; nothing is logged-and-swallowed here, every
/// failure propagates to the caller.
///
/// # Models
///
/// - `attribute`: standalone skill/trait records, reusable across tasks
/// - `task`: units of work with an experience reward, completion counter,
///   owner, and associated attribute ids
/// - `user`: player records with level, experience, rank, and owned tasks
/// - `id_list`: the comma-joined id list value type backing the
///   denormalized `task_ids` and `attribute_ids` columns

pub mod attribute;
pub mod id_list;
pub mod task;
pub mod user;

use validator::ValidationError;

/// Error type for model operations
///
/// The HTTP layer maps `Validation` and `InvalidOwner` to 400, `NotFound`
/// to 404, and `Database` to 500.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A required field is missing or malformed
    #[error("validation failed: {0}")]
    Validation(String),

    /// The targeted id does not resolve to a row
    #[error("{0}")]
    NotFound(String),

    /// A referenced user id does not exist
    #[error("invalid owner: {0}")]
    InvalidOwner(String),

    /// Underlying store failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ModelError {
    /// Wraps a `validator` failure into the `Validation` kind
    pub(crate) fn from_validation(errors: validator::ValidationErrors) -> Self {
        ModelError::Validation(errors.to_string())
    }
}

/// Rejects names that are empty or whitespace-only
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("must be a non-empty string".into());
        return Err(err);
    }
    Ok(())
}
