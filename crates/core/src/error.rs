use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A store backend (database, remote API) failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Session generation for one month failed part-way.
    ///
    /// `created` counts the sessions of that month that were already
    /// persisted before the failure; they are not rolled back.
    #[error("Generation failed for {month}/{year} after {created} session(s): {source}")]
    Generation {
        month: u32,
        year: i32,
        created: usize,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`] with a formatted message.
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }
}
