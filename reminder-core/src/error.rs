//! Error types for the persistence gateway.

/// Errors returned by [`crate::Database`] operations and input validation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or out-of-range input. Nothing was written.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Statement, transaction or commit failure. The operation was rolled back.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Could not create the database directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;
