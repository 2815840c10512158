use thiserror::Error;

/// The closed set of failures a store operation can report. Every mutating
/// path validates before writing, so a `Validation` error is never partially
/// applied, and anything that reaches SQLite either commits whole or rolls
/// back before `Storage` is surfaced.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A submitted field bag failed a presence, format, vocabulary, or
    /// length check, or a new show referenced a missing endpoint. The
    /// message is ready for the status footer.
    #[error("{0}")]
    Validation(String),

    /// A lookup, update, or delete named an id that does not exist. The
    /// payload is the entity noun ("Venue", "Artist", "Show") so callers can
    /// phrase their own message.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The storage engine refused an operation. Any in-flight transaction
    /// has already rolled back by the time this reaches the caller.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl StoreError {
    /// Shorthand for building a validation failure from anything printable.
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }
}

/// Convenience alias used across the persistence layer.
pub type StoreResult<T> = Result<T, StoreError>;
