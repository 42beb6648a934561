//! Error types for the quote sync engine.

use crate::QuoteId;
use thiserror::Error;

/// All possible errors from the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("malformed import: {0}")]
    MalformedImport(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    // Collection errors
    #[error("quote already exists: {0}")]
    QuoteAlreadyExists(QuoteId),

    #[error("local id space exhausted")]
    IdsExhausted,

    // Invariant violations
    #[error("merge produced duplicate id {0}")]
    MergeInconsistency(QuoteId),
}

impl Error {
    /// Whether the error was caused by caller-supplied data rather than an
    /// internal invariant.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingRequiredField(_)
                | Error::EmptyField(_)
                | Error::InvalidRecord(_)
                | Error::MalformedImport(_)
                | Error::QuoteAlreadyExists(_)
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
