//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid episode index '{value}': expected a non-negative integer")]
    InvalidEpisodeIndex { value: String },

    #[error("dataset schemas don't match: {0}")]
    SchemaMismatch(String),

    #[error("cannot concatenate an empty list of datasets")]
    NothingToConcatenate,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
