//! Domain error model.

use thiserror::Error;

/// Result type used across the assessment crates.
pub type DomainResult<T> = Result<T, DomainError>;

/// Everything that can go wrong at the edges of scoring.
///
/// The scoring functions themselves are total. Errors come from raw values that do
/// not fit a domain type, configuration that cannot drive a test, and session
/// commands that arrive in the wrong state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Difficulty outside 1..=5, unusable config, empty question id.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Command not allowed in the session's current state.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Identifier that does not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Duplicate answer, stale expected version, or a second start.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
