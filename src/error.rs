//! Error types for schedule generation.
//!
//! Only malformed configuration and collaborator failures are errors.
//! An empty schedule set is a normal result, and a superseded generation
//! is an outcome (see [`GenerationOutcome`](crate::generator::GenerationOutcome)).

use thiserror::Error;

/// Errors raised while building filters, pages, or configuration.
///
/// These are surfaced synchronously to whoever built the offending value;
/// they never reach the combination search.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A filter operator string is not recognized for its filter kind.
    #[error("Unknown operator '{operator}' for {kind} filter")]
    UnknownOperator { kind: String, operator: String },

    /// A filter type tag is not recognized.
    #[error("Unknown filter type '{kind}'")]
    UnknownFilterKind { kind: String },

    /// A filter was given no days to apply to.
    #[error("{kind} filter must apply to at least one day")]
    EmptyDays { kind: String },

    /// A day code outside `MTWRFSU`.
    #[error("Invalid day code '{code}'")]
    InvalidDay { code: char },

    /// A clock time that could not be parsed.
    #[error("Invalid time '{input}': {reason}")]
    InvalidTime { input: String, reason: String },

    /// A break window whose end is not after its start.
    #[error("Break window {from}..{until} is empty or inverted")]
    InvalidBreakWindow { from: String, until: String },

    /// A page size of zero.
    #[error("Page size must be greater than zero")]
    ZeroPageSize,

    /// Configuration text could not be deserialized.
    #[error("Invalid configuration: {message}")]
    Parse { message: String },
}

impl ConfigError {
    pub(crate) fn invalid_time(input: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidTime {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse {
            message: err.to_string(),
        }
    }
}

/// Errors reported by a [`CourseCatalog`](crate::catalog::CourseCatalog).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No course exists with this code.
    #[error("Course '{code}' not found")]
    NotFound { code: String },

    /// The section/meeting source could not be reached.
    #[error("Course data source unavailable: {message}")]
    UpstreamUnavailable { message: String },
}

impl CatalogError {
    /// Returns true if retrying the lookup may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::UpstreamUnavailable { .. })
    }
}
