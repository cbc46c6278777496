//! Domain errors for the quick-fix engine.

use thiserror::Error;

/// Domain-level errors raised while building selectors, fixes and contributions.
///
/// None of these ever escape `evaluate`: the engine logs provider failures and
/// treats broken patterns as "never matches". They surface at the edges, when a
/// caller builds a fix or loads a contributions file.
#[derive(Debug, Error)]
pub enum QuickFixError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Invalid port '{0}'")]
    InvalidPort(String),

    #[error("Invalid contribution: {0}")]
    InvalidContribution(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type QuickFixResult<T> = Result<T, QuickFixError>;

impl From<serde_yaml::Error> for QuickFixError {
    fn from(err: serde_yaml::Error) -> Self {
        QuickFixError::SerializationError(err.to_string())
    }
}
