//! Error types for the scoring library

use thiserror::Error;

/// Result type for scoring operations
pub type Result<T> = std::result::Result<T, ScoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// Tree or responses failed validation. Carries every problem found,
    /// each prefixed with the path of the offending node.
    #[error("Invalid input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),
}

impl ScoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ScoreError::InvalidInput(vec![msg.into()])
    }

    /// The individual validation messages
    pub fn messages(&self) -> &[String] {
        match self {
            ScoreError::InvalidInput(errors) => errors,
        }
    }
}
