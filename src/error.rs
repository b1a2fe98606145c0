//! Error types for blastwrap operations

use thiserror::Error;

/// Main error type for blastwrap operations
#[derive(Error, Debug)]
pub enum BlastError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid hit field: {0}")]
    Validation(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("External tool failed\nCOMMAND: {command}\nSTDERR: {stderr}")]
    Tool { command: String, stderr: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for blastwrap operations
pub type BlastResult<T> = Result<T, BlastError>;

impl BlastError {
    /// True for errors raised by a child process rather than this crate
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, BlastError::Tool { .. })
    }
}
