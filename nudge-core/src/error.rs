//! Error types for nudge.

use thiserror::Error;

/// Errors raised at the fallible edges of nudge (configuration, task files,
/// trigger ports). Parsing and trigger computation never fail.
#[derive(Error, Debug)]
pub enum NudgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid recap time '{0}', expected HH:MM")]
    InvalidRecapTime(String),

    #[error("Unsupported task file version {0}")]
    UnsupportedTaskFileVersion(u32),

    #[error("Trigger port error: {0}")]
    Port(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for nudge operations.
pub type NudgeResult<T> = Result<T, NudgeError>;
