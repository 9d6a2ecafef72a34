//! Error types for the command dispatcher

use std::time::Duration;

/// Result type alias for dispatcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when dispatching a command to the device
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The device executable could not be launched
    #[error("Failed to launch device executable: {0}")]
    Io(#[from] std::io::Error),

    /// The executable ran but wrote to stderr (the exec shim reports
    /// device-side rejections this way, even on a zero exit status)
    #[error("Device reported an error: {0}")]
    Device(String),

    /// The executable exited with a non-zero status
    #[error("Device executable exited with {status}: {stderr}")]
    ExitStatus {
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The invocation did not complete within the configured timeout
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration error (from i2config/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a device-side error from a string
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}
