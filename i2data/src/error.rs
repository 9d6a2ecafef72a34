//! Error types for data staging

/// Result type alias for data staging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while staging content onto the device
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The staging command could not be dispatched
    #[error("Command dispatch failed: {0}")]
    Dispatch(#[from] i2exec::Error),
}
