//! Error types for playlist orchestration

/// Result type alias for playlist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while orchestrating playlists
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A primary-sequence command could not be dispatched
    #[error("Command dispatch failed: {0}")]
    Dispatch(#[from] i2exec::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
