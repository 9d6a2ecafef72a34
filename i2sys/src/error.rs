//! Error types for system maintenance operations

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during system maintenance calls
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The maintenance command could not be dispatched
    #[error("Command dispatch failed: {0}")]
    Dispatch(#[from] i2exec::Error),

    /// A configuration file under the install directory could not be read
    #[error("Failed to read device configuration: {0}")]
    Io(#[from] std::io::Error),

    /// MachineProductCfg.xml is not well-formed
    #[error("Failed to parse MachineProductCfg: {0}")]
    Xml(#[from] xmltree::ParseError),
}
