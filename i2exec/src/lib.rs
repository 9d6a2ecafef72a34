//! Command dispatcher for the i2 playout appliance
//!
//! This crate provides the single seam between i2kit and the device: a
//! [`CommandDispatcher`] trait accepting one formatted command string, and
//! [`ExecDispatcher`], the production implementation that spawns the
//! appliance's bundled exec shim.
//!
//! Higher-level crates (`i2playlist`, `i2data`, `i2sys`) format device
//! command strings and hand them to a dispatcher; nothing else in the
//! workspace touches process spawning.
//!
//! # Example
//!
//! ```no_run
//! use i2exec::{CommandDispatcher, ExecDispatcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads exec path / flags / timeout from the global configuration
//!     let dispatcher = ExecDispatcher::from_config();
//!     dispatcher.dispatch("restartProcess(\"ProcessName=I2jPipeline\")").await?;
//!     Ok(())
//! }
//! ```

pub mod dispatcher;
pub mod error;

// Re-exports
pub use dispatcher::{
    CommandDispatcher, DispatcherBuilder, ExecDispatcher, DEFAULT_DISPATCH_TIMEOUT_SECS,
    DEFAULT_EXEC_PATH,
};
pub use error::{Error, Result};

// Re-export for downstream trait implementations
pub use async_trait::async_trait;
