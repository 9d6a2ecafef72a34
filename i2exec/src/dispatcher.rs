//! Process-backed command dispatcher
//!
//! The i2 appliance ships a command-line shim (`exec.exe`) that forwards a
//! single command string to the device. [`ExecDispatcher`] wraps that shim
//! behind the [`CommandDispatcher`] trait so that higher layers (playlist
//! orchestration, data staging, system maintenance) never touch process
//! plumbing directly, and so tests can substitute a fake.
//!
//! # Example
//!
//! ```no_run
//! use i2exec::{CommandDispatcher, ExecDispatcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = ExecDispatcher::builder()
//!         .exec_path("C:/Program Files (x86)/TWC/i2/exec.exe")
//!         .build();
//!
//!     let output = dispatcher
//!         .dispatch(r#"loadRunPres("Flavor=domestic/Azul,Duration=1800,PresentationId=4")"#)
//!         .await?;
//!     println!("{}", output);
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, warn};

/// Default path of the exec shim on a stock appliance
pub const DEFAULT_EXEC_PATH: &str = "C:/Program Files (x86)/TWC/i2/exec.exe";

/// Default timeout for a single command invocation (30 seconds)
pub const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 30;

/// A sink for formatted device command strings
///
/// Implementations take one command string and resolve to the device's
/// opaque output, or fail. Callers impose ordering only by awaiting
/// sequentially; the trait makes no delivery or retry guarantee.
#[async_trait]
pub trait CommandDispatcher: Debug + Send + Sync {
    /// Send one formatted command to the device
    async fn dispatch(&self, command: &str) -> Result<String>;
}

/// Dispatcher that shells out to the device's bundled exec shim
///
/// Each [`dispatch`](CommandDispatcher::dispatch) call spawns
/// `<exec_path> [-async] <command>` and captures its output. The shim
/// signals device-side rejection by writing to stderr, so any stderr
/// output is mapped to [`Error::Device`] even when the exit status is
/// zero.
#[derive(Debug, Clone)]
pub struct ExecDispatcher {
    exec_path: PathBuf,
    async_flag: bool,
    timeout: Duration,
}

impl ExecDispatcher {
    /// Create a dispatcher with default settings
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for configuring the dispatcher
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Create a dispatcher from the global i2config configuration
    #[cfg(feature = "i2config")]
    pub fn from_config() -> Self {
        let config = i2config::get_config();
        Self {
            exec_path: PathBuf::from(config.get_exec_path()),
            async_flag: config.get_async_dispatch(),
            timeout: Duration::from_secs(config.get_command_timeout_secs()),
        }
    }

    /// Path of the exec shim this dispatcher spawns
    pub fn exec_path(&self) -> &Path {
        &self.exec_path
    }

    /// Whether the `-async` flag is passed to the shim
    pub fn async_flag(&self) -> bool {
        self.async_flag
    }

    /// Timeout applied to each invocation
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ExecDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandDispatcher for ExecDispatcher {
    async fn dispatch(&self, command: &str) -> Result<String> {
        debug!(command = %command, "Dispatching device command");

        let mut cmd = tokio::process::Command::new(&self.exec_path);
        if self.async_flag {
            cmd.arg("-async");
        }
        cmd.arg(command).stdin(Stdio::null()).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                warn!(command = %command, timeout = ?self.timeout, "Device command timed out");
                Error::Timeout(self.timeout)
            })??;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(Error::ExitStatus {
                status: output.status,
                stderr,
            });
        }

        // Le shim signale les rejets du device sur stderr, même avec un
        // code de sortie nul.
        if !stderr.is_empty() {
            return Err(Error::Device(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builder for configuring an ExecDispatcher
#[derive(Debug)]
pub struct DispatcherBuilder {
    exec_path: PathBuf,
    async_flag: bool,
    timeout: Duration,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            exec_path: PathBuf::from(DEFAULT_EXEC_PATH),
            async_flag: true,
            timeout: Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECS),
        }
    }
}

impl DispatcherBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path of the exec shim
    pub fn exec_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.exec_path = path.into();
        self
    }

    /// Enable or disable the `-async` flag
    pub fn async_flag(mut self, enabled: bool) -> Self {
        self.async_flag = enabled;
        self
    }

    /// Set the per-invocation timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the dispatcher
    pub fn build(self) -> ExecDispatcher {
        ExecDispatcher {
            exec_path: self.exec_path,
            async_flag: self.async_flag,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = DispatcherBuilder::default();
        assert_eq!(builder.exec_path, PathBuf::from(DEFAULT_EXEC_PATH));
        assert!(builder.async_flag);
        assert_eq!(
            builder.timeout,
            Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_builder_overrides() {
        let dispatcher = ExecDispatcher::builder()
            .exec_path("/usr/local/bin/i2exec")
            .async_flag(false)
            .timeout(Duration::from_secs(5))
            .build();

        assert_eq!(dispatcher.exec_path(), Path::new("/usr/local/bin/i2exec"));
        assert!(!dispatcher.async_flag());
        assert_eq!(dispatcher.timeout(), Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dispatch_captures_stdout() {
        let dispatcher = ExecDispatcher::builder()
            .exec_path("echo")
            .async_flag(false)
            .build();

        let output = dispatcher
            .dispatch(r#"runPres("PresentationId=4")"#)
            .await
            .expect("echo should succeed");

        assert_eq!(output.trim(), r#"runPres("PresentationId=4")"#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dispatch_missing_executable() {
        let dispatcher = ExecDispatcher::builder()
            .exec_path("/nonexistent/i2/exec.exe")
            .build();

        let result = dispatcher.dispatch("restartI2Service(\"r=1\")").await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dispatch_nonzero_exit() {
        let dispatcher = ExecDispatcher::builder()
            .exec_path("false")
            .async_flag(false)
            .build();

        let result = dispatcher.dispatch("anything").await;
        assert!(matches!(result, Err(Error::ExitStatus { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dispatch_timeout() {
        let dispatcher = ExecDispatcher::builder()
            .exec_path("sleep")
            .async_flag(false)
            .timeout(Duration::from_millis(50))
            .build();

        let result = dispatcher.dispatch("5").await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }
}
