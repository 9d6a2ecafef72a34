//! System maintenance operations for the i2 playout appliance
//!
//! Restarting the device service or one of its processes, and reading
//! the machine product configuration from the appliance install
//! directory. The install directory is explicit configuration on the
//! client, not a hard-coded constant; use
//! [`SysClient::from_config`] to pick it up from the global i2config.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use i2exec::ExecDispatcher;
//! use i2sys::SysClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sys = SysClient::from_config(Arc::new(ExecDispatcher::from_config()));
//!
//!     sys.restart_process("I2jPipeline").await?;
//!     let cfg = sys.machine_product_cfg().await?;
//!     println!("{} bytes of MachineProductCfg", cfg.len());
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{Error, Result};

use i2exec::CommandDispatcher;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Install directory of a stock appliance
pub const DEFAULT_INSTALL_DIR: &str = "C:/Program Files (x86)/TWC/i2";

/// Location of the machine product configuration under the install dir
const MACHINE_PRODUCT_CFG: &str = "Managed/Config/MachineProductCfg.xml";

/// Client for device service/process maintenance
#[derive(Debug, Clone)]
pub struct SysClient {
    dispatcher: Arc<dyn CommandDispatcher>,
    install_dir: PathBuf,
}

impl SysClient {
    /// Create a client over a dispatcher and an explicit install directory
    pub fn new(dispatcher: Arc<dyn CommandDispatcher>, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            dispatcher,
            install_dir: install_dir.into(),
        }
    }

    /// Create a client using the install directory from the global
    /// i2config configuration
    #[cfg(feature = "i2config")]
    pub fn from_config(dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        let config = i2config::get_config();
        Self::new(dispatcher, config.get_install_dir())
    }

    /// The configured appliance install directory
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Restart the device service
    pub async fn restart_service(&self) -> Result<String> {
        info!("Restarting device service");
        Ok(self
            .dispatcher
            .dispatch("restartI2Service(\"r=1\")")
            .await?)
    }

    /// Restart one process on the device (e.g. `I2jPipeline`)
    pub async fn restart_process(&self, process_name: &str) -> Result<String> {
        info!(process = %process_name, "Restarting device process");
        let restart_command = format!("restartProcess(\"ProcessName={}\")", process_name);
        Ok(self.dispatcher.dispatch(&restart_command).await?)
    }

    /// Read MachineProductCfg.xml from the install directory, raw
    pub async fn machine_product_cfg(&self) -> Result<String> {
        let path = self.install_dir.join(MACHINE_PRODUCT_CFG);
        debug!(path = %path.display(), "Reading machine product config");
        Ok(tokio::fs::read_to_string(&path).await?)
    }

    /// Read and parse MachineProductCfg.xml for callers that need to
    /// navigate the document
    pub async fn machine_product_cfg_xml(&self) -> Result<xmltree::Element> {
        let raw = self.machine_product_cfg().await?;
        Ok(xmltree::Element::parse(raw.as_bytes())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2exec::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingDispatcher {
        commands: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandDispatcher for RecordingDispatcher {
        async fn dispatch(&self, command: &str) -> i2exec::Result<String> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok("ok".to_string())
        }
    }

    fn client_in(dir: impl Into<PathBuf>) -> (SysClient, Arc<RecordingDispatcher>) {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        (SysClient::new(dispatcher.clone(), dir), dispatcher)
    }

    #[tokio::test]
    async fn test_restart_service_grammar() {
        let (client, dispatcher) = client_in(DEFAULT_INSTALL_DIR);
        client.restart_service().await.unwrap();

        assert_eq!(
            dispatcher.commands.lock().unwrap()[0],
            r#"restartI2Service("r=1")"#
        );
    }

    #[tokio::test]
    async fn test_restart_process_grammar() {
        let (client, dispatcher) = client_in(DEFAULT_INSTALL_DIR);
        client.restart_process("I2jPipeline").await.unwrap();

        assert_eq!(
            dispatcher.commands.lock().unwrap()[0],
            r#"restartProcess("ProcessName=I2jPipeline")"#
        );
    }

    #[tokio::test]
    async fn test_machine_product_cfg_reads_from_install_dir() {
        let dir = std::env::temp_dir().join(format!("i2sys-test-{}", std::process::id()));
        let cfg_dir = dir.join("Managed/Config");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("MachineProductCfg.xml"),
            "<Config><Machine type=\"JR\"/></Config>",
        )
        .unwrap();

        let (client, _) = client_in(&dir);
        let raw = client.machine_product_cfg().await.unwrap();
        assert!(raw.contains("Machine type=\"JR\""));

        let parsed = client.machine_product_cfg_xml().await.unwrap();
        assert_eq!(parsed.name, "Config");
        assert!(parsed.get_child("Machine").is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_machine_product_cfg_missing_file() {
        let (client, _) = client_in("/nonexistent/i2-install");
        let result = client.machine_product_cfg().await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
