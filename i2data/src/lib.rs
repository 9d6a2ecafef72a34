//! Data and image staging for the i2 playout appliance
//!
//! Thin command wrappers over the dispatcher for pushing content onto
//! the device: record data files, images (radar frames, maps) and star
//! bundles. Each call formats one command string and surfaces the
//! dispatcher result directly; there is no retry and no tracking of what
//! the device already holds.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use i2data::{DataClient, StoreImage};
//! use i2exec::ExecDispatcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DataClient::new(Arc::new(ExecDispatcher::new()));
//!
//!     client.store_data("C:/i2/Localscan/temp/BERecord.i2m", false).await?;
//!
//!     let radar = StoreImage::new(
//!         "C:/i2/Localscan/temp/radar.tiff",
//!         ".tiff",
//!         "02/05/2025 14:15:00",
//!         "Radar",
//!         "US",
//!     )
//!     .priority();
//!     client.store_image(&radar).await?;
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{Error, Result};

use i2exec::CommandDispatcher;
use std::sync::Arc;
use tracing::debug;

/// Parameters for staging an image onto the device
///
/// `issue_time` uses the device's issue-time format
/// (`MM/DD/YYYY HH:MM:SS`, no centisecond field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreImage {
    /// Direct path of the image file
    pub file_path: String,
    /// Stage through the priority ingest path
    pub priority: bool,
    /// File extension (`.tiff`, `.tif`, `.bfg`)
    pub extension: String,
    /// Device issue time of the image
    pub issue_time: String,
    /// Image type understood by the device (Radar, Map, ...)
    pub image_type: String,
    /// Coverage location code (US, HI, AK, PR)
    pub location: String,
}

impl StoreImage {
    /// Describe an image to stage (non-priority by default)
    pub fn new(
        file_path: impl Into<String>,
        extension: impl Into<String>,
        issue_time: impl Into<String>,
        image_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            priority: false,
            extension: extension.into(),
            issue_time: issue_time.into(),
            image_type: image_type.into(),
            location: location.into(),
        }
    }

    /// Stage through the priority ingest path
    pub fn priority(mut self) -> Self {
        self.priority = true;
        self
    }
}

/// Client for staging data, images and bundles onto the device
#[derive(Debug, Clone)]
pub struct DataClient {
    dispatcher: Arc<dyn CommandDispatcher>,
}

impl DataClient {
    /// Create a client over a command dispatcher
    pub fn new(dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Store a data file onto the device
    ///
    /// Set `priority` to route through the device's priority ingest.
    pub async fn store_data(&self, file_path: &str, priority: bool) -> Result<String> {
        let store_command = format!(
            "store{}Data(\"File={}\")",
            if priority { "Priority" } else { "" },
            file_path
        );
        debug!(file = %file_path, priority, "Storing data file");
        Ok(self.dispatcher.dispatch(&store_command).await?)
    }

    /// Store an image (like a radar frame) onto the device
    pub async fn store_image(&self, image: &StoreImage) -> Result<String> {
        // L'ordre des paramètres et la clé `imageType` en minuscule sont
        // imposés par le device.
        let store_command = format!(
            "store{}Image(\"File={},IssueTime={},Location={},imageType={},FileExtension={}\")",
            if image.priority { "Priority" } else { "" },
            image.file_path,
            image.issue_time,
            image.location,
            image.image_type,
            image.extension
        );
        debug!(file = %image.file_path, image_type = %image.image_type, "Storing image");
        Ok(self.dispatcher.dispatch(&store_command).await?)
    }

    /// Stage a star bundle zip onto the device
    ///
    /// This command takes its argument without inner quotes; that is how
    /// the device accepts it.
    pub async fn stage_star_bundle(&self, file_path: &str) -> Result<String> {
        let stage_command = format!("stageStarBundle(File={})", file_path);
        debug!(file = %file_path, "Staging star bundle");
        Ok(self.dispatcher.dispatch(&stage_command).await?)
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

    fn client() -> (DataClient, Arc<RecordingDispatcher>) {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        (DataClient::new(dispatcher.clone()), dispatcher)
    }

    #[tokio::test]
    async fn test_store_data() {
        let (client, dispatcher) = client();
        client
            .store_data("C:/i2/Localscan/temp/BERecord.i2m", false)
            .await
            .unwrap();

        assert_eq!(
            dispatcher.commands.lock().unwrap()[0],
            r#"storeData("File=C:/i2/Localscan/temp/BERecord.i2m")"#
        );
    }

    #[tokio::test]
    async fn test_store_priority_data() {
        let (client, dispatcher) = client();
        client.store_data("/tmp/rec.i2m", true).await.unwrap();

        assert_eq!(
            dispatcher.commands.lock().unwrap()[0],
            r#"storePriorityData("File=/tmp/rec.i2m")"#
        );
    }

    #[tokio::test]
    async fn test_store_image_grammar_and_order() {
        let (client, dispatcher) = client();
        let radar = StoreImage::new(
            "C:/i2/Localscan/temp/radar.tiff",
            ".tiff",
            "02/05/2025 14:15:00",
            "Radar",
            "US",
        )
        .priority();

        client.store_image(&radar).await.unwrap();

        assert_eq!(
            dispatcher.commands.lock().unwrap()[0],
            r#"storePriorityImage("File=C:/i2/Localscan/temp/radar.tiff,IssueTime=02/05/2025 14:15:00,Location=US,imageType=Radar,FileExtension=.tiff")"#
        );
    }

    #[tokio::test]
    async fn test_stage_star_bundle_has_no_inner_quotes() {
        let (client, dispatcher) = client();
        client.stage_star_bundle("C:/starbundle.zip").await.unwrap();

        assert_eq!(
            dispatcher.commands.lock().unwrap()[0],
            "stageStarBundle(File=C:/starbundle.zip)"
        );
    }
}
