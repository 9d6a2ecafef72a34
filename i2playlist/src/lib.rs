//! Playlist orchestration for the i2 playout appliance
//!
//! This crate turns playlist requests into temporally ordered sequences
//! of device commands: an immediate load, optional cancellations, a run
//! dispatched immediately or after a delay, and two waves of follow-on
//! commands timed against the playlist's playout window.
//!
//! # Features
//!
//! - **Orchestration**: [`PlaylistOrchestrator::handle`] runs the whole
//!   load / cancel / run / follow-on sequence for one request
//! - **Single commands**: `load_pres`, `run_pres`, `cancel_pres`,
//!   `load_run_pres` wrappers for one-shot use
//! - **Start-time formatting**: [`format_start`] produces the device's
//!   `MM/DD/YYYY HH:MM:SS:00` representation
//! - **Deterministic timing**: deferred steps go through a small
//!   scheduler that tests drive with tokio's paused clock
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use i2exec::ExecDispatcher;
//! use i2playlist::{FollowOn, PlaylistOrchestrator, PlaylistRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = PlaylistOrchestrator::new(Arc::new(ExecDispatcher::new()));
//!
//!     // 65 s enhanced playlist with a logo tag, a 10 s start delay,
//!     // two cancellations and a chained follow-on.
//!     let request = PlaylistRequest::new("domestic/V", 1950, "4")
//!         .logo_tag("domesticAds/TAG3631")
//!         .start_delay(10)
//!         .cancel("ldl3")
//!         .cancel("sidebar2")
//!         .follow_on(FollowOn::new("ldl3", "domestic/ldlE", 72000));
//!
//!     orchestrator.handle(&request).await?;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod error;
pub mod orchestrator;
pub mod request;
pub mod scheduler;
pub mod time;

// Re-exports
pub use error::{Error, Result};
pub use orchestrator::{
    PlaylistOrchestrator, DELAYED_RUN_WAIT, PLAYBACK_RATIO, START_SAFETY_PAD_SECS,
};
pub use request::{Cancellation, FollowOn, PlaylistRequest};
pub use scheduler::{spawn_after, ScheduledTask};
pub use time::format_start;
