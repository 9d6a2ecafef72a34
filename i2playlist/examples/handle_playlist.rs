//! Example: Dispatch a full playlist sequence to the device
//!
//! Run with: cargo run -p i2playlist --example handle_playlist
//! Or with a specific flavor: cargo run -p i2playlist --example handle_playlist -- domestic/Azul

use i2exec::ExecDispatcher;
use i2playlist::{FollowOn, PlaylistOrchestrator, PlaylistRequest};
use std::env;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Get flavor from command line or use default
    let flavor = env::args().nth(1).unwrap_or_else(|| "domestic/V".to_string());

    let dispatcher = Arc::new(ExecDispatcher::from_config());
    println!("Using exec shim: {}", dispatcher.exec_path().display());

    let orchestrator = PlaylistOrchestrator::new(dispatcher);

    // 65 s enhanced playlist, delayed 10 s for radar cuts, cancelling the
    // lower-thirds and sidebar, with a chained LDL follow-on.
    let request = PlaylistRequest::new(&flavor, 1950, "4")
        .logo_tag("domesticAds/TAG3631")
        .start_delay(10)
        .cancel("ldl3")
        .cancel("sidebar2")
        .follow_on(FollowOn::new("ldl3", "domestic/ldlE", 72000));

    println!("Handling playlist {} (presentation 4)...", flavor);
    orchestrator.handle(&request).await?;
    println!("Primary sequence dispatched.");

    // Keep the process alive long enough for the deferred run and the
    // follow-on waves to fire.
    let window = Duration::from_secs_f64(1950.0 / i2playlist::PLAYBACK_RATIO + 15.0);
    println!("Waiting {:?} for deferred waves...", window);
    tokio::time::sleep(window).await;

    Ok(())
}
