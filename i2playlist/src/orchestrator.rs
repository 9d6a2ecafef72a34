//! Playlist orchestration
//!
//! [`PlaylistOrchestrator::handle`] turns one [`PlaylistRequest`] into a
//! temporally ordered sequence of device commands:
//!
//! 1. an immediate `loadPres` (fatal on failure),
//! 2. the request's `cancelPres` commands, in order (fatal on failure),
//! 3. the `runPres`, either inline (no start delay) or through a
//!    deferred 5-second continuation (start delay present),
//! 4. two deferred follow-on waves (`loadPres` then `runPres` for each
//!    follow-on entry) timed against 1/30th of the playlist duration.
//!
//! The call resolves once the primary sequence is dispatched; deferred
//! steps are fire-and-forget and their failures are logged, never
//! surfaced. Once `handle` returns there is no way to cancel or observe
//! the scheduled waves.

use crate::command;
use crate::error::Result;
use crate::request::PlaylistRequest;
use crate::scheduler;
use crate::time::format_start;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use i2exec::CommandDispatcher;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Fixed pad added to an explicit start delay before the run/cancel base
/// time, giving the device room to finish generating the presentation
pub const START_SAFETY_PAD_SECS: u64 = 2;

/// Fixed wait before a delayed run command is dispatched
pub const DELAYED_RUN_WAIT: Duration = Duration::from_secs(5);

/// The device's real-time-to-playback-time ratio: a playlist of
/// `duration` seconds plays out in `duration / 30` wall-clock seconds.
/// Domain constant, not configurable.
pub const PLAYBACK_RATIO: f64 = 30.0;

/// Lead time before playout end at which follow-on loads are dispatched
const FOLLOW_ON_LOAD_LEAD_SECS: f64 = 25.0;

/// Lead time before playout end at which follow-on runs are dispatched
const FOLLOW_ON_RUN_LEAD_SECS: f64 = 10.0;

/// Stateless orchestrator issuing playlist command sequences
///
/// Holds only the dispatcher; every [`handle`](Self::handle) call
/// operates over its own request and its own scheduled timers, so
/// concurrent calls share no mutable state.
#[derive(Debug, Clone)]
pub struct PlaylistOrchestrator {
    dispatcher: Arc<dyn CommandDispatcher>,
}

impl PlaylistOrchestrator {
    /// Create an orchestrator over a command dispatcher
    pub fn new(dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// The dispatcher this orchestrator issues commands through
    pub fn dispatcher(&self) -> &Arc<dyn CommandDispatcher> {
        &self.dispatcher
    }

    /// Handle a playlist request end to end
    ///
    /// Resolves once the primary load/cancel/run sequence has been
    /// dispatched; the follow-on waves are scheduled but their outcomes
    /// are not part of this call's result.
    ///
    /// # Errors
    ///
    /// Fails if the load, any cancel, or an inline (non-delayed) run
    /// dispatch fails; the rest of the sequence is then abandoned.
    pub async fn handle(&self, request: &PlaylistRequest) -> Result<()> {
        let load_command = command::load_pres(
            &request.flavor,
            request.duration_secs,
            &request.presentation_id,
            request.logo_tag.as_deref(),
        );

        let mut base_time = Utc::now();
        if let Some(delay) = request.start_delay_secs {
            base_time += ChronoDuration::seconds((delay + START_SAFETY_PAD_SECS) as i64);
        }

        // Sans délai explicite, le run part sans StartTime : le device
        // démarre immédiatement.
        let run_command = match request.start_delay_secs {
            Some(_) => command::run_pres(
                &request.presentation_id,
                Some(&format_start(base_time)),
            ),
            None => command::run_pres(&request.presentation_id, None),
        };

        let cancel_commands: Vec<String> = request
            .cancellations
            .iter()
            .map(|c| command::cancel_pres(&c.presentation_id, Some(&format_start(base_time))))
            .collect();

        let (follow_on_loads, follow_on_runs) = Self::follow_on_commands(request);

        if let Err(err) = self.dispatcher.dispatch(&load_command).await {
            error!(
                presentation_id = %request.presentation_id,
                error = %err,
                "Playlist load failed, aborting sequence"
            );
            return Err(err.into());
        }

        for cancel_command in &cancel_commands {
            if let Err(err) = self.dispatcher.dispatch(cancel_command).await {
                error!(
                    command = %cancel_command,
                    error = %err,
                    "Playlist cancel failed, aborting sequence"
                );
                return Err(err.into());
            }
        }

        let duration_secs = request.duration_secs;
        match request.start_delay_secs {
            Some(_) => {
                // Le run différé et ses deux vagues vivent au-delà de cet
                // appel ; leurs erreurs sont avalées.
                let dispatcher = self.dispatcher.clone();
                scheduler::spawn_after(DELAYED_RUN_WAIT, async move {
                    if let Err(err) = dispatcher.dispatch(&run_command).await {
                        warn!(
                            command = %run_command,
                            error = %err,
                            "Deferred run dispatch failed, follow-on waves skipped"
                        );
                        return;
                    }
                    schedule_wave(
                        dispatcher.clone(),
                        wave_delay(duration_secs, FOLLOW_ON_LOAD_LEAD_SECS),
                        follow_on_loads,
                    );
                    schedule_wave(
                        dispatcher,
                        wave_delay(duration_secs, FOLLOW_ON_RUN_LEAD_SECS),
                        follow_on_runs,
                    );
                })
                .detach();
            }
            None => {
                if let Err(err) = self.dispatcher.dispatch(&run_command).await {
                    error!(
                        command = %run_command,
                        error = %err,
                        "Playlist run failed"
                    );
                    return Err(err.into());
                }
                schedule_wave(
                    self.dispatcher.clone(),
                    wave_delay(duration_secs, FOLLOW_ON_LOAD_LEAD_SECS),
                    follow_on_loads,
                );
                // Vague de runs à 5 s fixes ici, contrairement à la branche
                // différée : asymétrie observée du système d'origine,
                // conservée telle quelle.
                schedule_wave(self.dispatcher.clone(), DELAYED_RUN_WAIT, follow_on_runs);
            }
        }

        debug!(
            presentation_id = %request.presentation_id,
            follow_ons = request.follow_ons.len(),
            "Playlist handled"
        );
        Ok(())
    }

    /// Precompute both command waves for the request's follow-on entries
    ///
    /// The follow-on run start time is fixed at precomputation: now plus
    /// the playout length of this request (`duration / 30`) plus the same
    /// delay-and-pad applied to the primary run.
    fn follow_on_commands(request: &PlaylistRequest) -> (Vec<String>, Vec<String>) {
        if request.follow_ons.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let playout_millis =
            (request.duration_secs as f64 / PLAYBACK_RATIO * 1000.0) as i64;
        let delay_millis = (request.start_delay_secs.unwrap_or(0) * 1000
            + START_SAFETY_PAD_SECS * 1000) as i64;
        let follow_start: DateTime<Utc> =
            Utc::now() + ChronoDuration::milliseconds(playout_millis + delay_millis);
        let follow_start = format_start(follow_start);

        let loads = request
            .follow_ons
            .iter()
            .map(|f| command::load_pres(&f.flavor, f.duration_secs, &f.presentation_id, None))
            .collect();
        let runs = request
            .follow_ons
            .iter()
            .map(|f| command::run_pres(&f.presentation_id, Some(&follow_start)))
            .collect();
        (loads, runs)
    }
}

// ============================================================================
// Single-command wrappers
// ============================================================================

impl PlaylistOrchestrator {
    /// Load a presentation without running it
    pub async fn load_pres(
        &self,
        flavor: &str,
        duration_secs: u64,
        presentation_id: &str,
        logo_tag: Option<&str>,
    ) -> Result<String> {
        let load_command = command::load_pres(flavor, duration_secs, presentation_id, logo_tag);
        Ok(self.dispatcher.dispatch(&load_command).await?)
    }

    /// Generate and run a presentation in one step
    ///
    /// Bypasses the scheduling machinery entirely; prefer
    /// [`handle`](Self::handle) for anything with cancellations or
    /// follow-ons.
    pub async fn load_run_pres(
        &self,
        flavor: &str,
        duration_secs: u64,
        presentation_id: &str,
        logo_tag: Option<&str>,
    ) -> Result<String> {
        let load_run_command =
            command::load_run_pres(flavor, duration_secs, presentation_id, logo_tag);
        Ok(self.dispatcher.dispatch(&load_run_command).await?)
    }

    /// Run an already-loaded presentation, optionally at a start time
    pub async fn run_pres(
        &self,
        presentation_id: &str,
        start_time: Option<DateTime<Utc>>,
    ) -> Result<String> {
        let formatted = start_time.map(format_start);
        let run_command = command::run_pres(presentation_id, formatted.as_deref());
        Ok(self.dispatcher.dispatch(&run_command).await?)
    }

    /// Cancel a presentation, optionally at a start time
    pub async fn cancel_pres(
        &self,
        presentation_id: &str,
        start_time: Option<DateTime<Utc>>,
    ) -> Result<String> {
        let formatted = start_time.map(format_start);
        let cancel_command = command::cancel_pres(presentation_id, formatted.as_deref());
        Ok(self.dispatcher.dispatch(&cancel_command).await?)
    }
}

/// Offset of a follow-on wave from the moment it is scheduled
///
/// Negative offsets (short playlists) clamp to zero and fire immediately,
/// matching timer semantics of the original system.
fn wave_delay(duration_secs: u64, lead_secs: f64) -> Duration {
    Duration::from_secs_f64((duration_secs as f64 / PLAYBACK_RATIO - lead_secs).max(0.0))
}

/// Schedule one follow-on wave
///
/// Each command in the wave is dispatched independently: a failure in one
/// is logged and does not affect the others. Empty waves schedule
/// nothing.
fn schedule_wave(dispatcher: Arc<dyn CommandDispatcher>, delay: Duration, commands: Vec<String>) {
    if commands.is_empty() {
        return;
    }
    scheduler::spawn_after(delay, async move {
        for wave_command in commands {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                if let Err(err) = dispatcher.dispatch(&wave_command).await {
                    warn!(
                        command = %wave_command,
                        error = %err,
                        "Follow-on dispatch failed"
                    );
                }
            });
        }
    })
    .detach();
}
