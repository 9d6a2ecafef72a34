//! Playlist request model
//!
//! A [`PlaylistRequest`] is the unit of work submitted to the
//! orchestrator. It carries no identity beyond one orchestration call;
//! the orchestrator keeps no state between requests.

/// An in-flight presentation to cancel at the request's base time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    /// Device-side id of the presentation to cancel
    pub presentation_id: String,
}

impl Cancellation {
    /// Create a cancellation for a presentation id
    pub fn new(presentation_id: impl Into<String>) -> Self {
        Self {
            presentation_id: presentation_id.into(),
        }
    }
}

/// A presentation pre-staged to load and run near the end of the current
/// request's duration window, enabling chained playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowOn {
    /// Device-side id of the follow-on presentation
    pub presentation_id: String,
    /// Theme/content identifier for the follow-on
    pub flavor: String,
    /// Duration of the follow-on playlist in seconds
    pub duration_secs: u64,
}

impl FollowOn {
    /// Create a follow-on entry
    pub fn new(
        presentation_id: impl Into<String>,
        flavor: impl Into<String>,
        duration_secs: u64,
    ) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            flavor: flavor.into(),
            duration_secs,
        }
    }
}

/// A fully-described playlist handling request
///
/// Optional fields are real `Option`s: a start delay of `Some(0)` is a
/// valid zero-second delay and takes the delayed dispatch path, distinct
/// from `None` (run immediately).
///
/// # Example
///
/// ```
/// use i2playlist::{FollowOn, PlaylistRequest};
///
/// let request = PlaylistRequest::new("domestic/V", 1950, "4")
///     .logo_tag("domesticAds/TAG3631")
///     .start_delay(10)
///     .cancel("ldl3")
///     .cancel("sidebar2")
///     .follow_on(FollowOn::new("ldl3", "domestic/ldlE", 72000));
/// assert_eq!(request.cancellations.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRequest {
    /// Theme/content identifier on the device
    pub flavor: String,
    /// Playlist duration in seconds; drives every downstream timing offset
    pub duration_secs: u64,
    /// Device-side correlation id for load/run/cancel
    pub presentation_id: String,
    /// Optional overlay tag appended to the load command
    pub logo_tag: Option<String>,
    /// Optional deferral of the run command, in seconds
    pub start_delay_secs: Option<u64>,
    /// Presentations to cancel at the request's base time, in order
    pub cancellations: Vec<Cancellation>,
    /// Presentations to pre-stage near the end of this request's window
    pub follow_ons: Vec<FollowOn>,
}

impl PlaylistRequest {
    /// Create a request with the three required fields
    pub fn new(
        flavor: impl Into<String>,
        duration_secs: u64,
        presentation_id: impl Into<String>,
    ) -> Self {
        Self {
            flavor: flavor.into(),
            duration_secs,
            presentation_id: presentation_id.into(),
            logo_tag: None,
            start_delay_secs: None,
            cancellations: Vec::new(),
            follow_ons: Vec::new(),
        }
    }

    /// Set the overlay logo tag
    ///
    /// Tags of `"0"` or `""` are kept here but filtered out of the load
    /// command (the device treats them as "no logo").
    pub fn logo_tag(mut self, tag: impl Into<String>) -> Self {
        self.logo_tag = Some(tag.into());
        self
    }

    /// Defer the run command by `secs` seconds (plus the fixed safety pad)
    pub fn start_delay(mut self, secs: u64) -> Self {
        self.start_delay_secs = Some(secs);
        self
    }

    /// Add a presentation to cancel at this request's base time
    pub fn cancel(mut self, presentation_id: impl Into<String>) -> Self {
        self.cancellations
            .push(Cancellation::new(presentation_id));
        self
    }

    /// Add a follow-on presentation to pre-stage
    pub fn follow_on(mut self, follow_on: FollowOn) -> Self {
        self.follow_ons.push(follow_on);
        self
    }
}
