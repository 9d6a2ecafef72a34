//! Device command string grammar
//!
//! The command strings are a bit-exact contract with the device: literal
//! function names, literal parameter names, comma separators, and the
//! surrounding double quotes must all be reproduced exactly as the exec
//! shim expects them.

/// Filter a logo tag down to the values the device accepts
///
/// The device treats `0` as "no logo", so a tag of `"0"` (and the empty
/// string) must be omitted from the load command entirely.
fn effective_logo(tag: Option<&str>) -> Option<&str> {
    match tag {
        Some("") | Some("0") | None => None,
        Some(tag) => Some(tag),
    }
}

/// Build a `loadPres` command (loads a presentation without running it)
pub fn load_pres(
    flavor: &str,
    duration_secs: u64,
    presentation_id: &str,
    logo_tag: Option<&str>,
) -> String {
    match effective_logo(logo_tag) {
        Some(tag) => format!(
            "loadPres(\"Flavor={},Duration={},PresentationId={},Logo={}\")",
            flavor, duration_secs, presentation_id, tag
        ),
        None => format!(
            "loadPres(\"Flavor={},Duration={},PresentationId={}\")",
            flavor, duration_secs, presentation_id
        ),
    }
}

/// Build a `loadRunPres` command (generates and runs in one step)
pub fn load_run_pres(
    flavor: &str,
    duration_secs: u64,
    presentation_id: &str,
    logo_tag: Option<&str>,
) -> String {
    match effective_logo(logo_tag) {
        Some(tag) => format!(
            "loadRunPres(\"Flavor={},Duration={},PresentationId={},Logo={}\")",
            flavor, duration_secs, presentation_id, tag
        ),
        None => format!(
            "loadRunPres(\"Flavor={},Duration={},PresentationId={}\")",
            flavor, duration_secs, presentation_id
        ),
    }
}

/// Build a `runPres` command for an already-loaded presentation
///
/// `start_time` must be in the device start-time format (see
/// [`format_start`](crate::format_start)); omitted, the device runs the
/// presentation immediately.
pub fn run_pres(presentation_id: &str, start_time: Option<&str>) -> String {
    match start_time {
        Some(start) => format!(
            "runPres(\"PresentationId={},StartTime={}\")",
            presentation_id, start
        ),
        None => format!("runPres(\"PresentationId={}\")", presentation_id),
    }
}

/// Build a `cancelPres` command
pub fn cancel_pres(presentation_id: &str, start_time: Option<&str>) -> String {
    match start_time {
        Some(start) => format!(
            "cancelPres(\"PresentationId={},StartTime={}\")",
            presentation_id, start
        ),
        None => format!("cancelPres(\"PresentationId={}\")", presentation_id),
    }
}
