//! Device start-time formatting
//!
//! Run and cancel commands carry their start time as
//! `MM/DD/YYYY HH:MM:SS:00` in UTC. The trailing `:00` is a literal
//! centisecond field; the device ignores sub-second precision.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Format an instant as an i2 start time
///
/// Calendar fields are taken in UTC, zero-padded to two digits (four for
/// the year), with a literal `:00` centisecond suffix.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use i2playlist::format_start;
///
/// let t = Utc.with_ymd_and_hms(2025, 2, 5, 14, 15, 0).unwrap();
/// assert_eq!(format_start(t), "02/05/2025 14:15:00:00");
/// ```
pub fn format_start(time: DateTime<Utc>) -> String {
    format!(
        "{:02}/{:02}/{:04} {:02}:{:02}:{:02}:00",
        time.month(),
        time.day(),
        time.year(),
        time.hour(),
        time.minute(),
        time.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_start_reference_instant() {
        let t = Utc.with_ymd_and_hms(2025, 2, 5, 14, 15, 0).unwrap();
        assert_eq!(format_start(t), "02/05/2025 14:15:00:00");
    }

    #[test]
    fn test_format_start_pads_all_fields() {
        let t = Utc.with_ymd_and_hms(2031, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_start(t), "01/02/2031 03:04:05:00");
    }

    #[test]
    fn test_format_start_drops_subseconds() {
        let t = Utc
            .with_ymd_and_hms(2025, 12, 31, 23, 59, 59)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(750))
            .unwrap();
        assert_eq!(format_start(t), "12/31/2025 23:59:59:00");
    }
}
