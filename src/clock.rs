//! Clock-time codec
//!
//! Session times are recorded as `H:M:S` wall-clock strings without an AM/PM
//! marker and are handled everywhere else as flat second counts since
//! midnight. The daylight-saving correction adds a literal hour without
//! wrapping at 24:00:00; downstream alignment arithmetic only ever subtracts
//! these counts, so a value past 86400 stays meaningful.

use crate::error::PipelineError;

/// Seconds since midnight on a 24-hour scale.
pub type ClockTime = i64;

/// Seconds in one hour.
const HOUR: ClockTime = 3600;

/// Seconds in twelve hours, added when a time is inferred to be PM.
const HALF_DAY: ClockTime = 43200;

/// Parse an `H:M:S` string into seconds since midnight.
///
/// Exactly three colon-separated integer fields are required.
pub fn parse_hms(s: &str) -> Result<ClockTime, PipelineError> {
    let fields: Vec<&str> = s.split(':').collect();
    if fields.len() != 3 {
        return Err(PipelineError::TimeFormat(s.to_string()));
    }
    let mut parts = [0i64; 3];
    for (slot, field) in parts.iter_mut().zip(&fields) {
        *slot = field
            .trim()
            .parse::<i64>()
            .map_err(|_| PipelineError::TimeFormat(s.to_string()))?;
    }
    Ok(parts[0] * HOUR + parts[1] * 60 + parts[2])
}

/// Format seconds since midnight as `HH:MM:SS`, each field zero-padded to
/// width 2. Hour values of 24 or more render as-is.
pub fn format_hms(t: ClockTime) -> String {
    let hours = t / HOUR;
    let minutes = (t - hours * HOUR) / 60;
    let seconds = t - hours * HOUR - minutes * 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Add one hour, compensating for the daylight-saving clock change.
/// No 24h wrap is applied.
pub fn add_hour(t: ClockTime) -> ClockTime {
    t + HOUR
}

/// Resolve the missing AM/PM marker: a time earlier than `cutoff_hour` is
/// assumed to be PM and shifted forward twelve hours.
pub fn resolve_am_pm(t: ClockTime, cutoff_hour: i64) -> ClockTime {
    if t < cutoff_hour * HOUR {
        t + HALF_DAY
    } else {
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_and_format_round_trip() {
        for t in [0, 59, 3600, 43199, 86399] {
            assert_eq!(parse_hms(&format_hms(t)).unwrap(), t);
        }
    }

    #[test]
    fn parse_rejects_wrong_field_count() {
        assert!(parse_hms("10:30").is_err());
        assert!(parse_hms("10:30:00:00").is_err());
        assert!(parse_hms("").is_err());
        assert!(parse_hms("ten:30:00").is_err());
    }

    #[test]
    fn format_pads_fields() {
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(0), "00:00:00");
    }

    #[test]
    fn dst_hour_does_not_wrap() {
        // 23:30:00 + 1h stays a flat second count past midnight
        let t = add_hour(parse_hms("23:30:00").unwrap());
        assert_eq!(t, 86400 + 1800);
        assert_eq!(format_hms(t), "24:30:00");
    }

    #[test]
    fn am_pm_cutoff() {
        // 7:59 with cutoff 8 is assumed PM
        assert_eq!(resolve_am_pm(parse_hms("7:59:00").unwrap(), 8), 43200 + 7 * 3600 + 59 * 60);
        // 8:00 with cutoff 8 is left alone
        assert_eq!(resolve_am_pm(8 * 3600, 8), 8 * 3600);
        // intervention sessions never start before 08:00, pre/post never before noon
        assert_eq!(resolve_am_pm(parse_hms("1:15:00").unwrap(), 12), 13 * 3600 + 15 * 60);
    }
}
