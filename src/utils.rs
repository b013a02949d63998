//! Small string and clock helpers used throughout the application.
//!
//! - Character-safe truncation for log previews and model input
//! - Resolution of the run instant ("now") in the configured civil clock
//! - Destination sheet naming

use chrono::{FixedOffset, Local, NaiveDateTime, Utc};
use tracing::warn;

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a byte count
/// of what was dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let head = truncate_chars(s, max);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", head, s.len() - head.len())
    }
}

/// The first `max` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Fixed offset for a whole number of hours east of UTC, if representable.
fn offset_hours(h: i32) -> Option<FixedOffset> {
    h.checked_mul(3600).and_then(FixedOffset::east_opt)
}

/// Current civil time, either in a fixed UTC offset or the host's zone.
///
/// An offset that cannot be represented falls back to the host's zone with
/// a warning; [`Config::validate`](crate::config::Config::validate) rejects
/// those before a run starts.
pub fn civil_now(utc_offset_hours: Option<i32>) -> NaiveDateTime {
    let Some(h) = utc_offset_hours else {
        return Local::now().naive_local();
    };
    match offset_hours(h) {
        Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
        None => {
            warn!(utc_offset_hours = h, "Unrepresentable UTC offset; using host local time");
            Local::now().naive_local()
        }
    }
}

/// Name of the destination sheet for a run: the run date as `YYMMDD`.
pub fn sheet_name_for(now: &NaiveDateTime) -> String {
    now.format("%y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        let s = "株価が大幅に上昇";
        assert_eq!(truncate_chars(s, 2), "株価");
        assert_eq!(truncate_chars(s, 100), s);
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_sheet_name_is_yymmdd() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(sheet_name_for(&now), "250603");
    }

    #[test]
    fn test_civil_now_with_offset_is_close_to_utc_plus_offset() {
        let jst = civil_now(Some(9));
        let utc = Utc::now().naive_utc();
        let diff = (jst - utc).num_minutes();
        assert!((539..=541).contains(&diff), "diff was {diff}");
    }

    #[test]
    fn test_offset_hours_bounds() {
        assert_eq!(offset_hours(9).map(|o| o.local_minus_utc()), Some(9 * 3600));
        assert_eq!(offset_hours(-23).map(|o| o.local_minus_utc()), Some(-23 * 3600));
        assert!(offset_hours(24).is_none());
        assert!(offset_hours(600_000).is_none());
        assert!(offset_hours(i32::MIN).is_none());
    }
}
