//! Normalization of the date cells found in source sheets.
//!
//! Scraped rows carry their publication time in several layouts. Each layout
//! is tried in a fixed priority order and the first one that matches decides
//! the outcome:
//!
//! | # | Layout              | Missing parts filled with |
//! |---|---------------------|---------------------------|
//! | 1 | `YYYY/MM/DD HH:MM`  | nothing                   |
//! | 2 | `MM/DD HH:MM`       | run year                  |
//! | 3 | `MM/DD`             | run year, `00:00`         |
//! | 4 | `YYYY/MM/DD`        | `00:00`                   |
//! | 5 | `MM/DD/YYYY`        | `00:00`                   |
//!
//! Month, day and hour may be written with one or two digits, and `-` is
//! accepted wherever `/` is.
//!
//! Year-less layouts always take the run's year. A December row read on a
//! January run therefore lands eleven months in the future and falls outside
//! the window; rows are never moved to the previous year.

use crate::errors::DateParseError;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Rendering used for normalized timestamps in the output sheet.
pub const POSTED_AT_FORMAT: &str = "%Y/%m/%d %H:%M";

#[derive(Debug, Clone, Copy)]
enum Layout {
    YearMonthDayTime,
    MonthDayTime,
    MonthDay,
    YearMonthDay,
    MonthDayYear,
}

static LAYOUTS: Lazy<Vec<(Layout, Regex)>> = Lazy::new(|| {
    [
        (
            Layout::YearMonthDayTime,
            r"^([0-9]{4})[/-]([0-9]{1,2})[/-]([0-9]{1,2})\s+([0-9]{1,2}):([0-9]{2})$",
        ),
        (Layout::MonthDayTime, r"^([0-9]{1,2})[/-]([0-9]{1,2})\s+([0-9]{1,2}):([0-9]{2})$"),
        (Layout::MonthDay, r"^([0-9]{1,2})[/-]([0-9]{1,2})$"),
        (Layout::YearMonthDay, r"^([0-9]{4})[/-]([0-9]{1,2})[/-]([0-9]{1,2})$"),
        (Layout::MonthDayYear, r"^([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{4})$"),
    ]
    .into_iter()
    .map(|(layout, pattern)| (layout, Regex::new(pattern).unwrap()))
    .collect()
});

/// Turns raw date cells into comparable timestamps.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    current_year: i32,
}

impl DateNormalizer {
    /// `current_year` fills in layouts that omit the year.
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Normalize one date cell.
    ///
    /// Surrounding whitespace is ignored. Fails when no layout matches or when
    /// the matching layout does not describe a real date and time; the error
    /// carries the cell value as read.
    pub fn normalize(&self, raw: &str) -> Result<NaiveDateTime, DateParseError> {
        let token = raw.trim();
        let Some((layout, caps)) = LAYOUTS
            .iter()
            .find_map(|(layout, re)| re.captures(token).map(|caps| (*layout, caps)))
        else {
            return Err(DateParseError::UnknownFormat {
                raw: raw.to_string(),
            });
        };

        self.build(layout, &caps).ok_or_else(|| DateParseError::OutOfRange {
            raw: raw.to_string(),
        })
    }

    fn build(&self, layout: Layout, caps: &Captures<'_>) -> Option<NaiveDateTime> {
        let n = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let (year, month, day, hour, minute) = match layout {
            Layout::YearMonthDayTime => (n(1)? as i32, n(2)?, n(3)?, n(4)?, n(5)?),
            Layout::MonthDayTime => (self.current_year, n(1)?, n(2)?, n(3)?, n(4)?),
            Layout::MonthDay => (self.current_year, n(1)?, n(2)?, 0, 0),
            Layout::YearMonthDay => (n(1)? as i32, n(2)?, n(3)?, 0, 0),
            Layout::MonthDayYear => (n(3)? as i32, n(1)?, n(2)?, 0, 0),
        };
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
    }
}

/// Render a normalized timestamp the way the output sheet shows it.
pub fn format_posted_at(ts: &NaiveDateTime) -> String {
    ts.format(POSTED_AT_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_full_timestamp_used_as_is() {
        let n = DateNormalizer::new(2030);
        assert_eq!(n.normalize("2025/06/10 09:30").unwrap(), at(2025, 6, 10, 9, 30));
    }

    #[test]
    fn test_month_day_time_takes_run_year() {
        let n = DateNormalizer::new(2025);
        assert_eq!(n.normalize("6/10 09:30").unwrap(), at(2025, 6, 10, 9, 30));
        assert_eq!(n.normalize("06/10 9:30").unwrap(), at(2025, 6, 10, 9, 30));
    }

    #[test]
    fn test_date_only_layouts_default_to_midnight() {
        let n = DateNormalizer::new(2025);
        let midnight = at(2025, 6, 10, 0, 0);
        assert_eq!(n.normalize("6/10").unwrap(), midnight);
        assert_eq!(n.normalize("2025/6/10").unwrap(), midnight);
        assert_eq!(n.normalize("06/10/2025").unwrap(), midnight);
    }

    #[test]
    fn test_all_layouts_agree_on_the_same_day() {
        let n = DateNormalizer::new(2025);
        let parsed: Vec<_> = ["2025/06/10 00:00", "6/10 00:00", "6/10", "2025/6/10", "06/10/2025"]
            .iter()
            .map(|s| n.normalize(s).unwrap())
            .collect();
        assert!(parsed.iter().all(|t| *t == at(2025, 6, 10, 0, 0)));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let n = DateNormalizer::new(2025);
        assert_eq!(n.normalize("  2025/06/10 09:30\t").unwrap(), at(2025, 6, 10, 9, 30));
    }

    #[test]
    fn test_dash_delimiter_accepted() {
        let n = DateNormalizer::new(2025);
        assert_eq!(n.normalize("2025-06-10 09:30").unwrap(), at(2025, 6, 10, 9, 30));
    }

    #[test]
    fn test_year_boundary_keeps_run_year() {
        let n = DateNormalizer::new(2026);
        assert_eq!(n.normalize("12/31 23:50").unwrap(), at(2026, 12, 31, 23, 50));
    }

    #[test]
    fn test_garbage_is_unknown_format() {
        let n = DateNormalizer::new(2025);
        for raw in ["not-a-date", "", "   ", "2025/06/10 09:30:15", "yesterday"] {
            assert_eq!(
                n.normalize(raw),
                Err(DateParseError::UnknownFormat {
                    raw: raw.to_string()
                }),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_full_width_digits_are_unknown_format() {
        let n = DateNormalizer::new(2025);
        for raw in ["２０２５/06/10", "６/１０ 09:30"] {
            assert_eq!(
                n.normalize(raw),
                Err(DateParseError::UnknownFormat {
                    raw: raw.to_string()
                }),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_impossible_dates_are_out_of_range() {
        let n = DateNormalizer::new(2025);
        for raw in ["2025/02/30 10:00", "13/01", "2025/06/10 24:00", "6/10 09:75"] {
            assert!(
                matches!(n.normalize(raw), Err(DateParseError::OutOfRange { .. })),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_feb_29_depends_on_run_year() {
        assert!(DateNormalizer::new(2024).normalize("2/29").is_ok());
        assert!(DateNormalizer::new(2025).normalize("2/29").is_err());
    }

    #[test]
    fn test_format_posted_at() {
        assert_eq!(format_posted_at(&at(2025, 6, 1, 7, 5)), "2025/06/01 07:05");
    }
}
