//! The daily acceptance window.
//!
//! A run keeps rows published in `[yesterday 15:00, today 15:00)`, where
//! "today" is the calendar date of the run instant. The anchor does not move
//! with the clock hour: a run at 10:00 and a run at 20:00 on the same day
//! select the same window.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::fmt;

/// Hour of day at which one batch ends and the next begins.
pub const CUTOFF_HOUR: u32 = 15;

/// Half-open interval `[start, end)` of civil timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    /// The window for a run happening at `now`.
    pub fn ending_on(now: NaiveDateTime) -> Self {
        let cutoff = NaiveTime::from_hms_opt(CUTOFF_HOUR, 0, 0).unwrap();
        let end = now.date().and_time(cutoff);
        Self {
            start: end - Duration::hours(24),
            end,
        }
    }

    /// Inclusive of `start`, exclusive of `end`.
    pub fn contains(&self, t: &NaiveDateTime) -> bool {
        self.start <= *t && *t < self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}
