// libs/shared/models/src/time_window.rs
use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeWindowError {
    #[error("Malformed time value: {0}")]
    Malformed(String),

    #[error("Time {0} is not on a whole minute")]
    SubMinute(NaiveTime),

    #[error("Window start {start} is after its end {end}")]
    Inverted { start: NaiveTime, end: NaiveTime },

    #[error("Window starting at {start} with {minutes} minutes runs past midnight")]
    PastMidnight { start: NaiveTime, minutes: i64 },
}

/// Half-open interval `[start, end)` on a single calendar date, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow", into = "RawTimeWindow")]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TimeWindowError> {
        ensure_whole_minute(start)?;
        ensure_whole_minute(end)?;
        if start > end {
            return Err(TimeWindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window of `minutes` length beginning at `start`. Fails rather than wrapping past midnight.
    pub fn starting_at(start: NaiveTime, minutes: i64) -> Result<Self, TimeWindowError> {
        ensure_whole_minute(start)?;
        let end_minute = i64::from(minute_of_day(start)) + minutes;
        if minutes < 0 || end_minute >= i64::from(MINUTES_PER_DAY) {
            return Err(TimeWindowError::PastMidnight { start, minutes });
        }
        let end = time_from_minutes(end_minute as u32)
            .ok_or(TimeWindowError::PastMidnight { start, minutes })?;
        Ok(Self { start, end })
    }

    /// Parses `"HH:MM"` (or `"HH:MM:SS"`) boundaries.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeWindowError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        i64::from(minute_of_day(self.end)) - i64::from(minute_of_day(self.start))
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        overlaps(self, other)
    }

    pub fn gap_minutes(&self, other: &TimeWindow) -> i64 {
        gap_minutes(self, other)
    }

    /// True if `self` lies entirely inside `outer`.
    pub fn within(&self, outer: &TimeWindow) -> bool {
        outer.start <= self.start && self.end <= outer.end
    }

    /// Minute-of-hour of the window start, used for interval granularity checks.
    pub fn start_minute(&self) -> u32 {
        self.start.minute()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// `a.start < b.end && b.start < a.end`. Zero-length windows never overlap anything.
pub fn overlaps(a: &TimeWindow, b: &TimeWindow) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.start < b.end && b.start < a.end
}

/// Minutes from the end of the earlier window to the start of the later one.
/// Negative when the windows overlap.
pub fn gap_minutes(a: &TimeWindow, b: &TimeWindow) -> i64 {
    let (earlier, later) = if (a.start, a.end) <= (b.start, b.end) { (a, b) } else { (b, a) };
    i64::from(minute_of_day(later.start)) - i64::from(minute_of_day(earlier.end))
}

pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub fn time_from_minutes(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

pub fn parse_time(value: &str) -> Result<NaiveTime, TimeWindowError> {
    let trimmed = value.trim();
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| TimeWindowError::Malformed(value.to_string()))?;
    ensure_whole_minute(time)?;
    Ok(time)
}

fn ensure_whole_minute(time: NaiveTime) -> Result<(), TimeWindowError> {
    if time.second() != 0 || time.nanosecond() != 0 {
        return Err(TimeWindowError::SubMinute(time));
    }
    Ok(())
}

#[derive(Serialize, Deserialize)]
struct RawTimeWindow {
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = TimeWindowError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl From<TimeWindow> for RawTimeWindow {
    fn from(window: TimeWindow) -> Self {
        Self { start: window.start, end: window.end }
    }
}

/// Serde adapter writing `NaiveTime` as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(start, end).unwrap()
    }

    #[test]
    fn overlap_is_symmetric() {
        let windows = [
            w("09:00", "09:30"),
            w("09:15", "09:45"),
            w("09:30", "10:00"),
            w("08:00", "12:00"),
            w("09:30", "09:30"),
        ];
        for a in &windows {
            for b in &windows {
                assert_eq!(overlaps(a, b), overlaps(b, a), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn zero_length_never_overlaps() {
        let empty = w("10:00", "10:00");
        assert!(!overlaps(&empty, &w("09:00", "11:00")));
        assert!(!overlaps(&empty, &empty));
    }

    #[test]
    fn back_to_back_does_not_overlap() {
        assert!(!overlaps(&w("09:00", "09:30"), &w("09:30", "10:00")));
        assert_eq!(gap_minutes(&w("09:00", "09:30"), &w("09:30", "10:00")), 0);
    }

    #[test]
    fn gap_is_order_independent_and_negative_on_overlap() {
        let existing = w("10:00", "10:30");
        assert_eq!(gap_minutes(&existing, &w("10:33", "11:03")), 3);
        assert_eq!(gap_minutes(&w("10:33", "11:03"), &existing), 3);
        assert!(gap_minutes(&existing, &w("10:25", "10:55")) < 0);
        assert!(gap_minutes(&w("09:00", "12:00"), &w("10:00", "10:30")) < 0);
    }

    #[test]
    fn starting_at_refuses_to_wrap() {
        let late = NaiveTime::from_hms_opt(23, 45, 0).unwrap();
        assert!(matches!(
            TimeWindow::starting_at(late, 30),
            Err(TimeWindowError::PastMidnight { .. })
        ));
        let window = TimeWindow::starting_at(NaiveTime::from_hms_opt(9, 0, 0).unwrap(), 30).unwrap();
        assert_eq!(window, w("09:00", "09:30"));
        assert_eq!(window.duration_minutes(), 30);
    }

    #[test]
    fn rejects_malformed_and_inverted() {
        assert!(matches!(TimeWindow::parse("9h", "10:00"), Err(TimeWindowError::Malformed(_))));
        assert!(matches!(TimeWindow::parse("11:00", "10:00"), Err(TimeWindowError::Inverted { .. })));
        assert!(matches!(TimeWindow::parse("10:00:30", "11:00"), Err(TimeWindowError::SubMinute(_))));
    }

    #[test]
    fn serializes_as_hours_and_minutes() {
        let json = serde_json::to_value(w("09:00", "09:30")).unwrap();
        assert_eq!(json, serde_json::json!({ "start": "09:00", "end": "09:30" }));

        let inverted = serde_json::from_value::<TimeWindow>(serde_json::json!({ "start": "10:00", "end": "09:00" }));
        assert!(inverted.is_err());
    }
}
