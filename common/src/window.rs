// Day selection and time-of-day window evaluation
//
// The watcher inspects a set of calendar days and only cares about slots
// whose wall-clock time falls inside a configured window. All wall-clock
// math happens in the configured timezone; the API itself speaks Unix
// timestamps.

use crate::errors::WindowError;
use crate::models::DayQuery;
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_day(value: &str) -> Result<NaiveDate, WindowError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| WindowError::InvalidDate {
        value: value.to_string(),
    })
}

/// Parse a 24-hour `HH:MM` time
pub fn parse_time(value: &str) -> Result<NaiveTime, WindowError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| WindowError::InvalidTime {
        value: value.to_string(),
    })
}

/// Inclusive time-of-day window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::InvertedWindow {
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether the instant falls inside the window, evaluated as wall-clock
    /// time in `tz`. Both ends are inclusive. Timestamps outside the range
    /// chrono can represent never match.
    pub fn contains(&self, timestamp: i64, tz: Tz) -> bool {
        match DateTime::<Utc>::from_timestamp(timestamp, 0) {
            Some(instant) => {
                let time = instant.with_timezone(&tz).time();
                self.start <= time && time <= self.end
            }
            None => false,
        }
    }
}

/// Which days a scan inspects. `Specific` wins over `DaysAhead`, which wins
/// over the `Today` fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaySelection {
    /// Explicitly listed dates, in listed order
    Specific(Vec<NaiveDate>),
    /// Today plus the following n-1 days
    DaysAhead(u32),
    /// Just today
    Today,
}

impl DaySelection {
    /// Resolve the selection into concrete day queries. `today` is the civil
    /// date in the configured timezone at the time the scan starts.
    pub fn resolve(&self, today: NaiveDate, tz: Tz) -> Vec<DayQuery> {
        let dates: Vec<NaiveDate> = match self {
            DaySelection::Specific(days) => {
                let mut seen = Vec::with_capacity(days.len());
                for day in days {
                    if !seen.contains(day) {
                        seen.push(*day);
                    }
                }
                seen
            }
            DaySelection::DaysAhead(n) => (0..*n)
                .map(|offset| today + Duration::days(i64::from(offset)))
                .collect(),
            DaySelection::Today => vec![today],
        };

        dates
            .into_iter()
            .map(|date| DayQuery {
                date,
                timestamp: day_start_timestamp(date, tz),
            })
            .collect()
    }
}

/// Unix timestamp of the day's midnight in `tz`. When midnight does not
/// exist locally (DST gap) the earliest valid instant of that day is used;
/// when it is ambiguous the earlier of the two is used.
pub fn day_start_timestamp(date: NaiveDate, tz: Tz) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(instant) => instant.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => {
            let mut probe = midnight;
            for _ in 0..(24 * 60) {
                probe += Duration::minutes(1);
                match tz.from_local_datetime(&probe) {
                    LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => {
                        return instant.timestamp();
                    }
                    LocalResult::None => continue,
                }
            }
            // A day with no valid instant at all does not occur in tzdata;
            // fall back to treating midnight as UTC.
            Utc.from_utc_datetime(&midnight).timestamp()
        }
    }
}
