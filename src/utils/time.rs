//! Time utilities: parsing HH:MM[:SS] punches, elapsed-duration arithmetic,
//! decimal-hour conversion.

use crate::errors::{AppError, AppResult};
use chrono::{Duration, NaiveTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)(?::([0-5]\d))?$").expect("static time pattern")
});

/// A wall-clock punch. Displays as HH:MM, keeps seconds for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn from_hms(h: u32, m: u32, s: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(h, m, s).map(Self)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    /// Full precision representation used for storage.
    pub fn to_db_str(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }

    pub fn seconds_from_midnight(&self) -> u32 {
        self.0.num_seconds_from_midnight()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Parse `HH:MM` or `HH:MM:SS`; anything else is `MalformedTime`.
pub fn parse_time_of_day(raw: &str) -> AppResult<TimeOfDay> {
    let trimmed = raw.trim();
    let caps = TIME_RE
        .captures(trimmed)
        .ok_or_else(|| AppError::MalformedTime(raw.to_string()))?;

    let field = |i: usize| -> u32 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };

    TimeOfDay::from_hms(field(1), field(2), field(3))
        .ok_or_else(|| AppError::MalformedTime(raw.to_string()))
}

pub fn parse_optional_time(input: Option<&str>) -> AppResult<Option<TimeOfDay>> {
    match input {
        Some(s) if !s.trim().is_empty() => parse_time_of_day(s).map(Some),
        _ => Ok(None),
    }
}

/// `end - start`. No wraparound past midnight: `end < start` is an error.
pub fn elapsed(start: TimeOfDay, end: TimeOfDay) -> AppResult<Duration> {
    if end < start {
        return Err(AppError::InvalidTimeRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(end.0 - start.0)
}

/// Decimal hours, full precision.
pub fn hours(d: Duration) -> f64 {
    d.num_seconds() as f64 / 3600.0
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
