use crate::utils::time::TimeOfDay;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The four clock punches of one worker on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punches {
    pub entry: Option<TimeOfDay>,
    pub break_out: Option<TimeOfDay>,
    pub break_in: Option<TimeOfDay>,
    pub exit: Option<TimeOfDay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// Entry and exit present; break either absent or well formed.
    Complete,
    /// Entry or exit missing (worker may still be on shift).
    Incomplete,
    /// A break punch is missing or out of order; the break was ignored.
    PartialBreak,
}

impl AttendanceStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Complete => "complete",
            AttendanceStatus::Incomplete => "incomplete",
            AttendanceStatus::PartialBreak => "partial_break",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "complete" => Some(AttendanceStatus::Complete),
            "incomplete" => Some(AttendanceStatus::Incomplete),
            "partial_break" => Some(AttendanceStatus::PartialBreak),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkedHoursResult {
    /// Decimal hours rounded to two places; `None` while incomplete.
    pub worked_hours: Option<f64>,
    pub status: AttendanceStatus,
}

impl WorkedHoursResult {
    pub fn incomplete() -> Self {
        Self {
            worked_hours: None,
            status: AttendanceStatus::Incomplete,
        }
    }
}

/// One stored attendance row, keyed by (worker, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerAttendanceRecord {
    pub worker_id: String,
    pub date: NaiveDate,
    pub punches: Punches,
    pub worked_hours: Option<f64>,
    pub status: AttendanceStatus,
    pub revision: i64,
    pub updated_at: String,
}

impl WorkerAttendanceRecord {
    pub fn result(&self) -> WorkedHoursResult {
        WorkedHoursResult {
            worked_hours: self.worked_hours,
            status: self.status,
        }
    }
}
