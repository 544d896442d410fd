//! Worked hours from the four daily punches.

use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceStatus, Punches, WorkedHoursResult};
use crate::utils::time::{elapsed, hours, round2};
use chrono::Duration;

/// Pure: the caller is responsible for persisting the result.
///
/// - entry or exit missing → `Incomplete`, no hours
/// - exit before entry → `NegativeDuration`
/// - no break punches → whole shift, `Complete`
/// - one break punch, or break-in before break-out → break ignored, `PartialBreak`
/// - ordered break outside the shift → `InvalidTimeRange`
pub fn compute_worked_hours(p: &Punches) -> AppResult<WorkedHoursResult> {
    let (Some(entry), Some(exit)) = (p.entry, p.exit) else {
        return Ok(WorkedHoursResult::incomplete());
    };

    if exit < entry {
        let minutes = (exit.as_naive() - entry.as_naive()).num_minutes();
        return Err(AppError::NegativeDuration(minutes));
    }
    let gross = elapsed(entry, exit)?;

    let (break_duration, status) = match (p.break_out, p.break_in) {
        (None, None) => (Duration::zero(), AttendanceStatus::Complete),
        (Some(out), Some(back)) if back >= out => {
            // The break must sit inside the shift.
            elapsed(entry, out)?;
            elapsed(back, exit)?;
            (elapsed(out, back)?, AttendanceStatus::Complete)
        }
        _ => (Duration::zero(), AttendanceStatus::PartialBreak),
    };

    let net = gross - break_duration;
    if net < Duration::zero() {
        return Err(AppError::NegativeDuration(net.num_minutes()));
    }

    Ok(WorkedHoursResult {
        worked_hours: Some(round2(hours(net))),
        status,
    })
}
