use crate::core::access::{CapabilityTable, Owner, Resource, forbidden};
use crate::core::calculator::attendance::compute_worked_hours;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{load_attendance_range, upsert_attendance};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{Punches, WorkerAttendanceRecord};
use crate::models::role::Principal;
use crate::utils::time::round2;
use chrono::NaiveDate;

/// High-level business logic for the `punch` and `attendance` commands.
pub struct AttendanceLogic;

/// Records of one worker over a period, with the sum of complete days.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AttendanceSheet {
    pub worker_id: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub records: Vec<WorkerAttendanceRecord>,
    pub total_hours: f64,
}

impl AttendanceLogic {
    /// Compute worked hours for the punches and store them under
    /// (worker, date), replacing whatever was there.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        pool: &mut DbPool,
        gate: &CapabilityTable,
        caller: &Principal,
        worker_id: &str,
        date: NaiveDate,
        punches: &Punches,
        expected_revision: Option<i64>,
    ) -> AppResult<WorkerAttendanceRecord> {
        if !gate.can_write(caller, Resource::Attendance, &Owner::user(worker_id)) {
            return Err(forbidden(caller, "attendance.record"));
        }

        let result = compute_worked_hours(punches)?;
        let record = upsert_attendance(
            &mut pool.conn,
            worker_id,
            &date,
            punches,
            &result,
            expected_revision,
        )?;

        tracing::info!(
            worker = worker_id,
            %date,
            status = record.status.to_db_str(),
            revision = record.revision,
            "attendance recorded"
        );

        let hours = record
            .worked_hours
            .map(|h| format!("{h:.2}h"))
            .unwrap_or_else(|| "--".to_string());
        if let Err(e) = ttlog(
            &pool.conn,
            "punch",
            &format!("{worker_id}@{date}"),
            &format!("{} {} (rev {})", record.status.to_db_str(), hours, record.revision),
        ) {
            tracing::warn!(error = %e, "failed to write audit log");
        }

        Ok(record)
    }

    pub fn list(
        pool: &DbPool,
        gate: &CapabilityTable,
        caller: &Principal,
        worker_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<AttendanceSheet> {
        if !gate.can_read(caller, Resource::Attendance, &Owner::user(worker_id)) {
            return Err(forbidden(caller, "attendance.list"));
        }
        if to < from {
            return Err(AppError::InvalidDate(format!("{from}:{to}")));
        }

        let records = load_attendance_range(&pool.conn, worker_id, &from, &to)?;
        let total_hours = round2(records.iter().filter_map(|r| r.worked_hours).sum());

        Ok(AttendanceSheet {
            worker_id: worker_id.to_string(),
            from,
            to,
            records,
            total_hours,
        })
    }
}
