//! Key-addressed reads and upserts for attendance and production rows.
//! Both tables are keyed by (worker, date) and written last-write-wins,
//! with an optional expected revision for callers that want a conflict check.

use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceStatus, Punches, WorkedHoursResult, WorkerAttendanceRecord};
use crate::models::production::ProductionReport;
use crate::utils::time::{TimeOfDay, parse_time_of_day};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn now_stamp() -> String {
    Local::now().to_rfc3339()
}

pub(crate) fn date_str(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub(crate) fn conversion_error(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

pub(crate) fn parse_date_col(row: &Row, col: &str) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(col)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| conversion_error(AppError::InvalidDate(s)))
}

fn parse_time_col(row: &Row, col: &str) -> rusqlite::Result<Option<TimeOfDay>> {
    let raw: Option<String> = row.get(col)?;
    raw.map(|s| parse_time_of_day(&s).map_err(conversion_error))
        .transpose()
}

/// Compare the stored revision with the caller's expectation.
/// `Some(0)` means "the row must not exist yet".
fn check_revision(stored: Option<i64>, expected: Option<i64>) -> AppResult<()> {
    let actual = stored.unwrap_or(0);
    match expected {
        Some(exp) if exp != actual => Err(AppError::StaleRevision {
            expected: exp,
            actual,
        }),
        _ => Ok(()),
    }
}

// ---------------------------
// Attendance
// ---------------------------

pub fn map_attendance_row(row: &Row) -> rusqlite::Result<WorkerAttendanceRecord> {
    let status_str: String = row.get("status")?;
    let status = AttendanceStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_error(AppError::InvariantViolation(format!(
            "unknown attendance status '{status_str}'"
        )))
    })?;

    Ok(WorkerAttendanceRecord {
        worker_id: row.get("worker_id")?,
        date: parse_date_col(row, "date")?,
        punches: Punches {
            entry: parse_time_col(row, "entry_time")?,
            break_out: parse_time_col(row, "break_out")?,
            break_in: parse_time_col(row, "break_in")?,
            exit: parse_time_col(row, "exit_time")?,
        },
        worked_hours: row.get("worked_hours")?,
        status,
        revision: row.get("revision")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn load_attendance(
    conn: &Connection,
    worker_id: &str,
    date: &NaiveDate,
) -> AppResult<Option<WorkerAttendanceRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM attendance WHERE worker_id = ?1 AND date = ?2")?;
    Ok(stmt
        .query_row(params![worker_id, date_str(date)], map_attendance_row)
        .optional()?)
}

pub fn load_attendance_range(
    conn: &Connection,
    worker_id: &str,
    from: &NaiveDate,
    to: &NaiveDate,
) -> AppResult<Vec<WorkerAttendanceRecord>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM attendance
         WHERE worker_id = ?1 AND date BETWEEN ?2 AND ?3
         ORDER BY date ASC",
    )?;

    let rows = stmt.query_map(params![worker_id, date_str(from), date_str(to)], map_attendance_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Insert or overwrite the (worker, date) attendance row.
pub fn upsert_attendance(
    conn: &mut Connection,
    worker_id: &str,
    date: &NaiveDate,
    punches: &Punches,
    result: &WorkedHoursResult,
    expected_revision: Option<i64>,
) -> AppResult<WorkerAttendanceRecord> {
    let tx = conn.transaction()?;
    let d = date_str(date);

    let stored: Option<i64> = tx
        .query_row(
            "SELECT revision FROM attendance WHERE worker_id = ?1 AND date = ?2",
            params![worker_id, d],
            |row| row.get(0),
        )
        .optional()?;
    check_revision(stored, expected_revision)?;

    let t = |p: Option<TimeOfDay>| p.map(|v| v.to_db_str());
    tx.execute(
        "INSERT INTO attendance
             (worker_id, date, entry_time, break_out, break_in, exit_time,
              worked_hours, status, revision, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)
         ON CONFLICT(worker_id, date) DO UPDATE SET
             entry_time   = excluded.entry_time,
             break_out    = excluded.break_out,
             break_in     = excluded.break_in,
             exit_time    = excluded.exit_time,
             worked_hours = excluded.worked_hours,
             status       = excluded.status,
             revision     = attendance.revision + 1,
             updated_at   = excluded.updated_at",
        params![
            worker_id,
            d,
            t(punches.entry),
            t(punches.break_out),
            t(punches.break_in),
            t(punches.exit),
            result.worked_hours,
            result.status.to_db_str(),
            now_stamp(),
        ],
    )?;

    let record = tx.query_row(
        "SELECT * FROM attendance WHERE worker_id = ?1 AND date = ?2",
        params![worker_id, d],
        map_attendance_row,
    )?;
    tx.commit()?;

    Ok(record)
}

// ---------------------------
// Production
// ---------------------------

pub fn map_report_row(row: &Row) -> rusqlite::Result<ProductionReport> {
    Ok(ProductionReport {
        worker_id: row.get("worker_id")?,
        line_id: row.get("line_id")?,
        date: parse_date_col(row, "date")?,
        produced_qty: row.get("produced_qty")?,
        defective_qty: row.get("defective_qty")?,
        notes: row.get("notes")?,
        incidents: row.get("incidents")?,
        revision: row.get("revision")?,
        updated_at: row.get("updated_at")?,
    })
}

fn collect_reports(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> AppResult<Vec<ProductionReport>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_report_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_reports_for_worker(
    conn: &Connection,
    worker_id: &str,
    from: &NaiveDate,
    to: &NaiveDate,
) -> AppResult<Vec<ProductionReport>> {
    collect_reports(
        conn,
        "SELECT * FROM production_reports
         WHERE worker_id = ?1 AND date BETWEEN ?2 AND ?3
         ORDER BY date ASC",
        params![worker_id, date_str(from), date_str(to)],
    )
}

pub fn load_reports_between(
    conn: &Connection,
    from: &NaiveDate,
    to: &NaiveDate,
) -> AppResult<Vec<ProductionReport>> {
    collect_reports(
        conn,
        "SELECT * FROM production_reports
         WHERE date BETWEEN ?1 AND ?2
         ORDER BY date ASC, worker_id ASC",
        params![date_str(from), date_str(to)],
    )
}

/// Insert or amend the (worker, date) production report.
pub fn upsert_report(
    conn: &mut Connection,
    report: &ProductionReport,
    expected_revision: Option<i64>,
) -> AppResult<ProductionReport> {
    let tx = conn.transaction()?;
    let d = date_str(&report.date);

    let stored: Option<i64> = tx
        .query_row(
            "SELECT revision FROM production_reports WHERE worker_id = ?1 AND date = ?2",
            params![report.worker_id, d],
            |row| row.get(0),
        )
        .optional()?;
    check_revision(stored, expected_revision)?;

    tx.execute(
        "INSERT INTO production_reports
             (worker_id, date, line_id, produced_qty, defective_qty,
              notes, incidents, revision, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
         ON CONFLICT(worker_id, date) DO UPDATE SET
             line_id       = excluded.line_id,
             produced_qty  = excluded.produced_qty,
             defective_qty = excluded.defective_qty,
             notes         = excluded.notes,
             incidents     = excluded.incidents,
             revision      = production_reports.revision + 1,
             updated_at    = excluded.updated_at",
        params![
            report.worker_id,
            d,
            report.line_id,
            report.produced_qty,
            report.defective_qty,
            report.notes,
            report.incidents,
            now_stamp(),
        ],
    )?;

    let saved = tx.query_row(
        "SELECT * FROM production_reports WHERE worker_id = ?1 AND date = ?2",
        params![report.worker_id, d],
        map_report_row,
    )?;
    tx.commit()?;

    Ok(saved)
}
