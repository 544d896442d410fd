//! Storage for outbound-flow batches, their rows and transition history.

use crate::db::queries::{conversion_error, date_str, parse_date_col};
use crate::errors::{AppError, AppResult};
use crate::models::flow::{
    FlowFilter, FlowRow, FlowState, FlowTransition, NewFlowBatch, OutboundFlowBatch, Party,
};
use crate::models::role::{Department, Principal};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::HashMap;

const STAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn stamp(t: &NaiveDateTime) -> String {
    t.format(STAMP_FMT).to_string()
}

fn parse_stamp_col(row: &Row, col: &str) -> rusqlite::Result<NaiveDateTime> {
    let s: String = row.get(col)?;
    NaiveDateTime::parse_from_str(&s, STAMP_FMT)
        .map_err(|_| conversion_error(AppError::InvalidDate(s)))
}

fn parse_dept_col(row: &Row, col: &str) -> rusqlite::Result<Department> {
    let s: String = row.get(col)?;
    Department::from_code(&s).ok_or_else(|| conversion_error(AppError::InvalidRole(s)))
}

fn parse_state_col(row: &Row, col: &str) -> rusqlite::Result<FlowState> {
    let s: String = row.get(col)?;
    FlowState::from_db_str(&s).ok_or_else(|| conversion_error(AppError::InvalidState(s)))
}

/// Header only; rows are attached by the caller.
fn map_batch_header(row: &Row) -> rusqlite::Result<OutboundFlowBatch> {
    let filter_json: String = row.get("filter_json")?;
    let filter: FlowFilter = serde_json::from_str(&filter_json)
        .map_err(|e| conversion_error(AppError::Json(e)))?;
    let total_rows: i64 = row.get("total_rows")?;
    let total_rows = usize::try_from(total_rows).map_err(|_| {
        conversion_error(AppError::InvariantViolation(format!(
            "negative row count {total_rows}"
        )))
    })?;

    Ok(OutboundFlowBatch {
        id: row.get("id")?,
        sender: Party {
            user_id: row.get("sender_id")?,
            department: parse_dept_col(row, "sender_dept")?,
        },
        receiver: Party {
            user_id: row.get("receiver_id")?,
            department: parse_dept_col(row, "receiver_dept")?,
        },
        filter,
        rows: Vec::new(),
        total_rows,
        state: parse_state_col(row, "state")?,
        created_at: parse_stamp_col(row, "created_at")?,
        updated_at: parse_stamp_col(row, "updated_at")?,
    })
}

fn map_flow_row(row: &Row) -> rusqlite::Result<(i64, FlowRow)> {
    Ok((
        row.get("batch_id")?,
        FlowRow {
            date: parse_date_col(row, "date")?,
            line: row.get("line")?,
            reference: row.get("reference")?,
            units: row.get("units")?,
            standard_time: row.get("standard_time")?,
            status: row.get("status")?,
            observation: row.get("observation")?,
            bajada: row.get("bajada")?,
        },
    ))
}

/// Store header and rows atomically. Returns the stored batch.
pub fn insert_batch(conn: &mut Connection, batch: &NewFlowBatch) -> AppResult<OutboundFlowBatch> {
    let tx = conn.transaction()?;
    let created = stamp(&batch.created_at);

    tx.execute(
        "INSERT INTO flow_batches
             (sender_id, sender_dept, receiver_id, receiver_dept,
              filter_json, total_rows, state, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            batch.sender.user_id,
            batch.sender.department.code(),
            batch.receiver.user_id,
            batch.receiver.department.code(),
            serde_json::to_string(&batch.filter)?,
            batch.rows.len() as i64,
            FlowState::Pending.to_db_str(),
            created,
        ],
    )?;
    let id = tx.last_insert_rowid();

    {
        let mut stmt = tx.prepare(
            "INSERT INTO flow_rows
                 (batch_id, position, date, line, reference, units,
                  standard_time, status, observation, bajada)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for (pos, r) in batch.rows.iter().enumerate() {
            stmt.execute(params![
                id,
                pos as i64 + 1,
                date_str(&r.date),
                r.line,
                r.reference,
                r.units,
                r.standard_time,
                r.status,
                r.observation,
                r.bajada,
            ])?;
        }
    }

    tx.commit()?;

    load_batch(conn, id)?.ok_or_else(|| AppError::NotFound(format!("flow batch {id}")))
}

/// The stored row count must match the rows actually attached.
fn attach_rows(mut batch: OutboundFlowBatch, rows: Vec<FlowRow>) -> AppResult<OutboundFlowBatch> {
    if rows.len() != batch.total_rows {
        return Err(AppError::InvariantViolation(format!(
            "flow batch {} declares {} rows but has {}",
            batch.id,
            batch.total_rows,
            rows.len()
        )));
    }
    batch.rows = rows;
    Ok(batch)
}

fn load_rows(conn: &Connection, batch_id: Option<i64>) -> AppResult<HashMap<i64, Vec<FlowRow>>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM flow_rows
         WHERE ?1 IS NULL OR batch_id = ?1
         ORDER BY batch_id ASC, position ASC",
    )?;
    let rows = stmt.query_map([batch_id], map_flow_row)?;

    let mut out: HashMap<i64, Vec<FlowRow>> = HashMap::new();
    for r in rows {
        let (id, row) = r?;
        out.entry(id).or_default().push(row);
    }
    Ok(out)
}

pub fn load_batch(conn: &Connection, id: i64) -> AppResult<Option<OutboundFlowBatch>> {
    let header = conn
        .query_row("SELECT * FROM flow_batches WHERE id = ?1", [id], map_batch_header)
        .optional()?;

    let Some(batch) = header else {
        return Ok(None);
    };
    let rows = load_rows(conn, Some(id))?.remove(&id).unwrap_or_default();
    attach_rows(batch, rows).map(Some)
}

/// Every batch with its rows, oldest first.
pub fn load_batches(conn: &Connection) -> AppResult<Vec<OutboundFlowBatch>> {
    let mut stmt = conn.prepare("SELECT * FROM flow_batches ORDER BY created_at ASC, id ASC")?;
    let headers = stmt.query_map([], map_batch_header)?;

    let mut rows = load_rows(conn, None)?;
    let mut out = Vec::new();
    for h in headers {
        let batch = h?;
        let batch_rows = rows.remove(&batch.id).unwrap_or_default();
        out.push(attach_rows(batch, batch_rows)?);
    }
    Ok(out)
}

/// Conditional single-row state change plus its audit row.
///
/// Only succeeds if the stored state still equals `expected`; a concurrent
/// writer that got there first turns this call into `InvalidTransition`.
pub fn apply_transition(
    conn: &mut Connection,
    id: i64,
    expected: FlowState,
    target: FlowState,
    actor: &Principal,
    now: NaiveDateTime,
) -> AppResult<OutboundFlowBatch> {
    let tx = conn.transaction()?;
    let at = stamp(&now);

    let changed = tx.execute(
        "UPDATE flow_batches SET state = ?1, updated_at = ?2
         WHERE id = ?3 AND state = ?4",
        params![target.to_db_str(), at, id, expected.to_db_str()],
    )?;

    if changed == 0 {
        let current: Option<String> = tx
            .query_row("SELECT state FROM flow_batches WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        return match current {
            Some(s) => Err(AppError::InvalidTransition { from: s, to: target.to_string() }),
            None => Err(AppError::NotFound(format!("flow batch {id}"))),
        };
    }

    tx.execute(
        "INSERT INTO flow_transitions (batch_id, from_state, to_state, actor_id, actor_role, at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            expected.to_db_str(),
            target.to_db_str(),
            actor.user_id,
            actor.role.to_db_str(),
            at,
        ],
    )?;
    tx.commit()?;

    load_batch(conn, id)?.ok_or_else(|| AppError::NotFound(format!("flow batch {id}")))
}

pub fn load_transitions(conn: &Connection, batch_id: i64) -> AppResult<Vec<FlowTransition>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM flow_transitions WHERE batch_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([batch_id], |row| {
        Ok(FlowTransition {
            batch_id: row.get("batch_id")?,
            from: parse_state_col(row, "from_state")?,
            to: parse_state_col(row, "to_state")?,
            actor_id: row.get("actor_id")?,
            actor_role: row.get("actor_role")?,
            at: parse_stamp_col(row, "at")?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
