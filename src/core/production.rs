use crate::core::access::{CapabilityTable, Owner, Resource, Scope, forbidden};
use crate::core::calculator::aggregator::{WindowPlan, line_stats, production_stats};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{load_reports_between, load_reports_for_worker, upsert_report};
use crate::errors::{AppError, AppResult};
use crate::models::production::ProductionReport;
use crate::models::role::Principal;
use crate::models::window::{ProductionStats, StatsSpans};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// High-level business logic for the `report` and `stats` commands.
pub struct ProductionLogic;

/// Quantities as typed by the user; negative values and
/// `defective > produced` are rejected.
pub fn validate_quantities(produced: i64, defective: i64) -> AppResult<(u32, u32)> {
    let to_u32 = |v: i64, what: &str| {
        u32::try_from(v).map_err(|_| AppError::InvalidQuantities(format!("{what} quantity {v} out of range")))
    };
    let produced = to_u32(produced, "produced")?;
    let defective = to_u32(defective, "defective")?;

    if defective > produced {
        return Err(AppError::InvalidQuantities(format!(
            "defective {defective} exceeds produced {produced}"
        )));
    }
    Ok((produced, defective))
}

impl ProductionLogic {
    pub fn submit(
        pool: &mut DbPool,
        gate: &CapabilityTable,
        caller: &Principal,
        report: &ProductionReport,
        expected_revision: Option<i64>,
    ) -> AppResult<ProductionReport> {
        if !gate.can_write(caller, Resource::Production, &Owner::user(report.worker_id.clone())) {
            return Err(forbidden(caller, "production.submit"));
        }
        if !report.is_consistent() {
            return Err(AppError::InvalidQuantities(format!(
                "defective {} exceeds produced {}",
                report.defective_qty, report.produced_qty
            )));
        }

        let saved = upsert_report(&mut pool.conn, report, expected_revision)?;

        tracing::info!(
            worker = %saved.worker_id,
            date = %saved.date,
            produced = saved.produced_qty,
            defective = saved.defective_qty,
            revision = saved.revision,
            "production report saved"
        );

        if let Err(e) = ttlog(
            &pool.conn,
            "report",
            &format!("{}@{}", saved.worker_id, saved.date),
            &format!(
                "produced {} defective {} (rev {})",
                saved.produced_qty, saved.defective_qty, saved.revision
            ),
        ) {
            tracing::warn!(error = %e, "failed to write audit log");
        }

        Ok(saved)
    }

    /// Rollups for one worker anchored at `as_of`.
    pub fn stats(
        pool: &DbPool,
        gate: &CapabilityTable,
        caller: &Principal,
        worker_id: &str,
        as_of: NaiveDate,
        spans: &StatsSpans,
    ) -> AppResult<ProductionStats> {
        if !gate.can_read(caller, Resource::Production, &Owner::user(worker_id)) {
            return Err(forbidden(caller, "production.stats"));
        }

        let (from, to) = WindowPlan::anchored(as_of, spans)?.span();
        let reports = load_reports_for_worker(&pool.conn, worker_id, &from, &to)?;
        tracing::debug!(worker = worker_id, %from, %to, count = reports.len(), "reports loaded");

        production_stats(&reports, as_of, spans)
    }

    /// Rollups per production line across every worker.
    pub fn line_stats(
        pool: &DbPool,
        gate: &CapabilityTable,
        caller: &Principal,
        as_of: NaiveDate,
        spans: &StatsSpans,
    ) -> AppResult<BTreeMap<String, ProductionStats>> {
        if gate.read_scope(caller, Resource::Production) != Scope::All {
            return Err(forbidden(caller, "production.line_stats"));
        }

        let (from, to) = WindowPlan::anchored(as_of, spans)?.span();
        let reports = load_reports_between(&pool.conn, &from, &to)?;
        tracing::debug!(%from, %to, count = reports.len(), "reports loaded");

        line_stats(&reports, as_of, spans)
    }
}
