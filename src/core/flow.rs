use crate::core::access::{CapabilityTable, Resource, Scope, forbidden};
use crate::core::workflow::FlowWorkflowEngine;
use crate::db::flows::{apply_transition, insert_batch, load_batch, load_batches, load_transitions};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::flow::{
    BatchQuery, FlowFilter, FlowRowDraft, FlowState, FlowTransition, OutboundFlowBatch, Party,
};
use crate::models::role::{Department, Principal};
use chrono::NaiveDateTime;

/// High-level business logic for the `flow` subcommands.
pub struct FlowLogic;

/// A batch together with its state history.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchDetail {
    pub batch: OutboundFlowBatch,
    pub transitions: Vec<FlowTransition>,
}

fn audit(pool: &DbPool, operation: &str, id: i64, message: &str) {
    if let Err(e) = ttlog(&pool.conn, operation, &format!("batch#{id}"), message) {
        tracing::warn!(error = %e, "failed to write audit log");
    }
}

impl FlowLogic {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        pool: &mut DbPool,
        gate: &CapabilityTable,
        actor: &Principal,
        sender_department: Department,
        receiver: Party,
        filter: FlowFilter,
        drafts: Vec<FlowRowDraft>,
        now: NaiveDateTime,
    ) -> AppResult<OutboundFlowBatch> {
        let engine = FlowWorkflowEngine::new(gate);
        let batch = engine.create_batch(actor, sender_department, receiver, filter, drafts, now)?;
        let stored = insert_batch(&mut pool.conn, &batch)?;

        tracing::info!(
            id = stored.id,
            sender = %stored.sender.department,
            receiver = %stored.receiver.department,
            rows = stored.total_rows,
            "flow batch created"
        );
        audit(
            pool,
            "flow.create",
            stored.id,
            &format!(
                "{} -> {} ({} rows)",
                stored.sender.department, stored.receiver.department, stored.total_rows
            ),
        );

        Ok(stored)
    }

    pub fn advance(
        pool: &mut DbPool,
        gate: &CapabilityTable,
        actor: &Principal,
        id: i64,
        target: FlowState,
        now: NaiveDateTime,
    ) -> AppResult<OutboundFlowBatch> {
        let Some(batch) = load_batch(&pool.conn, id)? else {
            return match gate.write_scope(actor, Resource::FlowBatch) {
                Scope::All => Err(AppError::NotFound(format!("flow batch {id}"))),
                _ => Err(forbidden(actor, "flow.advance")),
            };
        };

        let engine = FlowWorkflowEngine::new(gate);
        let expected = engine.check_transition(actor, &batch, target)?;
        let updated = apply_transition(&mut pool.conn, id, expected, target, actor, now)?;

        tracing::info!(id, from = %expected, to = %target, actor = %actor.user_id, "flow batch advanced");
        audit(pool, "flow.advance", id, &format!("{expected} -> {target}"));

        Ok(updated)
    }

    pub fn list(
        pool: &DbPool,
        gate: &CapabilityTable,
        caller: &Principal,
        query: &BatchQuery,
    ) -> AppResult<Vec<OutboundFlowBatch>> {
        let engine = FlowWorkflowEngine::new(gate);
        let batches = load_batches(&pool.conn)?;
        engine.list_batches(caller, batches, query)
    }

    pub fn show(
        pool: &DbPool,
        gate: &CapabilityTable,
        caller: &Principal,
        id: i64,
    ) -> AppResult<BatchDetail> {
        let engine = FlowWorkflowEngine::new(gate);
        let batch = load_batch(&pool.conn, id)?;
        engine.ensure_visible(caller, id, batch.as_ref())?;

        let batch = batch.ok_or_else(|| AppError::NotFound(format!("flow batch {id}")))?;
        let transitions = load_transitions(&pool.conn, id)?;
        Ok(BatchDetail { batch, transitions })
    }
}
