//! Outbound-flow distribution workflow: batch validation, role-gated state
//! transitions and the filtered read model.

use crate::core::access::{CapabilityTable, Owner, Resource, Scope, forbidden};
use crate::errors::{AppError, AppResult};
use crate::models::flow::{
    BatchQuery, FlowFilter, FlowRow, FlowRowDraft, FlowState, NewFlowBatch, OutboundFlowBatch,
    Party,
};
use crate::models::role::{Department, Principal};
use chrono::NaiveDateTime;

pub struct FlowWorkflowEngine<'a> {
    gate: &'a CapabilityTable,
}

fn receiver_owner(batch: &OutboundFlowBatch) -> Owner {
    let department = batch.receiver.department;
    match &batch.receiver.user_id {
        Some(user) => Owner::user(user.clone()).with_department(department),
        None => Owner::department(department),
    }
}

fn parties_owner(batch: &OutboundFlowBatch) -> Owner {
    Owner {
        users: [&batch.sender.user_id, &batch.receiver.user_id]
            .into_iter()
            .flatten()
            .cloned()
            .collect(),
        departments: vec![batch.sender.department, batch.receiver.department],
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// All required fields present and units positive.
pub fn validate_row(index: usize, draft: FlowRowDraft) -> AppResult<FlowRow> {
    let invalid = |reason: &str| AppError::InvalidRow {
        index,
        reason: reason.to_string(),
    };

    let date = draft.date.ok_or_else(|| invalid("missing date"))?;
    let line = non_blank(draft.line).ok_or_else(|| invalid("missing line"))?;
    let reference = non_blank(draft.reference).ok_or_else(|| invalid("missing reference"))?;
    let units = match draft.units {
        Some(u) if u > 0 => u32::try_from(u).map_err(|_| invalid("unit count too large"))?,
        Some(_) => return Err(invalid("unit count must be positive")),
        None => return Err(invalid("missing unit count")),
    };
    let standard_time = draft.standard_time.unwrap_or(0.0);
    if !standard_time.is_finite() || standard_time < 0.0 {
        return Err(invalid("standard time must be a non-negative number"));
    }

    Ok(FlowRow {
        date,
        line,
        reference,
        units,
        standard_time,
        status: draft.status.unwrap_or_default(),
        observation: draft.observation.unwrap_or_default(),
        bajada: draft.bajada.unwrap_or_default(),
    })
}

impl<'a> FlowWorkflowEngine<'a> {
    pub fn new(gate: &'a CapabilityTable) -> Self {
        Self { gate }
    }

    /// Validate a new batch. Any invalid row rejects the whole batch.
    pub fn create_batch(
        &self,
        actor: &Principal,
        sender_department: Department,
        receiver: Party,
        filter: FlowFilter,
        drafts: Vec<FlowRowDraft>,
        now: NaiveDateTime,
    ) -> AppResult<NewFlowBatch> {
        let sender_owner = Owner::department(sender_department);
        if !self.gate.can_write(actor, Resource::FlowBatch, &sender_owner) {
            return Err(forbidden(actor, "flow.create"));
        }

        if drafts.is_empty() {
            return Err(AppError::EmptyBatch);
        }

        let rows = drafts
            .into_iter()
            .enumerate()
            .map(|(i, d)| validate_row(i + 1, d))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(NewFlowBatch {
            sender: Party::new(actor.user_id.clone(), sender_department),
            receiver,
            filter,
            rows,
            created_at: now,
        })
    }

    /// Guard and table check for `batch.state → target`. Returns the state
    /// the conditional update must expect.
    pub fn check_transition(
        &self,
        actor: &Principal,
        batch: &OutboundFlowBatch,
        target: FlowState,
    ) -> AppResult<FlowState> {
        if !self
            .gate
            .can_write(actor, Resource::FlowBatch, &receiver_owner(batch))
        {
            return Err(forbidden(actor, "flow.advance"));
        }

        batch.state.advance_to(target)?;
        Ok(batch.state)
    }

    pub fn is_visible(&self, caller: &Principal, batch: &OutboundFlowBatch) -> bool {
        self.gate
            .can_read(caller, Resource::FlowBatch, &parties_owner(batch))
    }

    /// Single-batch read. Callers limited to their own batches cannot tell
    /// a missing batch from someone else's.
    pub fn ensure_visible(
        &self,
        caller: &Principal,
        id: i64,
        batch: Option<&OutboundFlowBatch>,
    ) -> AppResult<()> {
        match (self.gate.read_scope(caller, Resource::FlowBatch), batch) {
            (Scope::All, None) => Err(AppError::NotFound(format!("flow batch {id}"))),
            (_, Some(b)) if self.is_visible(caller, b) => Ok(()),
            _ => Err(forbidden(caller, "flow.show")),
        }
    }

    /// Gate first, then visibility, then the caller's filters.
    pub fn list_batches(
        &self,
        caller: &Principal,
        batches: Vec<OutboundFlowBatch>,
        query: &BatchQuery,
    ) -> AppResult<Vec<OutboundFlowBatch>> {
        if !self.gate.can_list(caller, Resource::FlowBatch) {
            return Err(forbidden(caller, "flow.list"));
        }

        Ok(batches
            .into_iter()
            .filter(|b| self.is_visible(caller, b))
            .filter(|b| query.matches(b))
            .collect())
    }
}
