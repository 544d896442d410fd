use super::role::Department;
use crate::errors::AppError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    Pending,
    Reviewed,
    Processed,
}

/// The only legal moves. Everything else (skip, repeat, backward) is rejected.
pub const TRANSITIONS: &[(FlowState, FlowState)] = &[
    (FlowState::Pending, FlowState::Reviewed),
    (FlowState::Reviewed, FlowState::Processed),
];

impl FlowState {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            FlowState::Pending => "pending",
            FlowState::Reviewed => "reviewed",
            FlowState::Processed => "processed",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Some(FlowState::Pending),
            "reviewed" | "revisado" => Some(FlowState::Reviewed),
            "processed" | "procesado" => Some(FlowState::Processed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !TRANSITIONS.iter().any(|(from, _)| from == self)
    }

    /// Validate a move against the transition table.
    pub fn advance_to(self, target: FlowState) -> Result<FlowState, AppError> {
        if TRANSITIONS.contains(&(self, target)) {
            Ok(target)
        } else {
            Err(AppError::InvalidTransition {
                from: self.to_string(),
                to: target.to_string(),
            })
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for FlowState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlowState::from_db_str(s).ok_or_else(|| AppError::InvalidState(s.to_string()))
    }
}

/// Descriptor of how the sender selected the rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

/// Unvalidated row as submitted by the sending department.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowRowDraft {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default, alias = "ticket", alias = "ficket")]
    pub reference: Option<String>,
    #[serde(default)]
    pub units: Option<i64>,
    #[serde(default)]
    pub standard_time: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(default)]
    pub bajada: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRow {
    pub date: NaiveDate,
    pub line: String,
    pub reference: String,
    pub units: u32,
    /// Minutes per unit.
    pub standard_time: f64,
    pub status: String,
    pub observation: String,
    pub bajada: String,
}

/// One side of a batch exchange. `user_id` is `None` when the batch is
/// addressed to a whole department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub user_id: Option<String>,
    pub department: Department,
}

impl Party {
    pub fn new(user_id: impl Into<String>, department: Department) -> Self {
        Self {
            user_id: Some(user_id.into()),
            department,
        }
    }

    pub fn department_only(department: Department) -> Self {
        Self {
            user_id: None,
            department,
        }
    }
}

/// A validated batch that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFlowBatch {
    pub sender: Party,
    pub receiver: Party,
    pub filter: FlowFilter,
    pub rows: Vec<FlowRow>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundFlowBatch {
    pub id: i64,
    pub sender: Party,
    pub receiver: Party,
    pub filter: FlowFilter,
    pub rows: Vec<FlowRow>,
    pub total_rows: usize,
    pub state: FlowState,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTransition {
    pub batch_id: i64,
    pub from: FlowState,
    pub to: FlowState,
    pub actor_id: String,
    pub actor_role: String,
    pub at: NaiveDateTime,
}

/// Caller-supplied filters for batch listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchQuery {
    pub state: Option<FlowState>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sender_department: Option<Department>,
    pub receiver_department: Option<Department>,
}

impl BatchQuery {
    pub fn matches(&self, batch: &OutboundFlowBatch) -> bool {
        let created = batch.created_at.date();

        self.state.is_none_or(|s| batch.state == s)
            && self.from.is_none_or(|d| created >= d)
            && self.to.is_none_or(|d| created <= d)
            && self
                .sender_department
                .is_none_or(|d| batch.sender.department == d)
            && self
                .receiver_department
                .is_none_or(|d| batch.receiver.department == d)
    }
}
