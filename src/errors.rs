//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Input validation
    // ---------------------------
    #[error("Malformed time: '{0}' (expected HH:MM or HH:MM:SS)")]
    MalformedTime(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid quantities: {0}")]
    InvalidQuantities(String),

    #[error("A flow batch needs at least one row")]
    EmptyBatch,

    #[error("Invalid row #{index}: {reason}")]
    InvalidRow { index: usize, reason: String },

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid flow state: {0}")]
    InvalidState(String),

    // ---------------------------
    // Invariant violations
    // ---------------------------
    #[error("Invalid time range: {end} is before {start}")]
    InvalidTimeRange { start: String, end: String },

    #[error("Negative worked duration: {0} minutes")]
    NegativeDuration(i64),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    // ---------------------------
    // Authorization
    // ---------------------------
    #[error("Operation not permitted")]
    Forbidden,

    // ---------------------------
    // State machine / concurrency
    // ---------------------------
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Stale revision: expected {expected}, stored {actual}")]
    StaleRevision { expected: i64, actual: i64 },

    #[error("Not found: {0}")]
    NotFound(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Stable, machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Io(_) => "io",
            AppError::Db(_) => "db",
            AppError::Json(_) => "json",
            AppError::MalformedTime(_) => "malformed_time",
            AppError::InvalidDate(_) => "invalid_date",
            AppError::InvalidQuantities(_) => "invalid_quantities",
            AppError::EmptyBatch => "empty_batch",
            AppError::InvalidRow { .. } => "invalid_row",
            AppError::InvalidRole(_) => "invalid_role",
            AppError::InvalidState(_) => "invalid_state",
            AppError::InvalidTimeRange { .. } => "invalid_time_range",
            AppError::NegativeDuration(_) => "negative_duration",
            AppError::InvariantViolation(_) => "invariant_violation",
            AppError::Forbidden => "forbidden",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::StaleRevision { .. } => "stale_revision",
            AppError::NotFound(_) => "not_found",
            AppError::Config(_) | AppError::ConfigParse(_) => "config",
            AppError::Other(_) => "other",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
