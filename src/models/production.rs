use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A worker's daily production submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionReport {
    pub worker_id: String,
    pub line_id: Option<String>,
    pub date: NaiveDate,
    pub produced_qty: u32,
    pub defective_qty: u32,
    pub notes: Option<String>,
    pub incidents: Option<String>,
    pub revision: i64,
    pub updated_at: String,
}

impl ProductionReport {
    /// Build an unsaved report (revision 0).
    pub fn draft(worker_id: impl Into<String>, date: NaiveDate, produced: u32, defective: u32) -> Self {
        Self {
            worker_id: worker_id.into(),
            line_id: None,
            date,
            produced_qty: produced,
            defective_qty: defective,
            notes: None,
            incidents: None,
            revision: 0,
            updated_at: String::new(),
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line_id = Some(line.into());
        self
    }

    pub fn is_consistent(&self) -> bool {
        self.defective_qty <= self.produced_qty
    }

    /// `produced - defective`; callers check `is_consistent` first.
    pub fn net_qty(&self) -> u32 {
        self.produced_qty.saturating_sub(self.defective_qty)
    }
}
