use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

/// A labelled, inclusive date span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub label: String,
    pub granularity: Granularity,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WindowSpec {
    pub fn contains(&self, d: NaiveDate) -> bool {
        d >= self.start && d <= self.end
    }
}

/// Summed production over one window. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateWindow {
    pub label: String,
    pub granularity: Granularity,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub produced: u64,
    pub defective: u64,
    pub net: u64,
    pub report_count: usize,
    pub quality_pct: f64,
}

impl AggregateWindow {
    pub fn empty(spec: &WindowSpec) -> Self {
        Self {
            label: spec.label.clone(),
            granularity: spec.granularity,
            start: spec.start,
            end: spec.end,
            produced: 0,
            defective: 0,
            net: 0,
            report_count: 0,
            quality_pct: 0.0,
        }
    }
}

/// How many trailing windows each series carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSpans {
    #[serde(default = "default_daily_days")]
    pub daily_days: u32,
    #[serde(default = "default_weekly_weeks")]
    pub weekly_weeks: u32,
    #[serde(default = "default_monthly_months")]
    pub monthly_months: u32,
}

fn default_daily_days() -> u32 {
    7
}
fn default_weekly_weeks() -> u32 {
    4
}
fn default_monthly_months() -> u32 {
    6
}

impl Default for StatsSpans {
    fn default() -> Self {
        Self {
            daily_days: default_daily_days(),
            weekly_weeks: default_weekly_weeks(),
            monthly_months: default_monthly_months(),
        }
    }
}

/// The dashboard payload: every series is ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionStats {
    pub as_of: NaiveDate,
    pub today: AggregateWindow,
    pub daily: Vec<AggregateWindow>,
    pub weekly: Vec<AggregateWindow>,
    pub monthly: Vec<AggregateWindow>,
}

impl ProductionStats {
    pub fn series(&self, granularity: Granularity) -> &[AggregateWindow] {
        match granularity {
            Granularity::Day => &self.daily,
            Granularity::Week => &self.weekly,
            Granularity::Month => &self.monthly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMetric {
    Produced,
    Net,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub magnitude: u64,
}
