//! Day / week / month production rollups with quality ratios.
//!
//! Windows are anchored to an explicit `as_of` date, never to a clock read
//! inside the engine. No window reaches past `as_of`.

use crate::errors::{AppError, AppResult};
use crate::models::production::ProductionReport;
use crate::models::window::{
    AggregateWindow, Granularity, ProductionStats, StatsSpans, Trend, TrendDirection, TrendMetric,
    WindowSpec,
};
use crate::utils::date;
use crate::utils::time::round2;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Reports without a line are grouped under this key in per-line stats.
pub const UNASSIGNED_LINE: &str = "unassigned";

/// The full set of windows for one `as_of`, each series oldest first.
#[derive(Debug, Clone)]
pub struct WindowPlan {
    pub today: WindowSpec,
    pub daily: Vec<WindowSpec>,
    pub weekly: Vec<WindowSpec>,
    pub monthly: Vec<WindowSpec>,
}

impl WindowPlan {
    pub fn anchored(as_of: NaiveDate, spans: &StatsSpans) -> AppResult<Self> {
        let day = |d: NaiveDate| WindowSpec {
            label: d.format("%Y-%m-%d").to_string(),
            granularity: Granularity::Day,
            start: d,
            end: d,
        };

        let mut daily = Vec::with_capacity(spans.daily_days as usize);
        for back in (0..spans.daily_days).rev() {
            daily.push(day(date::days_before(as_of, u64::from(back))?));
        }

        let this_week = date::week_start(as_of)?;
        let mut weekly = Vec::with_capacity(spans.weekly_weeks as usize);
        for back in (0..spans.weekly_weeks).rev() {
            let start = date::days_before(this_week, u64::from(back) * 7)?;
            let end = start
                .checked_add_days(chrono::Days::new(6))
                .ok_or_else(|| AppError::InvalidDate(format!("No week end for {start}")))?;
            weekly.push(WindowSpec {
                label: date::iso_week_label(start),
                granularity: Granularity::Week,
                start,
                end: end.min(as_of),
            });
        }

        let this_month = date::month_start(as_of);
        let mut monthly = Vec::with_capacity(spans.monthly_months as usize);
        for back in (0..spans.monthly_months).rev() {
            let start = date::months_before(this_month, back)?;
            monthly.push(WindowSpec {
                label: start.format("%Y-%m").to_string(),
                granularity: Granularity::Month,
                start,
                end: date::month_end(start)?.min(as_of),
            });
        }

        Ok(Self {
            today: day(as_of),
            daily,
            weekly,
            monthly,
        })
    }

    /// Earliest start and latest end over every window of the plan.
    pub fn span(&self) -> (NaiveDate, NaiveDate) {
        let all = || {
            std::iter::once(&self.today)
                .chain(&self.daily)
                .chain(&self.weekly)
                .chain(&self.monthly)
        };
        let start = all().map(|w| w.start).min().unwrap_or(self.today.start);
        let end = all().map(|w| w.end).max().unwrap_or(self.today.end);
        (start, end)
    }
}

/// Fail fast on the first report with more defects than output.
fn ensure_consistent(reports: &[ProductionReport]) -> AppResult<()> {
    if let Some(bad) = reports.iter().find(|r| !r.is_consistent()) {
        return Err(AppError::InvariantViolation(format!(
            "report of worker '{}' on {} has defective {} > produced {}",
            bad.worker_id, bad.date, bad.defective_qty, bad.produced_qty
        )));
    }
    Ok(())
}

pub fn quality_pct(produced: u64, net: u64) -> f64 {
    if produced == 0 {
        return 0.0;
    }
    round2(net as f64 * 100.0 / produced as f64)
}

fn fold_window(spec: &WindowSpec, reports: &[ProductionReport]) -> AggregateWindow {
    let mut w = AggregateWindow::empty(spec);

    for r in reports.iter().filter(|r| spec.contains(r.date)) {
        w.produced += u64::from(r.produced_qty);
        w.defective += u64::from(r.defective_qty);
        w.report_count += 1;
    }

    w.net = w.produced - w.defective;
    w.quality_pct = quality_pct(w.produced, w.net);
    w
}

/// One aggregate per window, in the order given. Empty windows are kept.
pub fn rollup(reports: &[ProductionReport], windows: &[WindowSpec]) -> AppResult<Vec<AggregateWindow>> {
    ensure_consistent(reports)?;
    Ok(windows.iter().map(|w| fold_window(w, reports)).collect())
}

fn stats_for_plan(reports: &[ProductionReport], as_of: NaiveDate, plan: &WindowPlan) -> ProductionStats {
    let fold_all = |specs: &[WindowSpec]| -> Vec<AggregateWindow> {
        specs.iter().map(|s| fold_window(s, reports)).collect()
    };

    ProductionStats {
        as_of,
        today: fold_window(&plan.today, reports),
        daily: fold_all(&plan.daily),
        weekly: fold_all(&plan.weekly),
        monthly: fold_all(&plan.monthly),
    }
}

/// `today`, `daily`, `weekly`, `monthly` for one report set (usually one worker).
pub fn production_stats(
    reports: &[ProductionReport],
    as_of: NaiveDate,
    spans: &StatsSpans,
) -> AppResult<ProductionStats> {
    ensure_consistent(reports)?;
    let plan = WindowPlan::anchored(as_of, spans)?;
    Ok(stats_for_plan(reports, as_of, &plan))
}

/// Same rollups grouped by production line.
pub fn line_stats(
    reports: &[ProductionReport],
    as_of: NaiveDate,
    spans: &StatsSpans,
) -> AppResult<BTreeMap<String, ProductionStats>> {
    ensure_consistent(reports)?;
    let plan = WindowPlan::anchored(as_of, spans)?;

    let mut by_line: BTreeMap<String, Vec<ProductionReport>> = BTreeMap::new();
    for r in reports {
        let key = r.line_id.clone().unwrap_or_else(|| UNASSIGNED_LINE.to_string());
        by_line.entry(key).or_default().push(r.clone());
    }

    Ok(by_line
        .into_iter()
        .map(|(line, rs)| (line, stats_for_plan(&rs, as_of, &plan)))
        .collect())
}

pub fn compute_quality_trend(
    current: &AggregateWindow,
    previous: &AggregateWindow,
    metric: TrendMetric,
) -> Trend {
    let pick = |w: &AggregateWindow| match metric {
        TrendMetric::Produced => w.produced,
        TrendMetric::Net => w.net,
    };
    let (now, before) = (pick(current), pick(previous));

    let direction = match now.cmp(&before) {
        std::cmp::Ordering::Greater => TrendDirection::Up,
        std::cmp::Ordering::Less => TrendDirection::Down,
        std::cmp::Ordering::Equal => TrendDirection::Stable,
    };

    Trend {
        direction,
        magnitude: now.abs_diff(before),
    }
}

impl ProductionStats {
    /// Trend between the two most recent windows of a series, if it has two.
    pub fn trend(&self, granularity: Granularity, metric: TrendMetric) -> Option<Trend> {
        match self.series(granularity) {
            [.., previous, current] => Some(compute_quality_trend(current, previous, metric)),
            _ => None,
        }
    }
}
