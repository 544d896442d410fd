mod common;

use common::d;
use loomstat::core::calculator::aggregator::{
    UNASSIGNED_LINE, WindowPlan, compute_quality_trend, line_stats, production_stats, quality_pct,
    rollup,
};
use loomstat::errors::AppError;
use loomstat::models::production::ProductionReport;
use loomstat::models::window::{Granularity, StatsSpans, TrendDirection, TrendMetric};

fn report(worker: &str, date: &str, produced: u32, defective: u32) -> ProductionReport {
    ProductionReport::draft(worker, d(date), produced, defective)
}

#[test]
fn two_reports_in_one_day_sum_up() {
    let reports = vec![
        report("ana", "2026-03-18", 100, 10),
        report("luis", "2026-03-18", 50, 5),
    ];
    let plan = WindowPlan::anchored(d("2026-03-18"), &StatsSpans::default()).unwrap();
    let out = rollup(&reports, std::slice::from_ref(&plan.today)).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].produced, 150);
    assert_eq!(out[0].defective, 15);
    assert_eq!(out[0].net, 135);
    assert_eq!(out[0].quality_pct, 90.0);
    assert_eq!(out[0].report_count, 2);
}

#[test]
fn worker_without_reports_gets_zero_filled_windows() {
    let stats = production_stats(&[], d("2026-03-18"), &StatsSpans::default()).unwrap();

    assert_eq!(stats.daily.len(), 7);
    assert_eq!(stats.weekly.len(), 4);
    assert_eq!(stats.monthly.len(), 6);
    for w in stats
        .daily
        .iter()
        .chain(&stats.weekly)
        .chain(&stats.monthly)
        .chain(std::iter::once(&stats.today))
    {
        assert_eq!((w.produced, w.defective, w.net, w.report_count), (0, 0, 0, 0));
        assert_eq!(w.quality_pct, 0.0);
    }
}

#[test]
fn windows_are_ordered_oldest_first() {
    let stats = production_stats(&[], d("2026-03-18"), &StatsSpans::default()).unwrap();

    let daily: Vec<_> = stats.daily.iter().map(|w| w.label.as_str()).collect();
    assert_eq!(
        daily,
        [
            "2026-03-12",
            "2026-03-13",
            "2026-03-14",
            "2026-03-15",
            "2026-03-16",
            "2026-03-17",
            "2026-03-18"
        ]
    );

    let weekly: Vec<_> = stats.weekly.iter().map(|w| w.label.as_str()).collect();
    assert_eq!(weekly, ["2026-W09", "2026-W10", "2026-W11", "2026-W12"]);
    assert_eq!(stats.weekly[3].start, d("2026-03-16"));
    assert_eq!(stats.weekly[3].end, d("2026-03-18"));
    assert_eq!(stats.weekly[2].end, d("2026-03-15"));

    let monthly: Vec<_> = stats.monthly.iter().map(|w| w.label.as_str()).collect();
    assert_eq!(
        monthly,
        ["2025-10", "2025-11", "2025-12", "2026-01", "2026-02", "2026-03"]
    );
    assert_eq!(stats.monthly[4].end, d("2026-02-28"));
    assert_eq!(stats.monthly[5].end, d("2026-03-18"));
}

#[test]
fn reports_land_in_every_window_that_contains_them() {
    let reports = vec![
        report("ana", "2026-03-18", 40, 4),
        report("ana", "2026-03-10", 30, 0),
        report("ana", "2026-01-05", 20, 2),
        report("ana", "2025-01-05", 999, 0),
    ];
    let stats = production_stats(&reports, d("2026-03-18"), &StatsSpans::default()).unwrap();

    assert_eq!(stats.today.net, 36);
    assert_eq!(stats.daily.last().map(|w| w.net), Some(36));
    assert_eq!(stats.weekly[3].produced, 40);
    assert_eq!(stats.weekly[2].produced, 30);
    assert_eq!(stats.monthly[5].produced, 70);
    assert_eq!(stats.monthly[3].produced, 20);

    let total: u64 = stats.monthly.iter().map(|w| w.produced).sum();
    assert_eq!(total, 90, "the 2025-01 report is outside every window");
}

#[test]
fn reports_after_as_of_are_left_out_of_current_week_and_month() {
    let reports = vec![
        report("ana", "2026-03-10", 100, 0),
        report("ana", "2026-03-12", 30, 0),
        report("ana", "2026-03-25", 50, 0),
    ];
    let stats = production_stats(&reports, d("2026-03-10"), &StatsSpans::default()).unwrap();

    assert_eq!(stats.today.produced, 100);
    assert_eq!(stats.weekly.last().map(|w| w.produced), Some(100));
    assert_eq!(stats.weekly.last().map(|w| w.end), Some(d("2026-03-10")));
    assert_eq!(stats.monthly.last().map(|w| w.produced), Some(100));
    assert_eq!(stats.monthly.last().map(|w| w.end), Some(d("2026-03-10")));

    let later = production_stats(&reports[..1], d("2026-03-10"), &StatsSpans::default()).unwrap();
    assert_eq!(later, stats);
}

#[test]
fn net_equals_produced_minus_defective_in_every_window() {
    let reports: Vec<_> = (1..=28)
        .map(|day| {
            let produced = (day * 13 % 50) as u32;
            report("ana", &format!("2026-02-{day:02}"), produced, produced / 7)
        })
        .collect();
    let stats = production_stats(&reports, d("2026-03-01"), &StatsSpans::default()).unwrap();

    for w in stats.daily.iter().chain(&stats.weekly).chain(&stats.monthly) {
        assert_eq!(w.net, w.produced - w.defective, "{}", w.label);
        assert!((0.0..=100.0).contains(&w.quality_pct), "{}", w.label);
        if w.produced == 0 {
            assert_eq!(w.quality_pct, 0.0);
        }
    }
}

#[test]
fn defective_above_produced_is_an_invariant_violation() {
    let reports = vec![report("ana", "2026-03-18", 5, 6)];
    let err = production_stats(&reports, d("2026-03-18"), &StatsSpans::default()).unwrap_err();
    assert!(matches!(err, AppError::InvariantViolation(_)));
}

#[test]
fn quality_is_rounded_and_bounded() {
    assert_eq!(quality_pct(0, 0), 0.0);
    assert_eq!(quality_pct(3, 2), 66.67);
    assert_eq!(quality_pct(7, 7), 100.0);
    assert_eq!(quality_pct(7, 0), 0.0);
}

#[test]
fn spans_are_configurable() {
    let spans = StatsSpans {
        daily_days: 3,
        weekly_weeks: 2,
        monthly_months: 1,
    };
    let stats = production_stats(&[], d("2026-03-18"), &spans).unwrap();
    assert_eq!(
        (stats.daily.len(), stats.weekly.len(), stats.monthly.len()),
        (3, 2, 1)
    );

    let plan = WindowPlan::anchored(d("2026-03-18"), &spans).unwrap();
    assert_eq!(plan.span(), (d("2026-03-01"), d("2026-03-18")));
}

#[test]
fn trend_compares_the_last_two_windows() {
    let reports = vec![
        report("ana", "2026-03-17", 50, 0),
        report("ana", "2026-03-18", 80, 10),
    ];
    let stats = production_stats(&reports, d("2026-03-18"), &StatsSpans::default()).unwrap();

    let up = stats.trend(Granularity::Day, TrendMetric::Net).unwrap();
    assert_eq!(up.direction, TrendDirection::Up);
    assert_eq!(up.magnitude, 20);

    let produced = compute_quality_trend(&stats.daily[6], &stats.daily[5], TrendMetric::Produced);
    assert_eq!(produced.direction, TrendDirection::Up);
    assert_eq!(produced.magnitude, 30);

    let flat = compute_quality_trend(&stats.daily[0], &stats.daily[1], TrendMetric::Net);
    assert_eq!(flat.direction, TrendDirection::Stable);

    let single = StatsSpans {
        monthly_months: 1,
        ..StatsSpans::default()
    };
    let stats = production_stats(&reports, d("2026-03-18"), &single).unwrap();
    assert!(stats.trend(Granularity::Month, TrendMetric::Net).is_none());
}

#[test]
fn line_stats_group_by_line_with_unassigned_bucket() {
    let reports = vec![
        report("ana", "2026-03-18", 100, 10).with_line("L1"),
        report("luis", "2026-03-18", 50, 5).with_line("L1"),
        report("eva", "2026-03-18", 20, 0).with_line("L2"),
        report("sam", "2026-03-18", 10, 1),
    ];
    let per_line = line_stats(&reports, d("2026-03-18"), &StatsSpans::default()).unwrap();

    let keys: Vec<_> = per_line.keys().map(String::as_str).collect();
    assert_eq!(keys, ["L1", "L2", UNASSIGNED_LINE]);
    assert_eq!(per_line["L1"].today.net, 135);
    assert_eq!(per_line["L1"].today.quality_pct, 90.0);
    assert_eq!(per_line["L2"].today.quality_pct, 100.0);
    assert_eq!(per_line[UNASSIGNED_LINE].today.produced, 10);
}
