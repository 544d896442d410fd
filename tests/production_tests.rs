mod common;

use common::{admin, d, dept, management, memory_pool, supervisor, worker};
use loomstat::core::access::CapabilityTable;
use loomstat::core::production::{ProductionLogic, validate_quantities};
use loomstat::db::queries::load_reports_between;
use loomstat::errors::AppError;
use loomstat::models::production::ProductionReport;
use loomstat::models::role::Department;
use loomstat::models::window::StatsSpans;

#[test]
fn quantities_are_validated_before_anything_else() {
    assert_eq!(validate_quantities(100, 10).unwrap(), (100, 10));
    assert_eq!(validate_quantities(0, 0).unwrap(), (0, 0));

    for (p, q) in [(10, 11), (-1, 0), (5, -2), (i64::MAX, 0)] {
        let err = validate_quantities(p, q).unwrap_err();
        assert!(matches!(err, AppError::InvalidQuantities(_)), "({p}, {q})");
    }
}

#[test]
fn submit_upserts_per_worker_and_day() {
    let mut pool = memory_pool();
    let gate = CapabilityTable::default();
    let ana = worker("ana");

    let first = ProductionReport::draft("ana", d("2026-03-18"), 100, 10).with_line("L1");
    let saved = ProductionLogic::submit(&mut pool, &gate, &ana, &first, None).unwrap();
    assert_eq!(saved.revision, 1);
    assert_eq!(saved.line_id.as_deref(), Some("L1"));

    let amended = ProductionReport {
        notes: Some("needle change".into()),
        ..ProductionReport::draft("ana", d("2026-03-18"), 120, 12)
    };
    let saved = ProductionLogic::submit(&mut pool, &gate, &ana, &amended, Some(1)).unwrap();
    assert_eq!(saved.revision, 2);
    assert_eq!(saved.produced_qty, 120);
    assert_eq!(saved.line_id, None);
    assert_eq!(saved.notes.as_deref(), Some("needle change"));

    let all = load_reports_between(&pool.conn, &d("2026-03-01"), &d("2026-03-31")).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn inconsistent_report_is_rejected() {
    let mut pool = memory_pool();
    let gate = CapabilityTable::default();
    let bad = ProductionReport::draft("ana", d("2026-03-18"), 5, 6);

    let err = ProductionLogic::submit(&mut pool, &gate, &admin(), &bad, None).unwrap_err();
    assert!(matches!(err, AppError::InvalidQuantities(_)));
}

#[test]
fn stale_report_revision_is_rejected() {
    let mut pool = memory_pool();
    let gate = CapabilityTable::default();
    let r = ProductionReport::draft("ana", d("2026-03-18"), 10, 0);

    ProductionLogic::submit(&mut pool, &gate, &supervisor(), &r, Some(0)).unwrap();
    let err = ProductionLogic::submit(&mut pool, &gate, &supervisor(), &r, Some(0)).unwrap_err();
    assert!(matches!(err, AppError::StaleRevision { expected: 0, actual: 1 }));
}

#[test]
fn read_only_roles_cannot_submit() {
    let mut pool = memory_pool();
    let gate = CapabilityTable::default();
    let r = ProductionReport::draft("ana", d("2026-03-18"), 10, 0);

    for who in [management(), dept("carla", Department::Cutting), worker("luis")] {
        let err = ProductionLogic::submit(&mut pool, &gate, &who, &r, None).unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}

#[test]
fn stats_come_from_stored_reports() {
    let mut pool = memory_pool();
    let gate = CapabilityTable::default();

    for (worker_id, date, p, q) in [
        ("ana", "2026-03-18", 100, 10),
        ("ana", "2026-03-17", 50, 5),
        ("luis", "2026-03-18", 70, 0),
    ] {
        let r = ProductionReport::draft(worker_id, d(date), p, q);
        ProductionLogic::submit(&mut pool, &gate, &supervisor(), &r, None).unwrap();
    }

    let stats = ProductionLogic::stats(
        &pool,
        &gate,
        &worker("ana"),
        "ana",
        d("2026-03-18"),
        &StatsSpans::default(),
    )
    .unwrap();
    assert_eq!(stats.today.net, 90);
    assert_eq!(stats.weekly[3].net, 135);
    assert_eq!(stats.weekly[3].quality_pct, 90.0);
    assert_eq!(stats.daily.len(), 7);

    let err = ProductionLogic::stats(
        &pool,
        &gate,
        &worker("ana"),
        "luis",
        d("2026-03-18"),
        &StatsSpans::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn line_stats_need_plant_wide_read() {
    let mut pool = memory_pool();
    let gate = CapabilityTable::default();
    let r = ProductionReport::draft("ana", d("2026-03-18"), 10, 1).with_line("L1");
    ProductionLogic::submit(&mut pool, &gate, &supervisor(), &r, None).unwrap();

    let per_line =
        ProductionLogic::line_stats(&pool, &gate, &management(), d("2026-03-18"), &StatsSpans::default())
            .unwrap();
    assert_eq!(per_line["L1"].today.net, 9);

    let err = ProductionLogic::line_stats(&pool, &gate, &worker("ana"), d("2026-03-18"), &StatsSpans::default())
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}
