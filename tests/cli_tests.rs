mod common;

use common::{init_cli_db, lst, setup_test_db};
use predicates::str::contains;
use serde_json::Value;
use std::fs;

fn json(out: &[u8]) -> Value {
    serde_json::from_slice(out).expect("stdout is JSON")
}

#[test]
fn init_creates_the_database() {
    let (dir, db) = setup_test_db("init");

    lst(dir.path())
        .args(["--db", &db, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(std::path::Path::new(&db).exists());

    lst(dir.path())
        .args(["--db", &db, "db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"));
}

#[test]
fn punch_computes_worked_hours() {
    let (dir, db) = setup_test_db("punch");
    init_cli_db(dir.path(), &db);

    lst(dir.path())
        .args([
            "--db", &db, "--user", "sup", "--role", "supervisor", "punch", "2026-03-02",
            "--worker", "ana", "--entry", "08:00", "--break-out", "12:00", "--break-in", "12:30",
            "--exit", "17:00",
        ])
        .assert()
        .success()
        .stdout(contains("8.50h"));

    let out = lst(dir.path())
        .args([
            "--db", &db, "--user", "ana", "--role", "worker", "--json", "attendance", "2026-03",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let sheet = json(&out.stdout);
    assert_eq!(sheet["total_hours"], 8.5);
    assert_eq!(sheet["records"][0]["status"], "COMPLETE");
    assert_eq!(sheet["records"][0]["revision"], 1);
}

#[test]
fn malformed_punch_is_rejected() {
    let (dir, db) = setup_test_db("punch_bad");
    init_cli_db(dir.path(), &db);

    lst(dir.path())
        .args(["--db", &db, "--role", "admin", "punch", "2026-03-02", "--entry", "8h00"])
        .assert()
        .failure()
        .stderr(contains("Malformed time"));
}

#[test]
fn worker_cannot_punch_for_someone_else() {
    let (dir, db) = setup_test_db("punch_forbidden");
    init_cli_db(dir.path(), &db);

    lst(dir.path())
        .args([
            "--db", &db, "--user", "ana", "--role", "worker", "punch", "2026-03-02",
            "--worker", "luis", "--entry", "08:00",
        ])
        .assert()
        .failure()
        .stderr(contains("Operation not permitted"));
}

#[test]
fn report_and_stats() {
    let (dir, db) = setup_test_db("report");
    init_cli_db(dir.path(), &db);

    for (worker, produced, defective) in [("ana", "100", "10"), ("luis", "50", "5")] {
        lst(dir.path())
            .args([
                "--db", &db, "--role", "supervisor", "report", "2026-03-18", "--worker", worker,
                "--line", "L1", "--produced", produced, "--defective", defective,
            ])
            .assert()
            .success()
            .stdout(contains("net"));
    }

    let out = lst(dir.path())
        .args([
            "--db", &db, "--role", "management", "--json", "stats", "--by-line", "--as-of",
            "2026-03-18",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let per_line = json(&out.stdout);
    assert_eq!(per_line["L1"]["today"]["net"], 135);
    assert_eq!(per_line["L1"]["today"]["quality_pct"], 90.0);

    let out = lst(dir.path())
        .args([
            "--db", &db, "--user", "ana", "--role", "worker", "--json", "stats", "--as-of",
            "2026-03-18",
        ])
        .output()
        .unwrap();
    let stats = json(&out.stdout);
    assert_eq!(stats["daily"].as_array().map(Vec::len), Some(7));
    assert_eq!(stats["weekly"].as_array().map(Vec::len), Some(4));
    assert_eq!(stats["monthly"].as_array().map(Vec::len), Some(6));
    assert_eq!(stats["today"]["net"], 90);
}

#[test]
fn report_with_too_many_defects_fails() {
    let (dir, db) = setup_test_db("report_bad");
    init_cli_db(dir.path(), &db);

    lst(dir.path())
        .args([
            "--db", &db, "--role", "admin", "report", "2026-03-18", "--produced", "5",
            "--defective", "6",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid quantities"));

    lst(dir.path())
        .args(["--db", &db, "--role", "admin", "report", "2026-03-18", "--produced", "-5"])
        .assert()
        .failure()
        .stderr(contains("Invalid quantities"));
}

#[test]
fn flow_batch_lifecycle() {
    let (dir, db) = setup_test_db("flow");
    init_cli_db(dir.path(), &db);

    let rows = dir.path().join("rows.json");
    fs::write(
        &rows,
        r#"[
            {"date":"2026-03-18","line":"L1","reference":"T-1","units":10,"standard_time":1.5},
            {"date":"2026-03-18","line":"L1","ticket":"T-2","units":4}
        ]"#,
    )
    .unwrap();
    let rows = rows.to_string_lossy().to_string();

    let out = lst(dir.path())
        .args([
            "--db", &db, "--user", "carla", "--role", "department:cutting", "--json", "flow",
            "create", "--rows", &rows, "--to", "quality", "--to-user", "quinn", "--week", "12",
        ])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let batch = json(&out.stdout);
    assert_eq!(batch["state"], "PENDING");
    assert_eq!(batch["total_rows"], 2);
    let id = batch["id"].to_string();

    lst(dir.path())
        .args([
            "--db", &db, "--user", "quinn", "--role", "department:quality", "flow", "advance", &id,
            "--to", "processed",
        ])
        .assert()
        .failure()
        .stderr(contains("Invalid transition"));

    lst(dir.path())
        .args([
            "--db", &db, "--role", "management", "flow", "advance", &id, "--to", "reviewed",
        ])
        .assert()
        .failure()
        .stderr(contains("Operation not permitted"));

    lst(dir.path())
        .args([
            "--db", &db, "--user", "quinn", "--role", "department:quality", "flow", "advance", &id,
            "--to", "reviewed",
        ])
        .assert()
        .success()
        .stdout(contains("reviewed"));

    lst(dir.path())
        .args(["--db", &db, "--role", "management", "flow", "list", "--state", "reviewed"])
        .assert()
        .success()
        .stdout(contains("cutting"));

    lst(dir.path())
        .args(["--db", &db, "--role", "supervisor", "flow", "show", &id])
        .assert()
        .success()
        .stdout(contains("T-2"))
        .stdout(contains("quinn"));

    lst(dir.path())
        .args(["--db", &db, "--user", "ana", "--role", "worker", "flow", "list"])
        .assert()
        .failure()
        .stderr(contains("Operation not permitted"));
}

#[test]
fn empty_batch_file_is_rejected() {
    let (dir, db) = setup_test_db("flow_empty");
    init_cli_db(dir.path(), &db);

    let rows = dir.path().join("empty.json");
    fs::write(&rows, "[]").unwrap();

    lst(dir.path())
        .args([
            "--db", &db, "--role", "supervisor", "flow", "create", "--rows",
            &rows.to_string_lossy(), "--from", "cutting", "--to", "quality",
        ])
        .assert()
        .failure()
        .stderr(contains("at least one row"));
}

#[test]
fn audit_log_records_operations() {
    let (dir, db) = setup_test_db("log");
    init_cli_db(dir.path(), &db);

    lst(dir.path())
        .args([
            "--db", &db, "--role", "admin", "punch", "2026-03-02", "--worker", "ana", "--entry",
            "08:00", "--exit", "16:00",
        ])
        .assert()
        .success();

    lst(dir.path())
        .args(["--db", &db, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("punch"))
        .stdout(contains("ana@2026-03-02"));

    lst(dir.path())
        .args(["--db", &db, "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Attendance records"));
}

#[test]
fn unknown_role_is_rejected() {
    let (dir, db) = setup_test_db("role");
    init_cli_db(dir.path(), &db);

    lst(dir.path())
        .args(["--db", &db, "--role", "janitor", "attendance"])
        .assert()
        .failure()
        .stderr(contains("Invalid role"));
}
