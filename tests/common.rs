#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{NaiveDate, NaiveDateTime};
use loomstat::core::access::CapabilityTable;
use loomstat::db::initialize::init_db;
use loomstat::db::pool::DbPool;
use loomstat::models::role::{Department, Principal, Role};
use loomstat::utils::time::{TimeOfDay, parse_time_of_day};
use std::path::Path;
use tempfile::TempDir;

/// Binary under test with HOME pointed at `home`, so no real config leaks in.
pub fn lst(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("loomstat");
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

/// Fresh temp dir holding the database path for one test.
pub fn setup_test_db(name: &str) -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir
        .path()
        .join(format!("{name}_loomstat.sqlite"))
        .to_string_lossy()
        .to_string();
    (dir, db)
}

/// `init` the database through the CLI, in test mode.
pub fn init_cli_db(home: &Path, db: &str) {
    lst(home)
        .args(["--db", db, "--test", "init"])
        .assert()
        .success();
}

pub fn memory_pool() -> DbPool {
    let pool = DbPool::in_memory().expect("in-memory db");
    init_db(&pool.conn).expect("schema");
    pool
}

pub fn gate() -> CapabilityTable {
    CapabilityTable::default()
}

pub fn t(s: &str) -> TimeOfDay {
    parse_time_of_day(s).expect("valid time")
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid stamp")
}

pub fn admin() -> Principal {
    Principal::new("root", Role::Admin)
}

pub fn supervisor() -> Principal {
    Principal::new("sup", Role::Supervisor)
}

pub fn management() -> Principal {
    Principal::new("boss", Role::Management)
}

pub fn worker(id: &str) -> Principal {
    Principal::new(id, Role::Worker)
}

pub fn dept(id: &str, d: Department) -> Principal {
    Principal::new(id, Role::Department(d))
}
