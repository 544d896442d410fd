use crate::db::migrate::table_exists;
use crate::db::pool::DbPool;
use crate::models::flow::FlowState;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::{Connection, OptionalExtension};
use std::fs;

fn count(conn: &Connection, table: &str) -> rusqlite::Result<i64> {
    if !table_exists(conn, table)? {
        return Ok(0);
    }
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
}

fn date_bound(conn: &Connection, table: &str, order: &str) -> rusqlite::Result<Option<String>> {
    if !table_exists(conn, table)? {
        return Ok(None);
    }
    conn.query_row(
        &format!("SELECT date FROM {table} ORDER BY date {order} LIMIT 1"),
        [],
        |row| row.get(0),
    )
    .optional()
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    let conn = &pool.conn;
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    for (label, table) in [
        ("Attendance records", "attendance"),
        ("Production reports", "production_reports"),
        ("Flow batches", "flow_batches"),
    ] {
        println!(
            "{}• {}:{} {}{}{}",
            CYAN,
            label,
            RESET,
            GREEN,
            count(conn, table)?,
            RESET
        );
    }

    //
    // 3) BATCHES PER STATE
    //
    if table_exists(conn, "flow_batches")? {
        for state in [FlowState::Pending, FlowState::Reviewed, FlowState::Processed] {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM flow_batches WHERE state = ?1",
                [state.to_db_str()],
                |row| row.get(0),
            )?;
            println!("    {:<10} {}", state.to_db_str(), n);
        }
    }

    //
    // 4) PRODUCTION DATE RANGE
    //
    let first = date_bound(conn, "production_reports", "ASC")?;
    let last = date_bound(conn, "production_reports", "DESC")?;
    let none = format!("{GREY}--{RESET}");

    println!("{}• Production date range:{}", CYAN, RESET);
    println!("    from: {}", first.unwrap_or_else(|| none.clone()));
    println!("    to:   {}", last.unwrap_or(none));

    println!();
    Ok(())
}
