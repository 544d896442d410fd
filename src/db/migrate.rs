use rusqlite::{Connection, OptionalExtension, Result};
use tracing::info;

/// Ensure that the `log` table exists. Migration markers live in it.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    info!(version, "migration applied");
    Ok(())
}

/// Check if a table exists.
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn create_core_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            worker_id    TEXT NOT NULL,
            date         TEXT NOT NULL,
            entry_time   TEXT,
            break_out    TEXT,
            break_in     TEXT,
            exit_time    TEXT,
            worked_hours REAL CHECK(worked_hours IS NULL OR worked_hours >= 0),
            status       TEXT NOT NULL CHECK(status IN ('complete','incomplete','partial_break')),
            revision     INTEGER NOT NULL DEFAULT 1,
            updated_at   TEXT NOT NULL,
            PRIMARY KEY (worker_id, date)
        );

        CREATE TABLE IF NOT EXISTS production_reports (
            worker_id     TEXT NOT NULL,
            date          TEXT NOT NULL,
            line_id       TEXT,
            produced_qty  INTEGER NOT NULL CHECK(produced_qty >= 0),
            defective_qty INTEGER NOT NULL CHECK(defective_qty >= 0),
            notes         TEXT,
            incidents     TEXT,
            revision      INTEGER NOT NULL DEFAULT 1,
            updated_at    TEXT NOT NULL,
            PRIMARY KEY (worker_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_production_date ON production_reports(date);
        CREATE INDEX IF NOT EXISTS idx_production_line ON production_reports(line_id, date);

        CREATE TABLE IF NOT EXISTS flow_batches (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id     TEXT NOT NULL,
            sender_dept   TEXT NOT NULL,
            receiver_id   TEXT,
            receiver_dept TEXT NOT NULL,
            filter_json   TEXT NOT NULL DEFAULT '{}',
            total_rows    INTEGER NOT NULL CHECK(total_rows > 0),
            state         TEXT NOT NULL DEFAULT 'pending'
                          CHECK(state IN ('pending','reviewed','processed')),
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_flow_batches_state ON flow_batches(state, created_at);

        CREATE TABLE IF NOT EXISTS flow_rows (
            batch_id      INTEGER NOT NULL REFERENCES flow_batches(id),
            position      INTEGER NOT NULL,
            date          TEXT NOT NULL,
            line          TEXT NOT NULL,
            reference     TEXT NOT NULL,
            units         INTEGER NOT NULL CHECK(units > 0),
            standard_time REAL NOT NULL DEFAULT 0,
            status        TEXT NOT NULL DEFAULT '',
            observation   TEXT NOT NULL DEFAULT '',
            bajada        TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (batch_id, position)
        );
        "#,
    )?;
    Ok(())
}

fn create_transition_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS flow_transitions (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id   INTEGER NOT NULL REFERENCES flow_batches(id),
            from_state TEXT NOT NULL,
            to_state   TEXT NOT NULL,
            actor_id   TEXT NOT NULL,
            actor_role TEXT NOT NULL,
            at         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_flow_transitions_batch ON flow_transitions(batch_id);
        "#,
    )?;
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    ensure_log_table(conn)?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    let steps: [(&str, &str, fn(&Connection) -> Result<()>); 2] = [
        (
            "20260301_0001_core_tables",
            "Created attendance, production and flow tables",
            create_core_tables,
        ),
        (
            "20260315_0002_flow_transitions",
            "Created flow transition audit table",
            create_transition_table,
        ),
    ];

    for (version, message, apply) in steps {
        if migration_applied(conn, version)? {
            continue;
        }
        apply(conn)?;
        mark_applied(conn, version, message)?;
    }

    Ok(())
}
