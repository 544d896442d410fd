use clap::{Parser, Subcommand};

/// Command-line interface definition for loomstat
/// Attendance, production and outbound-flow telemetry on SQLite
#[derive(Parser)]
#[command(
    name = "loomstat",
    version = env!("CARGO_PKG_VERSION"),
    about = "Plant telemetry CLI: attendance punches, production reports and outbound-flow batches on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Caller identity (defaults to $USER)
    #[arg(global = true, long = "user")]
    pub user: Option<String>,

    /// Caller role: admin, management, supervisor, worker, department:<code>
    #[arg(global = true, long = "role")]
    pub role: Option<String>,

    /// Print results as JSON instead of tables
    #[arg(global = true, long = "json")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,
    },

    /// Manage the database (integrity checks, info, vacuum)
    Db {
        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "limit", default_value_t = 20, help = "Number of rows to show")]
        limit: usize,
    },

    /// Record the punches of one worker for one day (upsert)
    Punch {
        /// Date of the punches (YYYY-MM-DD)
        date: String,

        #[arg(long = "worker", help = "Worker id (defaults to the caller)")]
        worker: Option<String>,

        #[arg(long = "entry", help = "Entry time (HH:MM[:SS])")]
        entry: Option<String>,

        #[arg(long = "break-out", help = "Break start (HH:MM[:SS])")]
        break_out: Option<String>,

        #[arg(long = "break-in", help = "Break end (HH:MM[:SS])")]
        break_in: Option<String>,

        #[arg(long = "exit", help = "Exit time (HH:MM[:SS])")]
        exit: Option<String>,

        #[arg(
            long = "revision",
            help = "Fail unless the stored revision matches (0 = must not exist)"
        )]
        revision: Option<i64>,
    },

    /// List attendance records and total worked hours
    Attendance {
        /// Period: YYYY, YYYY-MM, YYYY-MM-DD or start:end (default: current month)
        period: Option<String>,

        #[arg(long = "worker", help = "Worker id (defaults to the caller)")]
        worker: Option<String>,
    },

    /// Submit or amend a daily production report (upsert)
    Report {
        /// Date of the report (YYYY-MM-DD)
        date: String,

        #[arg(long = "worker", help = "Worker id (defaults to the caller)")]
        worker: Option<String>,

        #[arg(long = "line", help = "Production line id")]
        line: Option<String>,

        #[arg(long = "produced", allow_negative_numbers = true, help = "Units produced")]
        produced: i64,

        #[arg(
            long = "defective",
            default_value_t = 0,
            allow_negative_numbers = true,
            help = "Defective units"
        )]
        defective: i64,

        #[arg(long = "notes")]
        notes: Option<String>,

        #[arg(long = "incidents")]
        incidents: Option<String>,

        #[arg(
            long = "revision",
            help = "Fail unless the stored revision matches (0 = must not exist)"
        )]
        revision: Option<i64>,
    },

    /// Production rollups (today, daily, weekly, monthly)
    Stats {
        #[arg(long = "worker", help = "Worker id (defaults to the caller)")]
        worker: Option<String>,

        #[arg(long = "as-of", help = "Anchor date (YYYY-MM-DD, default: today)")]
        as_of: Option<String>,

        #[arg(long = "by-line", help = "Group every worker's reports by production line")]
        by_line: bool,
    },

    /// Outbound-flow batches between departments
    Flow {
        #[command(subcommand)]
        action: FlowCommand,
    },
}

#[derive(Subcommand)]
pub enum FlowCommand {
    /// Create a batch from a JSON file of rows
    Create {
        #[arg(long = "rows", help = "JSON file holding an array of rows")]
        rows: String,

        #[arg(long = "from", help = "Sender department (defaults to the caller's)")]
        from: Option<String>,

        #[arg(long = "to", help = "Receiver department")]
        to: String,

        #[arg(long = "to-user", help = "Receiver user id (defaults to the department code)")]
        to_user: Option<String>,

        #[arg(long = "line", help = "Filter: production line")]
        line: Option<String>,

        #[arg(long = "year", help = "Filter: year")]
        year: Option<i32>,

        #[arg(long = "month", help = "Filter: month")]
        month: Option<u32>,

        #[arg(long = "week", help = "Filter: ISO week")]
        week: Option<u32>,

        #[arg(long = "day", help = "Filter: day of month")]
        day: Option<u32>,
    },

    /// Move a batch to its next state
    Advance {
        /// Batch id
        id: i64,

        #[arg(long = "to", help = "Target state: reviewed or processed")]
        to: String,
    },

    /// List the batches visible to the caller
    List {
        #[arg(long = "state", help = "pending, reviewed or processed")]
        state: Option<String>,

        #[arg(long = "from", help = "Created on or after (YYYY-MM-DD)")]
        from: Option<String>,

        #[arg(long = "to", help = "Created on or before (YYYY-MM-DD)")]
        to: Option<String>,

        #[arg(long = "sender", help = "Sender department")]
        sender: Option<String>,

        #[arg(long = "receiver", help = "Receiver department")]
        receiver: Option<String>,
    },

    /// Show one batch with its rows and history
    Show {
        /// Batch id
        id: i64,
    },
}
