//! loomstat library root.
//! Exposes the CLI parser, the high-level run() function and the engines
//! for attendance, production rollups and outbound-flow batches.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(cli, cfg),
        Commands::Punch { .. } => cli::commands::punch::handle(cli, cfg),
        Commands::Attendance { .. } => cli::commands::attendance::handle(cli, cfg),
        Commands::Report { .. } => cli::commands::report::handle(cli, cfg),
        Commands::Stats { .. } => cli::commands::stats::handle(cli, cfg),
        Commands::Flow { .. } => cli::commands::flow::handle(cli, cfg),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` wins over the configured level.
fn init_tracing(cfg: &Config) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cfg.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    // 1️⃣ parse CLI
    let cli = Cli::parse();

    // 2️⃣ load config once
    let mut cfg = Config::load()?;

    // 3️⃣ command-line override of the database
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    init_tracing(&cfg);

    // 4️⃣ hand everything to the dispatcher
    dispatch(&cli, &cfg)
}
