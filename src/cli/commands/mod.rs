pub mod attendance;
pub mod config;
pub mod db;
pub mod flow;
pub mod init;
pub mod log;
pub mod punch;
pub mod report;
pub mod stats;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::open_ready;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::role::{Principal, Role};
use serde::Serialize;

/// Resolve who is running the command from `--user`/`--role`, the
/// environment and the configured default role.
pub(crate) fn caller(cli: &Cli, cfg: &Config) -> AppResult<Principal> {
    let user = cli
        .user
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .or_else(|| std::env::var("USERNAME").ok())
        .unwrap_or_else(|| "local".to_string());

    let role = match &cli.role {
        Some(r) => r.parse::<Role>()?,
        None => cfg.fallback_role()?,
    };

    Ok(Principal::new(user, role))
}

/// Target worker: explicit `--worker`, else the caller.
pub(crate) fn worker_or_caller(worker: &Option<String>, caller: &Principal) -> String {
    worker.clone().unwrap_or_else(|| caller.user_id.clone())
}

pub(crate) fn open(cfg: &Config) -> AppResult<DbPool> {
    open_ready(&cfg.database)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
