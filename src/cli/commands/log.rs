use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::db::log::load_log;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::table::{Column, Table};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print: true, limit } = &cli.command {
        let pool = super::open(cfg)?;
        let entries = load_log(&pool.conn, *limit)?;

        if cli.json {
            return super::print_json(&entries);
        }
        if entries.is_empty() {
            info("The internal log is empty.");
            return Ok(());
        }

        header("Internal log");
        let mut table = Table::new(vec![
            Column::new("DATE", 25),
            Column::new("OPERATION", 12),
            Column::new("TARGET", 16),
            Column::new("MESSAGE", 0),
        ]);
        for e in entries {
            table.add_row(vec![e.date, e.operation, e.target, e.message]);
        }
        print!("{}", table.render());
    }

    Ok(())
}
