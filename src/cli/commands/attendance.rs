use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::attendance::AttendanceLogic;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::colors::{RESET, color_for_status};
use crate::utils::date::resolve_period;
use crate::utils::fmt_hours;
use crate::utils::formatting::{bold, fmt_punch};
use crate::utils::table::{Column, Table};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Attendance { period, worker } = &cli.command {
        let (from, to) = resolve_period(period.as_deref())?;

        let caller = super::caller(cli, cfg)?;
        let worker_id = super::worker_or_caller(worker, &caller);
        let gate = cfg.capability_table();

        let pool = super::open(cfg)?;
        let sheet = AttendanceLogic::list(&pool, &gate, &caller, &worker_id, from, to)?;

        if cli.json {
            return super::print_json(&sheet);
        }

        if sheet.records.is_empty() {
            info(format!("No attendance for {} between {} and {}.", worker_id, from, to));
            return Ok(());
        }

        header(format!("Attendance of {} ({} → {})", worker_id, from, to));

        let mut table = Table::new(vec![
            Column::new("DATE", 10),
            Column::new("ENTRY", 5),
            Column::new("BRK OUT", 5),
            Column::new("BRK IN", 5),
            Column::new("EXIT", 5),
            Column::new("HOURS", 6),
            Column::new("STATUS", 13),
        ]);
        for r in &sheet.records {
            table.add_row(vec![
                r.date.to_string(),
                fmt_punch(r.punches.entry),
                fmt_punch(r.punches.break_out),
                fmt_punch(r.punches.break_in),
                fmt_punch(r.punches.exit),
                fmt_hours(r.worked_hours),
                r.status.to_db_str().to_string(),
            ]);
        }

        // Color after layout so escape codes do not skew the widths.
        for (line, r) in table.render().lines().zip(
            [None, None]
                .into_iter()
                .chain(sheet.records.iter().map(Some)),
        ) {
            match r {
                Some(r) => println!("{}{}{}", color_for_status(r.status), line, RESET),
                None => println!("{line}"),
            }
        }

        println!("\n{} {:.2}h", bold("Total worked:"), sheet.total_hours);
    }

    Ok(())
}
