use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::attendance::AttendanceLogic;
use crate::errors::AppResult;
use crate::models::attendance::{AttendanceStatus, Punches};
use crate::ui::messages::{success, warning};
use crate::utils::date::parse_date;
use crate::utils::fmt_hours;
use crate::utils::time::parse_optional_time;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Punch {
        date,
        worker,
        entry,
        break_out,
        break_in,
        exit,
        revision,
    } = &cli.command
    {
        // Validate every input before touching the database.
        let date = parse_date(date)?;
        let punches = Punches {
            entry: parse_optional_time(entry.as_deref())?,
            break_out: parse_optional_time(break_out.as_deref())?,
            break_in: parse_optional_time(break_in.as_deref())?,
            exit: parse_optional_time(exit.as_deref())?,
        };

        let caller = super::caller(cli, cfg)?;
        let worker_id = super::worker_or_caller(worker, &caller);
        let gate = cfg.capability_table();

        let mut pool = super::open(cfg)?;
        let record = AttendanceLogic::record(
            &mut pool,
            &gate,
            &caller,
            &worker_id,
            date,
            &punches,
            *revision,
        )?;

        if cli.json {
            return super::print_json(&record);
        }

        match record.status {
            AttendanceStatus::Complete => success(format!(
                "{} on {}: {} worked (revision {})",
                record.worker_id,
                record.date,
                fmt_hours(record.worked_hours),
                record.revision
            )),
            AttendanceStatus::PartialBreak => warning(format!(
                "{} on {}: {} worked, break ignored (one break punch missing or out of order)",
                record.worker_id,
                record.date,
                fmt_hours(record.worked_hours)
            )),
            AttendanceStatus::Incomplete => warning(format!(
                "{} on {}: punches saved, hours pending until entry and exit are both set",
                record.worker_id, record.date
            )),
        }
    }

    Ok(())
}
