use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::production::{ProductionLogic, validate_quantities};
use crate::errors::AppResult;
use crate::models::production::ProductionReport;
use crate::ui::messages::success;
use crate::utils::date::parse_date;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Report {
        date,
        worker,
        line,
        produced,
        defective,
        notes,
        incidents,
        revision,
    } = &cli.command
    {
        let date = parse_date(date)?;
        let (produced, defective) = validate_quantities(*produced, *defective)?;

        let caller = super::caller(cli, cfg)?;
        let worker_id = super::worker_or_caller(worker, &caller);
        let gate = cfg.capability_table();

        let mut report = ProductionReport::draft(worker_id, date, produced, defective);
        report.line_id = line.clone();
        report.notes = notes.clone();
        report.incidents = incidents.clone();

        let mut pool = super::open(cfg)?;
        let saved = ProductionLogic::submit(&mut pool, &gate, &caller, &report, *revision)?;

        if cli.json {
            return super::print_json(&saved);
        }

        success(format!(
            "Report for {} on {}: {} produced, {} defective, {} net (revision {})",
            saved.worker_id,
            saved.date,
            saved.produced_qty,
            saved.defective_qty,
            saved.net_qty(),
            saved.revision
        ));
    }

    Ok(())
}
