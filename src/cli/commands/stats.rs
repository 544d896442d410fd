use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::production::ProductionLogic;
use crate::errors::AppResult;
use crate::models::window::{AggregateWindow, Granularity, ProductionStats, TrendDirection, TrendMetric};
use crate::ui::messages::header;
use crate::utils::colors::{RESET, color_for_trend};
use crate::utils::date::{parse_optional_date, today};
use crate::utils::fmt_pct;
use crate::utils::formatting::bold;
use crate::utils::table::{Column, Table};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Stats {
        worker,
        as_of,
        by_line,
    } = &cli.command
    {
        let as_of = parse_optional_date(as_of.as_deref())?.unwrap_or_else(today);

        let caller = super::caller(cli, cfg)?;
        let gate = cfg.capability_table();
        let pool = super::open(cfg)?;

        if *by_line {
            let per_line = ProductionLogic::line_stats(&pool, &gate, &caller, as_of, &cfg.stats)?;
            if cli.json {
                return super::print_json(&per_line);
            }
            if per_line.is_empty() {
                println!("No production reports up to {}.", as_of);
            }
            for (line, stats) in &per_line {
                print_stats(&format!("Line {line}"), stats);
            }
            return Ok(());
        }

        let worker_id = super::worker_or_caller(worker, &caller);
        let stats = ProductionLogic::stats(&pool, &gate, &caller, &worker_id, as_of, &cfg.stats)?;

        if cli.json {
            return super::print_json(&stats);
        }
        print_stats(&format!("Production of {worker_id}"), &stats);
    }

    Ok(())
}

fn print_stats(title: &str, stats: &ProductionStats) {
    header(format!("{} as of {}", title, stats.as_of));
    println!(
        "{} {} produced, {} defective, {} net, quality {}\n",
        bold("Today:"),
        stats.today.produced,
        stats.today.defective,
        stats.today.net,
        fmt_pct(stats.today.quality_pct)
    );

    for (name, granularity) in [
        ("Daily", Granularity::Day),
        ("Weekly", Granularity::Week),
        ("Monthly", Granularity::Month),
    ] {
        println!("{}", bold(name));
        print!("{}", window_table(stats.series(granularity)).render());

        if let Some(trend) = stats.trend(granularity, TrendMetric::Net) {
            let arrow = match trend.direction {
                TrendDirection::Up => "▲",
                TrendDirection::Down => "▼",
                TrendDirection::Stable => "=",
            };
            println!(
                "trend (net): {}{} {}{}",
                color_for_trend(trend.direction),
                arrow,
                trend.magnitude,
                RESET
            );
        }
        println!();
    }
}

fn window_table(windows: &[AggregateWindow]) -> Table {
    let mut table = Table::new(vec![
        Column::new("WINDOW", 10),
        Column::new("FROM", 10),
        Column::new("TO", 10),
        Column::new("PRODUCED", 8),
        Column::new("DEFECTIVE", 9),
        Column::new("NET", 6),
        Column::new("QUALITY", 7),
    ]);
    for w in windows {
        table.add_row(vec![
            w.label.clone(),
            w.start.to_string(),
            w.end.to_string(),
            w.produced.to_string(),
            w.defective.to_string(),
            w.net.to_string(),
            fmt_pct(w.quality_pct),
        ]);
    }
    table
}
