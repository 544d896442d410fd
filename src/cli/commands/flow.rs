use crate::cli::parser::{Cli, Commands, FlowCommand};
use crate::config::Config;
use crate::core::flow::{BatchDetail, FlowLogic};
use crate::errors::{AppError, AppResult};
use crate::models::flow::{BatchQuery, FlowFilter, FlowRowDraft, FlowState, OutboundFlowBatch, Party};
use crate::models::role::{Department, Principal};
use crate::ui::messages::{header, info, success};
use crate::utils::colors::{RESET, color_for_state, colorize_optional};
use crate::utils::date::parse_optional_date;
use crate::utils::formatting::bold;
use crate::utils::table::{Column, Table};
use chrono::Local;
use std::fs;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Flow { action } = &cli.command else {
        return Ok(());
    };

    let caller = super::caller(cli, cfg)?;
    let gate = cfg.capability_table();

    match action {
        FlowCommand::Create {
            rows,
            from,
            to,
            to_user,
            line,
            year,
            month,
            week,
            day,
        } => {
            let sender = sender_department(from.as_deref(), &caller)?;
            let receiver_dept: Department = to.parse()?;
            let receiver = match to_user {
                Some(user) => Party::new(user.as_str(), receiver_dept),
                None => Party::department_only(receiver_dept),
            };
            let filter = FlowFilter {
                line: line.clone(),
                year: *year,
                month: *month,
                week: *week,
                day: *day,
            };
            let drafts = read_rows(rows)?;

            let mut pool = super::open(cfg)?;
            let now = Local::now().naive_local();
            let batch = FlowLogic::create(
                &mut pool, &gate, &caller, sender, receiver, filter, drafts, now,
            )?;

            if cli.json {
                return super::print_json(&batch);
            }
            success(format!(
                "Batch #{} created: {} → {} ({} rows, {})",
                batch.id,
                batch.sender.department,
                batch.receiver.department,
                batch.total_rows,
                batch.state
            ));
        }

        FlowCommand::Advance { id, to } => {
            let target: FlowState = to.parse()?;
            let mut pool = super::open(cfg)?;
            let now = Local::now().naive_local();
            let batch = FlowLogic::advance(&mut pool, &gate, &caller, *id, target, now)?;

            if cli.json {
                return super::print_json(&batch);
            }
            success(format!("Batch #{} is now {}", batch.id, batch.state));
        }

        FlowCommand::List {
            state,
            from,
            to,
            sender,
            receiver,
        } => {
            let query = BatchQuery {
                state: state.as_deref().map(str::parse).transpose()?,
                from: parse_optional_date(from.as_deref())?,
                to: parse_optional_date(to.as_deref())?,
                sender_department: sender.as_deref().map(str::parse).transpose()?,
                receiver_department: receiver.as_deref().map(str::parse).transpose()?,
            };

            let pool = super::open(cfg)?;
            let batches = FlowLogic::list(&pool, &gate, &caller, &query)?;

            if cli.json {
                return super::print_json(&batches);
            }
            print_batches(&batches);
        }

        FlowCommand::Show { id } => {
            let pool = super::open(cfg)?;
            let detail = FlowLogic::show(&pool, &gate, &caller, *id)?;

            if cli.json {
                return super::print_json(&detail);
            }
            print_detail(&detail);
        }
    }

    Ok(())
}

/// `--from`, else the department the caller acts for.
fn sender_department(from: Option<&str>, caller: &Principal) -> AppResult<Department> {
    match from {
        Some(code) => code.parse(),
        None => caller.role.department().ok_or_else(|| {
            AppError::InvalidRole(format!(
                "role '{}' has no department; pass --from <department>",
                caller.role
            ))
        }),
    }
}

fn read_rows(path: &str) -> AppResult<Vec<FlowRowDraft>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_batches(batches: &[OutboundFlowBatch]) {
    if batches.is_empty() {
        info("No batches match.");
        return;
    }

    let mut table = Table::new(vec![
        Column::new("ID", 4),
        Column::new("CREATED", 19),
        Column::new("FROM", 10),
        Column::new("TO", 10),
        Column::new("ROWS", 4),
        Column::new("STATE", 9),
    ]);
    for b in batches {
        table.add_row(vec![
            b.id.to_string(),
            b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            b.sender.department.to_string(),
            b.receiver.department.to_string(),
            b.total_rows.to_string(),
            b.state.to_string(),
        ]);
    }

    let rendered = table.render();
    let mut lines = rendered.lines();
    for line in lines.by_ref().take(2) {
        println!("{line}");
    }
    for (line, b) in lines.zip(batches) {
        println!("{}{}{}", color_for_state(b.state), line, RESET);
    }
}

fn print_detail(detail: &BatchDetail) {
    let b = &detail.batch;
    header(format!("Batch #{}", b.id));
    println!(
        "{} {} ({}) → {} ({})",
        bold("Route:"),
        b.sender.department,
        b.sender.user_id.as_deref().unwrap_or("-"),
        b.receiver.department,
        b.receiver.user_id.as_deref().unwrap_or("any")
    );
    println!(
        "{} {}{}{}",
        bold("State:"),
        color_for_state(b.state),
        b.state,
        RESET
    );
    println!("{} {}\n", bold("Created:"), b.created_at);

    let mut table = Table::new(vec![
        Column::new("#", 3),
        Column::new("DATE", 10),
        Column::new("LINE", 6),
        Column::new("REFERENCE", 10),
        Column::new("UNITS", 5),
        Column::new("STD TIME", 8),
        Column::new("STATUS", 8),
        Column::new("OBSERVATION", 0),
    ]);
    for (i, r) in b.rows.iter().enumerate() {
        let observation = if r.observation.is_empty() { "--" } else { r.observation.as_str() };
        table.add_row(vec![
            (i + 1).to_string(),
            r.date.to_string(),
            r.line.clone(),
            r.reference.clone(),
            r.units.to_string(),
            format!("{:.2}", r.standard_time),
            r.status.clone(),
            colorize_optional(observation),
        ]);
    }
    print!("{}", table.render());

    if !detail.transitions.is_empty() {
        println!("\n{}", bold("History"));
        for t in &detail.transitions {
            println!("  {}  {} → {}  by {} ({})", t.at, t.from, t.to, t.actor_id, t.actor_role);
        }
    }
}
