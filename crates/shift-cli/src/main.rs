//! `shiftctl`: query schedule weeks and manage time-off from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Worked hours per worker for a schedule-week document
//! shiftctl hours -i week.json --roster workers.json
//!
//! # Opening/closing headcounts for guards
//! shiftctl counts -i week.json --kind guard
//!
//! # Document id of the week containing a date
//! shiftctl week-id --company pool --date 2026-06-10
//!
//! # Request lifecycle against a JSON state file
//! shiftctl request --state state.json submit --worker ana --company pool --start 2026-07-01 --end 2026-07-03
//! shiftctl request --state state.json approve --id req-1 --by mgr
//! shiftctl request --state state.json deny --id req-1 --by mgr --yes
//! shiftctl request --state state.json retract --id req-1 --by ana
//!
//! # Replace a worker's recurring rules
//! shiftctl rules --state state.json --company pool --worker ana -i rules.json
//! ```

mod display;
mod state;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use shift_engine::time::parse_time;
use shift_engine::{
    EngineConfig, NewOffRequest, OffRequestStore, OffRule, RequestStatus, ScheduleWeek, ShiftType,
    TimeOff, WeekId, Worker,
};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shiftctl",
    version,
    about = "Schedule hours, staffing counts, and time-off management"
)]
struct Cli {
    /// Engine configuration file (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Worked hours per worker for one schedule week
    Hours {
        /// Schedule-week document (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Worker roster (JSON array) used for minor status
        #[arg(long)]
        roster: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Opening/closing headcounts per day for one shift kind
    Counts {
        /// Schedule-week document (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Shift kind to count (guard, front, manager, ...)
        #[arg(long, default_value = "guard")]
        kind: String,
    },
    /// Print the document id of the schedule week containing a date
    WeekId {
        #[arg(long)]
        company: String,
        /// Any date inside the week (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Submit or resolve time-off requests
    Request {
        /// State file holding weeks, requests, and workers
        #[arg(long)]
        state: String,
        /// Override the current time (RFC 3339)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        #[command(subcommand)]
        action: RequestAction,
    },
    /// Replace a worker's recurring time-off rules
    Rules {
        #[arg(long)]
        state: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        worker: String,
        /// Rules file (JSON array; reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Publish (or unpublish) the schedule week containing a date
    Publish {
        #[arg(long)]
        state: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        date: NaiveDate,
        /// Return the week to draft instead
        #[arg(long)]
        undo: bool,
    },
}

#[derive(Subcommand)]
enum RequestAction {
    /// Submit a new request
    Submit {
        #[arg(long)]
        worker: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Start time for a partial-day request (HH:MM)
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// End time for a partial-day request (HH:MM)
        #[arg(long, requires = "from")]
        to: Option<String>,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Approve a pending or denied request
    Approve {
        #[arg(long)]
        id: String,
        #[arg(long)]
        by: String,
    },
    /// Deny a pending or approved request
    Deny {
        #[arg(long)]
        id: String,
        #[arg(long)]
        by: String,
        /// Confirm removing markers of an already approved request
        #[arg(long)]
        yes: bool,
    },
    /// Retract an approved request (requesting worker only)
    Retract {
        #[arg(long)]
        id: String,
        #[arg(long)]
        by: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Hours {
            input,
            roster,
            json,
        } => {
            let week: ScheduleWeek = read_json(input.as_deref())?;
            let roster: Vec<Worker> = match roster {
                Some(path) => read_json(Some(path.as_str()))?,
                None => Vec::new(),
            };
            let summary = shift_engine::week_summary(
                &week.shifts,
                &roster,
                &config.breaks,
                config.overtime_threshold_hours,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", display::hours_table(&summary));
            }
        }
        Commands::Counts { input, kind } => {
            let week: ScheduleWeek = read_json(input.as_deref())?;
            let kind: ShiftType = kind.parse()?;
            let counts = shift_engine::staffing_counts(&week.shifts, kind, &config.core_hours);
            print!("{}", display::counts_line(kind, &counts));
        }
        Commands::WeekId { company, date } => {
            println!("{}", WeekId::containing(company, date));
        }
        Commands::Request { state, now, action } => {
            let store = state::load(&state)?;
            let now = now.unwrap_or_else(Utc::now);
            let time_off = TimeOff::new(&store, &config);

            let transition = match action {
                RequestAction::Submit {
                    worker,
                    company,
                    start,
                    end,
                    from,
                    to,
                    reason,
                } => {
                    let start_time = from.as_deref().map(parse_time).transpose()?;
                    let end_time = to.as_deref().map(parse_time).transpose()?;
                    let request = NewOffRequest {
                        worker_id: worker,
                        company_id: company,
                        start_date: Some(start),
                        end_date: Some(end),
                        is_all_day: start_time.is_none(),
                        start_time,
                        end_time,
                        reason,
                    };
                    time_off.submit_request(&request, now)?
                }
                RequestAction::Approve { id, by } => time_off.approve(&id, &by, now)?,
                RequestAction::Deny { id, by, yes } => {
                    let current = store
                        .get_request(&id)?
                        .with_context(|| format!("No such request: {}", id))?;
                    if current.status == RequestStatus::Approved && !yes {
                        anyhow::bail!(
                            "Request {} is approved; denying it removes its time off from draft schedules. Re-run with --yes to confirm.",
                            id
                        );
                    }
                    time_off.deny(&id, &by, now)?
                }
                RequestAction::Retract { id, by } => time_off.retract(&id, &by, now)?,
            };

            state::save(&state, &store)?;
            if !transition.report.is_complete() {
                tracing::warn!(
                    failed = transition.report.days_failed,
                    "some days could not be reconciled; re-run to retry"
                );
            }
            println!("{}", serde_json::to_string_pretty(&transition)?);
        }
        Commands::Rules {
            state,
            company,
            worker,
            input,
            now,
        } => {
            let store = state::load(&state)?;
            let rules: Vec<OffRule> = read_json(input.as_deref())?;
            let report = TimeOff::new(&store, &config).save_rules(
                &company,
                &worker,
                &rules,
                now.unwrap_or_else(Utc::now),
            )?;
            state::save(&state, &store)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Publish {
            state,
            company,
            date,
            undo,
        } => {
            let store = state::load(&state)?;
            let id = WeekId::containing(company, date);
            if undo {
                store.unpublish(&id)?;
            } else {
                store.publish(&id)?;
            }
            state::save(&state, &store)?;
            println!("{}", id);
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path))?;
            EngineConfig::from_json(&raw).with_context(|| format!("Invalid config: {}", path))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: Option<&str>) -> Result<T> {
    let raw = read_input(path)?;
    let source = path.unwrap_or("stdin");
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", source))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
