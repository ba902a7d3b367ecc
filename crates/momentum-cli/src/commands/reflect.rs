use clap::Subcommand;
use momentum_core::storage::Database;
use momentum_core::{CompletionGuard, LogTelemetry, ReflectionDraft};

use crate::common::{non_blank, resolve_date};

#[derive(Subcommand)]
pub enum ReflectAction {
    /// Record a reflection for today (or --date)
    Add {
        /// What went well today
        #[arg(long = "well-done")]
        well_done: Option<String>,
        /// How I embodied who I want to be
        #[arg(long)]
        embodied: Option<String>,
        /// What I am grateful for
        #[arg(long)]
        grateful: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the reflection for a day
    Show {
        #[arg(long)]
        date: Option<String>,
    },
    /// List reflections, optionally within a date range
    List {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
}

pub fn run(user: &str, action: ReflectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        ReflectAction::Add {
            well_done,
            embodied,
            grateful,
            date,
        } => {
            let date = resolve_date(&date)?;
            let draft = ReflectionDraft {
                well_done: non_blank(well_done),
                embodied: non_blank(embodied),
                grateful: non_blank(grateful),
            };
            let telemetry = LogTelemetry;
            let guard = CompletionGuard::with_telemetry(&db, &telemetry);
            let reflection = guard.record_reflection(user, date, &draft)?;
            println!("reflection saved for {}", reflection.date);
        }
        ReflectAction::Show { date } => {
            let date = resolve_date(&date)?;
            match db.reflection_by_date(user, date)? {
                Some(reflection) => println!("{}", serde_json::to_string_pretty(&reflection)?),
                None => println!("no reflection for {date}"),
            }
        }
        ReflectAction::List { start, end } => {
            let reflections = match (start, end) {
                (Some(start), Some(end)) => {
                    db.reflections_in_range(user, start.parse()?, end.parse()?)?
                }
                (None, None) => db.list_reflections(user)?,
                _ => return Err("--start and --end must be given together".into()),
            };
            println!("{}", serde_json::to_string_pretty(&reflections)?);
        }
    }
    Ok(())
}
