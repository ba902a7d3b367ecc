use clap::Subcommand;
use momentum_core::storage::Database;
use momentum_core::{affirmations, CompletionGuard, DayKey, LogTelemetry, MorningDraft};

use crate::common::{non_blank, resolve_date};

#[derive(Subcommand)]
pub enum MorningAction {
    /// Record a completed morning routine for today (or --date)
    Complete {
        /// Who I am becoming today
        #[arg(long)]
        identity: Option<String>,
        /// How I want to feel
        #[arg(long)]
        feeling: Option<String>,
        /// One concrete action for the day
        #[arg(long)]
        action: Option<String>,
        /// The old pattern being replaced
        #[arg(long)]
        replace: Option<String>,
        /// Why today matters
        #[arg(long)]
        why: Option<String>,
        #[arg(long)]
        water: bool,
        #[arg(long)]
        light: bool,
        #[arg(long = "move")]
        moved: bool,
        #[arg(long)]
        timer: bool,
        #[arg(long)]
        visualized: bool,
        /// Calendar day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the entry for a day
    Show {
        #[arg(long)]
        date: Option<String>,
    },
    /// List all morning entries
    List,
    /// Print today's affirmation
    Affirmation,
}

pub fn run(user: &str, action: MorningAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MorningAction::Complete {
            identity,
            feeling,
            action,
            replace,
            why,
            water,
            light,
            moved,
            timer,
            visualized,
            date,
        } => {
            let date = resolve_date(&date)?;
            let draft = MorningDraft {
                identity: non_blank(identity),
                feeling: non_blank(feeling),
                action: non_blank(action),
                replace_pattern: non_blank(replace),
                why_today_matters: non_blank(why),
                starter_suggestion_used: false,
                drank_water: water,
                exposed_to_light: light,
                moved_body: moved,
                timer_completed: timer,
                visualization_completed: visualized,
            };
            let db = Database::open()?;
            let telemetry = LogTelemetry;
            let guard = CompletionGuard::with_telemetry(&db, &telemetry);
            let outcome = guard.complete_morning(user, date, &draft)?;
            println!(
                "completed {date}: streak {} ({} total)",
                outcome.stats.current_streak, outcome.stats.total_completions
            );
            if outcome.milestone {
                println!(
                    "milestone! {} day(s) in a row",
                    outcome.stats.current_streak
                );
            }
        }
        MorningAction::Show { date } => {
            let date = resolve_date(&date)?;
            let db = Database::open()?;
            match db.morning_entry_by_date(user, date)? {
                Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
                None => println!("no entry for {date}"),
            }
        }
        MorningAction::List => {
            let db = Database::open()?;
            let entries = db.list_morning_entries(user)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        MorningAction::Affirmation => {
            println!("{}", affirmations::daily(DayKey::today()));
        }
    }
    Ok(())
}
