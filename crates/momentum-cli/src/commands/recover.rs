use clap::Subcommand;
use momentum_core::storage::Database;
use momentum_core::{DayKey, LogTelemetry, RecoveryPolicy};

#[derive(Subcommand)]
pub enum RecoverAction {
    /// Repair yesterday's missed day with a short reflection
    Apply {
        /// What you still did well on the missed day
        #[arg(long = "well-done")]
        well_done: String,
    },
    /// Whether recovery is currently available
    Status,
}

pub fn run(user: &str, action: RecoverAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let today = DayKey::today();
    match action {
        RecoverAction::Apply { well_done } => {
            let telemetry = LogTelemetry;
            let policy = RecoveryPolicy::with_telemetry(&db, &telemetry);
            let outcome = policy.recover_streak(user, today, &well_done)?;
            println!(
                "recovered {}: streak {} ({} total)",
                outcome.reflection.date,
                outcome.stats.current_streak,
                outcome.stats.total_completions
            );
        }
        RecoverAction::Status => {
            let policy = RecoveryPolicy::new(&db);
            if policy.available(user, today)? {
                println!("recovery available");
            } else {
                println!("recovery already used this week");
            }
        }
    }
    Ok(())
}
