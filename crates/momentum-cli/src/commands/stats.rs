use clap::Subcommand;
use momentum_core::storage::Database;
use momentum_core::streak;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current streak and lifetime totals
    Show,
}

pub fn run(user: &str, action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        StatsAction::Show => {
            let stats = db.user_stats(user)?;
            let mut json = serde_json::to_value(&stats)?;
            json["milestone"] = serde_json::Value::Bool(streak::is_milestone(stats.current_streak));
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}
