use clap::{Parser, Subcommand};

mod commands;
mod common;
mod logging;

#[derive(Parser)]
#[command(name = "momentum-cli", version, about = "Momentum CLI")]
struct Cli {
    /// User the command acts on
    #[arg(long, global = true, default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Morning routine: complete the day, inspect entries
    Morning {
        #[command(subcommand)]
        action: commands::morning::MorningAction,
    },
    /// Evening reflections
    Reflect {
        #[command(subcommand)]
        action: commands::reflect::ReflectAction,
    },
    /// Streak recovery for a missed day
    Recover {
        #[command(subcommand)]
        action: commands::recover::RecoverAction,
    },
    /// Streak statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let _logger = logging::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Morning { action } => commands::morning::run(&cli.user, action),
        Commands::Reflect { action } => commands::reflect::run(&cli.user, action),
        Commands::Recover { action } => commands::recover::run(&cli.user, action),
        Commands::Stats { action } => commands::stats::run(&cli.user, action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
