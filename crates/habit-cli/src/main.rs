mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::goal::GoalSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tinyhabit",
    about = "Tiny-habit coach: one goal at a time, one day at a time",
    version,
    propagate_version = true
)]
struct Cli {
    /// Habit root (default: auto-detect from .habit/ or .git/)
    #[arg(long, global = true, env = "HABIT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the habit store in the current project
    Init,

    /// Manage the active goal and its history
    Goal {
        #[command(subcommand)]
        subcommand: GoalSubcommand,
    },

    /// Mark a day done (default: today)
    Done {
        /// Day to mark, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Unmark a day (default: today)
    Undone {
        /// Day to unmark, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the active goal, streak, and recent consistency
    Status,

    /// Send one message to the habit coach
    Chat { message: String },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Goal { subcommand } => cmd::goal::run(&root, subcommand, cli.json),
        Commands::Done { date } => cmd::track::run(&root, date.as_deref(), true, cli.json),
        Commands::Undone { date } => cmd::track::run(&root, date.as_deref(), false, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Chat { message } => cmd::chat::run(&root, &message, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
