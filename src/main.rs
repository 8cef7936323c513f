//! # planner
//!
//! Command-line front end for the task planner library.
//!
//! ```bash
//! # Load the sample tasks on an empty store
//! planner init
//!
//! # Add a task
//! planner add "Book dentist" --category Health --priority High --due friday --tag errands
//!
//! # Search and sort
//! planner list --search report --sort priority
//!
//! # Dashboard, agenda and calendar
//! planner stats
//! planner agenda
//! planner calendar --month 2024-06
//! ```
//!
//! Data lives in `~/.planner/` (override with `--data-dir` or `PLANNER_DIR`).

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use task_planner::config::{resolve_data_dir, Config};
use task_planner::prefs::PreferenceStore;
use task_planner::{Result, TaskStore};

mod cli;
mod cmd;

use cli::Cli;
use cmd::*;

fn main() {
    // Tracing is opt-in via RUST_LOG.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let data_dir = resolve_data_dir(cli.data_dir)?;
    let config = Config::load_from_dir(&data_dir)?;

    if let Commands::DarkMode { value } = cli.command {
        let mut prefs = PreferenceStore::open(&data_dir);
        cmd_dark_mode(&mut prefs, value);
        return Ok(());
    }

    let mut store = TaskStore::open(&data_dir).with_week_start(config.week_start);
    if config.seed_sample_data && !matches!(cli.command, Commands::Init) {
        store.initialize_data();
    }

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),
        Commands::DarkMode { .. } => unreachable!("dark mode handled above"),
        Commands::Add(args) => cmd_add(&mut store, args),
        Commands::List(args) => cmd_list(&store, args),
        Commands::View { id } => cmd_view(&store, &id),
        Commands::Update(args) => cmd_update(&mut store, args),
        Commands::Toggle { id } => cmd_toggle(&mut store, &id),
        Commands::Delete { id } => cmd_delete(&mut store, &id),
        Commands::Stats { json } => cmd_stats(&store, json),
        Commands::Agenda => {
            cmd_agenda(&store);
            Ok(())
        }
        Commands::Calendar { month, active } => cmd_calendar(&store, month, active),
        Commands::Category { action } => cmd_category(&mut store, action),
        Commands::Team { action } => cmd_team(&mut store, action),
        Commands::Filters(args) => cmd_filters(&mut store, args),
        Commands::Init => cmd_init(&mut store, &data_dir),
    }
}
