use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Local task planner.
/// State lives in $HOME/.planner unless --data-dir or PLANNER_DIR says otherwise.
#[derive(Parser)]
#[command(name = "planner", version, about = "Local task planner with dashboard analytics")]
pub struct Cli {
    /// Directory holding snapshots and config.toml.
    #[arg(long, global = true, env = "PLANNER_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
