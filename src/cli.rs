use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed to-do lists for the terminal.
/// Storage defaults to ~/.todolists/todo-lists.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "todo", version, about = "Daily to-do lists in the terminal")]
pub struct Cli {
    /// Path to the JSON data file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the config file (default ~/.todolists/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run; opens the interactive UI when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
