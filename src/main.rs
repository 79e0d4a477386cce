//! # todo - to-do lists in the terminal
//!
//! A keyboard-driven to-do list manager. Each day gets its own list; starting
//! a new list carries over whatever is still open, along with the notes.
//!
//! ## Key Features
//!
//! - **Lists, items, tags**: every item has a done flag plus six category
//!   toggles (pinned, health, project, life, maintenance, entertainment)
//! - **Fast keyboard editing**: Enter adds, Ctrl+Space completes, Ctrl+↑/↓
//!   reorders, Backspace on an empty item removes it
//! - **Shared data file**: several open instances stay in step; when one
//!   saves, the others reload
//! - **Scriptable**: the same operations are available as subcommands
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the interactive UI
//! todo
//!
//! # Add an item from a script
//! todo add "Renew passport" --tag life
//!
//! # Print the current list
//! todo show
//! ```
//!
//! Data is stored in `~/.todolists/todo-lists.json` unless `--db`,
//! `TODOLISTS_DB` or the config file point elsewhere.

use std::fs::{self, File};
use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, warn};
use simplelog::{ConfigBuilder, WriteLogger};

pub mod cli;
pub mod cmd;
pub mod config;
pub mod fields;
pub mod state;
pub mod store;
pub mod todo;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
    pub mod view;
}

use cli::Cli;
use cmd::*;
use config::{ConfigSource, ResolvedConfig, DB_ENV_VAR};
use store::Store;

/// Initialize the file logger. The TUI owns stdout, so logs go to a file.
fn init_logging(config: &ResolvedConfig) {
    if let Some(parent) = config.log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::options().create(true).append(true).open(&config.log_path) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let (file_config, config_result) = match config::load_config(&config_path) {
        Ok((c, source)) => (c, Ok(source)),
        Err(e) => {
            eprintln!("Ignoring config {}: {e}", config_path.display());
            (config::TodoConfig::default(), Err(e))
        }
    };
    let env_db = std::env::var_os(DB_ENV_VAR).map(PathBuf::from);
    let resolved = config::resolve(&file_config, env_db, cli.db.clone());

    init_logging(&resolved);
    match config_result {
        Ok(ConfigSource::File) => info!("Loaded config from {}", config_path.display()),
        Ok(ConfigSource::Generated) => {
            info!("No config file found, generated default at {}", config_path.display())
        }
        Ok(ConfigSource::GenerateFailed(e)) => {
            warn!("Failed to write default config to {}: {e}", config_path.display())
        }
        Err(e) => warn!("Using default config: {e}"),
    }
    debug!("Resolved config: {:?}", resolved);
    info!("todo starting up with data file {}", resolved.db_path.display());

    let command = cli.command.unwrap_or(Commands::Ui);

    // Commands that don't need the lists loaded first
    match command {
        Commands::Ui => {
            cmd_ui(&resolved.db_path, resolved.poll_interval);
            return;
        }
        Commands::Backup => {
            cmd_backup(&resolved.db_path);
            return;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return;
        }
        _ => {}
    }

    let mut store = Store::new(&resolved.db_path);
    let mut state = store.load();

    match command {
        Commands::Ui | Commands::Backup | Commands::Completions { .. } => {
            unreachable!("handled above")
        }
        Commands::Lists => cmd_lists(&state),
        Commands::Show { list } => cmd_show(&mut state, list),
        Commands::Add { text, tags, list } => cmd_add(&mut store, &mut state, text, tags, list),
        Commands::Done { index, list } => cmd_done(&mut store, &mut state, index, list),
        Commands::Rm { index, list } => cmd_rm(&mut store, &mut state, index, list),
        Commands::NewList => cmd_new_list(&mut store, &mut state),
        Commands::DeleteList { list } => cmd_delete_list(&mut store, &mut state, list),
        Commands::Sort { list } => cmd_sort(&mut store, &mut state, list),
    }
}
