//! # Tasker - in-memory task manager
//!
//! A small task manager with an interactive terminal user interface (TUI) and a
//! scriptable `list` command.
//!
//! ## Key Features
//!
//! - **Task Store**: create tasks, move them through pending → in progress →
//!   completed, and delete them; every change raises a notification
//! - **Filter/Sort Engine**: filter by status, priority, category and free-text
//!   search, sorted so overdue and high-priority work comes first
//! - **Live Statistics**: completion rate over the whole store and counts for
//!   the filtered list
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI with a few example tasks
//! tasker --sample
//!
//! # Print in-progress tasks matching "review" as JSON
//! tasker list --sample --status in-progress --search review --json
//! ```
//!
//! Tasks live in memory for the lifetime of the process. Diagnostics go to the
//! file named by `--log-file` (or `TASKER_LOG_FILE`); the level is read from
//! `TASKER_LOG` and defaults to `info` (`debug` with `-v`).

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod dates;
pub mod fields;
pub mod notify;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod filter_form;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod toast;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use store::TaskStore;

/// Install the tracing subscriber.
///
/// The TUI owns the terminal, so without a log file it runs silent. The
/// `list` command has stdout for its output and logs to stderr instead.
fn init_tracing(log_file: Option<&Path>, verbose: bool, to_stderr: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("TASKER_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None if to_stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        None => return Ok(()),
    };
    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let is_list = matches!(cli.command, Some(Commands::List { .. }));
    init_tracing(cli.log_file.as_deref(), cli.verbose, is_list)?;

    let mut store = TaskStore::new();
    if cli.sample {
        seed_sample(&mut store, Utc::now());
    }
    let config = UiConfig::from_cli(&cli);

    match cli.command {
        None | Some(Commands::Ui) => cmd_ui(store, config),
        Some(Commands::List {
            status,
            priority,
            category,
            search,
            json,
        }) => cmd_list(&mut store, status, priority, category, search, json),
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
