use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// In-memory task manager with a terminal UI.
/// Nothing is persisted: tasks live for the lifetime of the process.
#[derive(Parser)]
#[command(name = "tasker", version, about = "Create, filter and track tasks in the terminal")]
pub struct Cli {
    /// Seed the store with a handful of example tasks.
    #[arg(long, global = true)]
    pub sample: bool,

    /// Write diagnostic logs to this file (the TUI owns the terminal).
    #[arg(long, global = true, env = "TASKER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level unless TASKER_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Seconds a notification toast stays on screen.
    #[arg(long, global = true, default_value_t = 4)]
    pub toast_secs: u64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;

    #[test]
    fn defaults_to_the_ui() {
        let cli = Cli::try_parse_from(["tasker"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.sample);
        assert_eq!(cli.toast_secs, 4);
    }

    #[test]
    fn list_accepts_filters() {
        let cli = Cli::try_parse_from([
            "tasker", "list", "--sample", "--status", "in-progress", "--search", "milk",
        ])
        .unwrap();
        assert!(cli.sample);
        match cli.command {
            Some(Commands::List { status, search, .. }) => {
                assert_eq!(status, Some(Status::InProgress));
                assert_eq!(search.as_deref(), Some("milk"));
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn rejects_unknown_priority() {
        assert!(Cli::try_parse_from(["tasker", "list", "--priority", "urgent"]).is_err());
    }
}
