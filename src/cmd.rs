//! Command implementations for the CLI interface.
//!
//! This module contains the handlers behind each subcommand: launching the
//! TUI, printing a derived view, generating shell completions, and seeding
//! the example data used by `--sample`.

use std::io;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::info;

use crate::cli::Cli;
use crate::dates::{format_date, format_due_relative};
use crate::fields::*;
use crate::store::TaskStore;
use crate::task::{NewTask, Task, TaskFilters};
use crate::tui::run::run_tui;
use crate::view::{is_overdue, ListStats, Summary, TaskView};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (the default).
    Ui,

    /// Print the filtered, sorted task list.
    List {
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Filter by category name (exact match).
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive text to look for in titles and descriptions.
        #[arg(long)]
        search: Option<String>,
        /// Emit the view as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings the terminal UI reads at startup.
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub toast_duration: StdDuration,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            toast_duration: StdDuration::from_secs(4),
        }
    }
}

impl UiConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        UiConfig {
            toast_duration: StdDuration::from_secs(cli.toast_secs.max(1)),
        }
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(store: TaskStore, config: UiConfig) -> Result<()> {
    info!(tasks = store.len(), "starting ui");
    run_tui(store, config).context("terminal UI failed")
}

/// Print the derived view for the given filters.
pub fn cmd_list(
    store: &mut TaskStore,
    status: Option<Status>,
    priority: Option<Priority>,
    category: Option<String>,
    search: Option<String>,
    json: bool,
) -> Result<()> {
    let mut filters = TaskFilters {
        status,
        priority,
        ..Default::default()
    };
    filters.set_category(category.as_deref());
    filters.set_search(search.as_deref().unwrap_or_default());
    store.set_filters(filters);

    let now = Utc::now();
    let view = store.view(now);
    let summary = store.summary();

    if json {
        #[derive(Serialize)]
        struct ListOutput<'a> {
            summary: Summary,
            stats: ListStats,
            #[serde(rename = "completionRate")]
            completion_rate: u32,
            tasks: &'a [&'a Task],
        }
        let out = ListOutput {
            summary,
            stats: view.stats,
            completion_rate: view.stats.completion_rate(),
            tasks: &view.tasks,
        };
        let data = serde_json::to_string_pretty(&out).context("failed to encode view")?;
        println!("{data}");
        return Ok(());
    }

    if summary.total > 0 {
        println!(
            "Total Tasks: {}  Completed: {}  Success Rate: {}%",
            summary.total, summary.completed, summary.completion_rate
        );
    }
    if store.filters().has_active() {
        println!("Active filters: {}", store.filters().describe().join(", "));
    }
    if let Some(empty) = view.empty {
        println!("{}", empty.headline());
        println!("{}", empty.hint());
        return Ok(());
    }
    print_stats(&view);
    println!();
    print_table(&view, now);
    Ok(())
}

/// Generate a completion script on stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn print_stats(view: &TaskView) {
    let s = view.stats;
    println!(
        "Total: {}  Completed: {}  In Progress: {}  Pending: {}  Progress: {}%",
        s.total,
        s.completed,
        s.in_progress,
        s.pending,
        s.completion_rate()
    );
}

/// Print tasks in a formatted table, in view order.
pub fn print_table(view: &TaskView, now: DateTime<Utc>) {
    println!(
        "{:<12} {:<7} {:<14} {:<10} {}",
        "Status", "Pri", "Due", "Category", "Title"
    );
    let today = now.date_naive();
    for t in &view.tasks {
        let due = match t.due_date {
            Some(d) if is_overdue(t, now) => format!("{}!", format_due_relative(Some(d), today)),
            Some(d) => format_date(d),
            None => "-".into(),
        };
        let description = t
            .description
            .as_deref()
            .map(|d| format!(" - {}", truncate(d, 40)))
            .unwrap_or_default();
        println!(
            "{:<12} {:<7} {:<14} {:<10} {}{}",
            format_status(t.status),
            format_priority(t.priority),
            due,
            truncate(&t.category, 10),
            t.title,
            description
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Fill the store with a fixed set of example tasks relative to `now`.
pub fn seed_sample(store: &mut TaskStore, now: DateTime<Utc>) {
    let samples = [
        (
            NewTask::new("Renew passport")
                .description("Photos are in the desk drawer")
                .priority(Priority::Low)
                .category("personal")
                .due(now - Duration::days(2)),
            Some(Status::Pending),
        ),
        (
            NewTask::new("Prepare quarterly review")
                .description("Collect numbers from the dashboard")
                .priority(Priority::High)
                .category("work")
                .due(now + Duration::days(3)),
            Some(Status::InProgress),
        ),
        (
            NewTask::new("Buy milk").category("general"),
            None,
        ),
        (
            NewTask::new("Morning run")
                .description("5k around the park")
                .category("health"),
            Some(Status::Completed),
        ),
        (
            NewTask::new("Finish Rust book chapter")
                .priority(Priority::High)
                .category("learning")
                .due(now + Duration::days(7)),
            None,
        ),
    ];

    let count = samples.len() as i64;
    for (i, (data, status)) in samples.into_iter().enumerate() {
        let created = now - Duration::hours(count - i as i64);
        let Some(id) = store.create_task_at(data, created).map(|t| t.id.clone()) else {
            continue;
        };
        if let Some(status) = status {
            store.set_status_at(&id, status, created);
        }
    }
    store.take_notifications();
    info!(tasks = store.len(), "seeded sample tasks");
}
