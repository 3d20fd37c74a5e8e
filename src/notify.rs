//! Notifications describing the outcome of store mutations.
//!
//! The store pushes one `Notification` per successful mutation; the UI drains
//! them and renders each as a transient toast. Nothing waits on delivery.

use crate::fields::Status;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Destructive,
}

/// A fire-and-forget message about a store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    /// A task was added.
    pub fn created(task_title: &str) -> Self {
        Notification {
            title: "Task created!".into(),
            description: format!("\"{}\" has been added to your tasks.", task_title),
            severity: Severity::Normal,
        }
    }

    /// A task moved to `status`.
    pub fn status_changed(task_title: &str, status: Status) -> Self {
        let title = match status {
            Status::Pending => "Task moved to pending",
            Status::InProgress => "Task is now in progress",
            Status::Completed => "Task completed! 🎉",
        };
        Notification {
            title: title.into(),
            description: format!("\"{}\" status updated.", task_title),
            severity: Severity::Normal,
        }
    }

    /// A task was removed.
    pub fn deleted(task_title: &str) -> Self {
        Notification {
            title: "Task deleted".into(),
            description: format!("\"{}\" has been removed.", task_title),
            severity: Severity::Destructive,
        }
    }
}
