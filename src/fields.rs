//! Enumerations and field types for task management.
//!
//! This module defines the structured values used to classify tasks: the
//! workflow status and the priority level, together with their display
//! labels and the lenient parsers used by the command line and the TUI.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task workflow status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl Status {
    /// All statuses in workflow order.
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    /// Next status in the toggle cycle: pending -> in-progress -> completed -> pending.
    pub fn next(self) -> Status {
        match self {
            Status::Pending => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// All priorities, highest first (the order used by selectors).
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Numeric weight used when sorting: high=3, medium=2, low=1.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Pending => "Pending",
        Status::InProgress => "In Progress",
        Status::Completed => "Completed",
    }
}

/// Format a priority level for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_cycle_wraps_around() {
        assert_eq!(Status::Pending.next(), Status::InProgress);
        assert_eq!(Status::InProgress.next(), Status::Completed);
        assert_eq!(Status::Completed.next(), Status::Pending);
    }

    #[test]
    fn priority_ranks_are_ordered() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: Status = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(back, Status::Completed);
    }
}
