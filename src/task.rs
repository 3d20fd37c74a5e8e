//! Task data structures and related functionality.
//!
//! This module defines the core `Task` struct that represents a single work
//! item, the fixed `Category` set, the `NewTask` input accepted by the store
//! and the `TaskFilters` criteria consumed by the view engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// Name of the category assigned when none is chosen.
pub const DEFAULT_CATEGORY: &str = "general";

/// A unit of work with status, priority, category and optional due date.
///
/// `completed_at` is present exactly when `status` is `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A named bucket tasks can be filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The fixed category set offered by the form and the filter panel.
pub fn default_categories(now: DateTime<Utc>) -> Vec<Category> {
    ["general", "work", "personal", "health", "learning"]
        .iter()
        .enumerate()
        .map(|(i, name)| Category {
            id: (i + 1).to_string(),
            name: name.to_string(),
            color: None,
            created_at: now,
        })
        .collect()
}

/// Input for creating a task. Everything but the title is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// A submission is acceptable when its title is non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Filter criteria for the derived view. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilters {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl TaskFilters {
    /// Set the search text. Blank input clears the constraint.
    pub fn set_search(&mut self, search: &str) {
        self.search = if search.is_empty() {
            None
        } else {
            Some(search.to_string())
        };
    }

    /// Set the category. Blank input clears the constraint.
    pub fn set_category(&mut self, category: Option<&str>) {
        self.category = category.filter(|c| !c.is_empty()).map(str::to_string);
    }

    /// Whether any dimension is constrained.
    pub fn has_active(&self) -> bool {
        self.status.is_some()
            || self.priority.is_some()
            || self.category.is_some()
            || self.search.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Remove every constraint.
    pub fn clear(&mut self) {
        *self = TaskFilters::default();
    }

    /// Human-readable chips for the active constraints, in display order.
    pub fn describe(&self) -> Vec<String> {
        let mut chips = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            chips.push(format!("Search: \"{}\"", search));
        }
        if let Some(status) = self.status {
            chips.push(format!("Status: {}", format_status(status)));
        }
        if let Some(priority) = self.priority {
            chips.push(format!("Priority: {}", format_priority(priority)));
        }
        if let Some(category) = &self.category {
            chips.push(format!("Category: {}", category));
        }
        chips
    }
}
