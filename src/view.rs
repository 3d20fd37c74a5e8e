//! Filtering, sorting and statistics for the task list.
//!
//! `derive_view` is a pure function of the task collection, the filter
//! criteria and the current instant. Callers read the clock once per render
//! pass and pass it in, so overdue classification is consistent within a
//! single derivation.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fields::*;
use crate::task::{Task, TaskFilters};

/// Counts over the filtered task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

impl ListStats {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut stats = ListStats::default();
        for task in tasks {
            stats.total += 1;
            match task.status {
                Status::Completed => stats.completed += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::Pending => stats.pending += 1,
            }
        }
        stats
    }

    /// Completion percentage of the filtered set.
    pub fn completion_rate(&self) -> u32 {
        completion_rate(self.completed, self.total)
    }
}

/// Top-level summary computed over the whole store, ignoring filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub completion_rate: u32,
}

/// Why a derived view came out empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The store holds no tasks at all.
    NoTasks,
    /// Tasks exist but none pass the filters.
    NoMatches,
}

impl EmptyState {
    pub fn headline(self) -> &'static str {
        match self {
            EmptyState::NoTasks => "No tasks yet",
            EmptyState::NoMatches => "No tasks match your filters",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            EmptyState::NoTasks => {
                "Create your first task to get started with organizing your work."
            }
            EmptyState::NoMatches => {
                "Try adjusting your filters or search terms to find what you're looking for."
            }
        }
    }
}

/// The filtered, sorted projection of the task collection.
#[derive(Debug, Clone)]
pub struct TaskView<'a> {
    pub tasks: Vec<&'a Task>,
    pub stats: ListStats,
    pub empty: Option<EmptyState>,
}

/// `round(completed / total * 100)`, or 0 for an empty set.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

/// Summary over every task in the store.
pub fn summarize(tasks: &[Task]) -> Summary {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.status == Status::Completed).count();
    Summary {
        total,
        completed,
        completion_rate: completion_rate(completed, total),
    }
}

/// A task is overdue when its due date is strictly before `now` and it is not completed.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.status != Status::Completed && task.due_date.is_some_and(|due| due < now)
}

/// Whether `task` passes every present constraint in `filters`.
pub fn matches_filters(task: &Task, filters: &TaskFilters) -> bool {
    if let Some(status) = filters.status {
        if task.status != status {
            return false;
        }
    }
    if let Some(priority) = filters.priority {
        if task.priority != priority {
            return false;
        }
    }
    if let Some(ref category) = filters.category {
        if &task.category != category {
            return false;
        }
    }
    if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        let in_title = task.title.to_lowercase().contains(&needle);
        let in_description = task
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(&needle));
        if !in_title && !in_description {
            return false;
        }
    }
    true
}

/// Display order: overdue first, then priority descending, then due date
/// ascending (dated before undated), then newest first.
pub fn compare_tasks(a: &Task, b: &Task, now: DateTime<Utc>) -> Ordering {
    is_overdue(b, now)
        .cmp(&is_overdue(a, now))
        .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Filter and sort `tasks`, and count the result.
pub fn derive_view<'a>(
    tasks: &'a [Task],
    filters: &TaskFilters,
    now: DateTime<Utc>,
) -> TaskView<'a> {
    let mut visible: Vec<&Task> = tasks.iter().filter(|t| matches_filters(t, filters)).collect();
    visible.sort_by(|a, b| compare_tasks(a, b, now));

    let stats = ListStats::from_tasks(visible.iter().copied());
    let empty = if !visible.is_empty() {
        None
    } else if tasks.is_empty() {
        Some(EmptyState::NoTasks)
    } else {
        Some(EmptyState::NoMatches)
    };

    TaskView {
        tasks: visible,
        stats,
        empty,
    }
}
