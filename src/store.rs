//! In-memory task store.
//!
//! `TaskStore` owns the canonical, most-recent-first list of tasks, the fixed
//! categories and the active filter criteria. Its methods are the only way to
//! mutate tasks; every successful mutation queues a `Notification` that the
//! UI drains with `take_notifications`.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::fields::*;
use crate::notify::Notification;
use crate::task::{default_categories, Category, NewTask, Task, TaskFilters, DEFAULT_CATEGORY};
use crate::view::{derive_view, summarize, Summary, TaskView};

/// Owned task collection plus the state derived views are computed from.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    categories: Vec<Category>,
    filters: TaskFilters,
    outbox: Vec<Notification>,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore::new()
    }
}

impl TaskStore {
    /// Create an empty store seeded with the default categories.
    pub fn new() -> Self {
        TaskStore {
            tasks: Vec::new(),
            categories: default_categories(Utc::now()),
            filters: TaskFilters::default(),
            outbox: Vec::new(),
        }
    }

    /// All tasks, most recently created first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn filters(&self) -> &TaskFilters {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by ID.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Generate an ID no task in the store currently uses.
    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Create a task stamped with the current time.
    pub fn create_task(&mut self, data: NewTask) -> Option<&Task> {
        self.create_task_at(data, Utc::now())
    }

    /// Create a task at the front of the list.
    ///
    /// A blank title is rejected without a notification; callers are expected
    /// to have validated the submission already.
    pub fn create_task_at(&mut self, data: NewTask, now: DateTime<Utc>) -> Option<&Task> {
        if !data.is_valid() {
            debug!("ignoring task submission with a blank title");
            return None;
        }
        let title = data.title.trim();

        let description = data
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let category = data
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();

        let task = Task {
            id: self.fresh_id(),
            title: title.to_string(),
            description,
            status: Status::Pending,
            priority: data.priority.unwrap_or_default(),
            due_date: data.due_date,
            category,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        debug!(id = %task.id, title = %task.title, "task created");

        self.outbox.push(Notification::created(&task.title));
        self.tasks.insert(0, task);
        self.tasks.first()
    }

    /// Change a task's status using the current time.
    pub fn set_status(&mut self, id: &str, status: Status) -> bool {
        self.set_status_at(id, status, Utc::now())
    }

    /// Change a task's status. Unknown IDs are ignored and return `false`.
    pub fn set_status_at(&mut self, id: &str, status: Status, now: DateTime<Utc>) -> bool {
        let Some(task) = self.get_mut(id) else {
            debug!(id, "status change for unknown task ignored");
            return false;
        };

        let stamp = now.max(task.updated_at);
        task.status = status;
        task.updated_at = stamp;
        task.completed_at = (status == Status::Completed).then_some(stamp);
        debug!(id, status = format_status(status), "task status updated");

        let notification = Notification::status_changed(&task.title, status);
        self.outbox.push(notification);
        true
    }

    /// Advance a task to the next status in the pending -> in-progress -> completed cycle.
    pub fn cycle_status(&mut self, id: &str) -> bool {
        match self.get(id).map(|t| t.status.next()) {
            Some(next) => self.set_status(id, next),
            None => false,
        }
    }

    /// Remove a task, keeping the relative order of the rest.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(id, "delete for unknown task ignored");
            return None;
        };
        let removed = self.tasks.remove(idx);
        debug!(id, title = %removed.title, "task deleted");
        self.outbox.push(Notification::deleted(&removed.title));
        Some(removed)
    }

    /// Replace the active filter criteria.
    pub fn set_filters(&mut self, filters: TaskFilters) {
        debug!(?filters, "filters updated");
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// The filtered, sorted view for the given instant.
    pub fn view(&self, now: DateTime<Utc>) -> TaskView<'_> {
        derive_view(&self.tasks, &self.filters, now)
    }

    /// Summary over the whole store, independent of the filters.
    pub fn summary(&self) -> Summary {
        summarize(&self.tasks)
    }

    /// Drain queued notifications in the order they were emitted.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use crate::view::ListStats;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap()
    }

    fn create(store: &mut TaskStore, data: NewTask, at: DateTime<Utc>) -> String {
        store.create_task_at(data, at).unwrap().id.clone()
    }

    #[test]
    fn create_applies_defaults_and_inserts_at_front() {
        let mut store = TaskStore::new();
        let first = create(&mut store, NewTask::new("  First  "), t0());
        let second = create(&mut store, NewTask::new("Second").description("   "), t0());

        let ids: Vec<_> = store.tasks().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, [second.clone(), first.clone()]);

        let task = store.get(&first).unwrap();
        assert_eq!(task.title, "First");
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, "general");
        assert_eq!(task.created_at, t0());
        assert_eq!(task.updated_at, t0());
        assert_eq!(task.completed_at, None);
        assert_eq!(store.get(&second).unwrap().description, None);
    }

    #[test]
    fn create_notifies_with_title() {
        let mut store = TaskStore::new();
        create(&mut store, NewTask::new("Buy milk"), t0());
        let notes = store.take_notifications();
        assert_eq!(notes, vec![Notification::created("Buy milk")]);
        assert!(store.take_notifications().is_empty());
    }

    #[test]
    fn blank_title_is_rejected_silently() {
        let mut store = TaskStore::new();
        assert!(store.create_task_at(NewTask::new("   "), t0()).is_none());
        assert!(store.is_empty());
        assert!(store.take_notifications().is_empty());
    }

    #[test]
    fn ids_stay_unique() {
        let mut store = TaskStore::new();
        let mut seen = HashSet::new();
        for i in 0..200 {
            let id = create(&mut store, NewTask::new(format!("task {i}")), t0());
            assert!(seen.insert(id));
            if i % 3 == 0 {
                let victim = store.tasks()[0].id.clone();
                store.delete_task(&victim);
            }
        }
    }

    #[test]
    fn completed_at_tracks_completed_status() {
        let mut store = TaskStore::new();
        let id = create(&mut store, NewTask::new("x"), t0());

        assert!(store.set_status_at(&id, Status::Completed, t0() + Duration::hours(1)));
        let task = store.get(&id).unwrap();
        assert_eq!(task.completed_at, Some(t0() + Duration::hours(1)));
        assert_eq!(task.updated_at, t0() + Duration::hours(1));

        for status in [Status::Pending, Status::InProgress] {
            store.set_status_at(&id, status, t0() + Duration::hours(2));
            assert_eq!(store.get(&id).unwrap().completed_at, None);
        }
        assert_eq!(store.get(&id).unwrap().created_at, t0());
    }

    #[test]
    fn updated_at_never_goes_backwards() {
        let mut store = TaskStore::new();
        let id = create(&mut store, NewTask::new("x"), t0());
        store.set_status_at(&id, Status::Completed, t0() - Duration::hours(1));
        let task = store.get(&id).unwrap();
        assert_eq!(task.updated_at, t0());
        assert_eq!(task.completed_at, Some(t0()));
    }

    #[test]
    fn status_change_notifies_per_status() {
        let mut store = TaskStore::new();
        let id = create(&mut store, NewTask::new("Buy milk"), t0());
        store.take_notifications();

        store.set_status_at(&id, Status::InProgress, t0());
        store.set_status_at(&id, Status::InProgress, t0());
        let notes = store.take_notifications();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].title, "Task is now in progress");
        assert_eq!(notes[0].description, "\"Buy milk\" status updated.");
    }

    #[test]
    fn unknown_id_status_change_is_a_silent_no_op() {
        let mut store = TaskStore::new();
        let id = create(&mut store, NewTask::new("x"), t0());
        store.take_notifications();
        let before = store.tasks().to_vec();

        assert!(!store.set_status_at("missing", Status::Completed, t0()));
        assert_eq!(store.tasks(), before.as_slice());
        assert!(store.take_notifications().is_empty());
        assert_eq!(store.get(&id).unwrap().status, Status::Pending);
    }

    #[test]
    fn cycle_status_walks_the_workflow() {
        let mut store = TaskStore::new();
        let id = create(&mut store, NewTask::new("x"), t0());
        store.cycle_status(&id);
        assert_eq!(store.get(&id).unwrap().status, Status::InProgress);
        store.cycle_status(&id);
        assert_eq!(store.get(&id).unwrap().status, Status::Completed);
        assert!(store.get(&id).unwrap().completed_at.is_some());
        store.cycle_status(&id);
        assert_eq!(store.get(&id).unwrap().status, Status::Pending);
        assert!(!store.cycle_status("missing"));
    }

    #[test]
    fn delete_removes_exactly_one_and_keeps_order() {
        let mut store = TaskStore::new();
        let a = create(&mut store, NewTask::new("a"), t0());
        let b = create(&mut store, NewTask::new("b"), t0());
        let c = create(&mut store, NewTask::new("c"), t0());
        store.take_notifications();

        let removed = store.delete_task(&b).unwrap();
        assert_eq!(removed.title, "b");
        let ids: Vec<_> = store.tasks().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, [c, a]);

        let notes = store.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].description, "\"b\" has been removed.");
        assert_eq!(notes[0].severity, Severity::Destructive);

        assert!(store.delete_task(&b).is_none());
        assert!(store.take_notifications().is_empty());
    }

    #[test]
    fn first_task_scenario() {
        let mut store = TaskStore::new();
        store.create_task_at(NewTask::new("Buy milk"), t0());
        let view = store.view(t0());
        assert_eq!(view.tasks.len(), 1);
        assert_eq!(
            view.stats,
            ListStats {
                total: 1,
                completed: 0,
                in_progress: 0,
                pending: 1,
            }
        );
        assert_eq!(store.summary().completion_rate, 0);
    }

    #[test]
    fn overdue_low_priority_sorts_before_high() {
        let mut store = TaskStore::new();
        let overdue = create(
            &mut store,
            NewTask::new("Pay rent")
                .priority(Priority::Low)
                .due(t0() - Duration::days(1)),
            t0() - Duration::days(2),
        );
        create(&mut store, NewTask::new("Ship release").priority(Priority::High), t0());

        let view = store.view(t0());
        assert_eq!(view.tasks[0].id, overdue);
    }

    #[test]
    fn summary_ignores_filters_while_view_respects_them() {
        let mut store = TaskStore::new();
        let done = create(&mut store, NewTask::new("Buy milk").category("personal"), t0());
        create(&mut store, NewTask::new("Fix bug").category("work"), t0());
        store.set_status_at(&done, Status::Completed, t0());
        store.set_filters(TaskFilters {
            category: Some("work".into()),
            ..Default::default()
        });

        assert_eq!(store.summary().total, 2);
        assert_eq!(store.summary().completion_rate, 50);
        let view = store.view(t0());
        assert_eq!(view.stats.total, 1);
        assert_eq!(view.stats.completion_rate(), 0);

        store.clear_filters();
        assert!(!store.filters().has_active());
        assert_eq!(store.view(t0()).stats.total, 2);
    }

    #[test]
    fn categories_are_seeded() {
        let store = TaskStore::default();
        assert_eq!(store.categories().len(), 5);
        assert_eq!(store.categories()[0].name, DEFAULT_CATEGORY);
    }
}
