//! Filter panel state for the terminal user interface.
//!
//! Each selector starts with an "All" entry meaning no constraint. The panel
//! is applied live: the app pushes `to_filters()` into the store after every
//! change.

use crate::{
    fields::{format_priority, format_status, Priority, Status},
    task::{Category, TaskFilters},
    tui::{input::InputField, task_form::cycle},
};

pub const SEARCH_FIELD: usize = 0;
pub const STATUS_FIELD: usize = 1;
pub const PRIORITY_FIELD: usize = 2;
pub const CATEGORY_FIELD: usize = 3;

const FIELD_COUNT: usize = 4;

pub struct FilterForm {
    pub search: InputField,
    pub current_field: usize,
    /// Index into `statuses`; 0 is "All".
    pub status: usize,
    pub priority: usize,
    pub category: usize,
    pub statuses: Vec<Option<Status>>,
    pub priorities: Vec<Option<Priority>>,
    pub categories: Vec<Option<String>>,
}

impl FilterForm {
    /// Build the panel showing the current `filters`.
    pub fn from_filters(filters: &TaskFilters, categories: &[Category]) -> Self {
        let statuses: Vec<Option<Status>> =
            std::iter::once(None).chain(Status::ALL.map(Some)).collect();
        let priorities: Vec<Option<Priority>> =
            std::iter::once(None).chain(Priority::ALL.map(Some)).collect();
        let categories: Vec<Option<String>> = std::iter::once(None)
            .chain(categories.iter().map(|c| Some(c.name.clone())))
            .collect();

        let mut form = FilterForm {
            search: InputField::with_value(filters.search.as_deref().unwrap_or_default()),
            current_field: SEARCH_FIELD,
            status: statuses.iter().position(|s| *s == filters.status).unwrap_or(0),
            priority: priorities.iter().position(|p| *p == filters.priority).unwrap_or(0),
            category: categories
                .iter()
                .position(|c| *c == filters.category)
                .unwrap_or(0),
            statuses,
            priorities,
            categories,
        };
        form.search.active = true;
        form
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.search.active = self.current_field == SEARCH_FIELD;
    }

    pub fn prev_field(&mut self) {
        self.current_field = cycle(self.current_field, FIELD_COUNT, false);
        self.search.active = self.current_field == SEARCH_FIELD;
    }

    pub fn handle_char(&mut self, c: char) {
        if self.current_field == SEARCH_FIELD {
            self.search.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if self.current_field == SEARCH_FIELD {
            self.search.handle_backspace();
        }
    }

    /// Left/right moves the cursor in the search box or cycles a selector.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            SEARCH_FIELD => {
                if right {
                    self.search.move_cursor_right()
                } else {
                    self.search.move_cursor_left()
                }
            }
            STATUS_FIELD => self.status = cycle(self.status, self.statuses.len(), right),
            PRIORITY_FIELD => self.priority = cycle(self.priority, self.priorities.len(), right),
            CATEGORY_FIELD => self.category = cycle(self.category, self.categories.len(), right),
            _ => {}
        }
    }

    /// Put every selector back on "All" and empty the search box.
    pub fn reset(&mut self) {
        self.search.clear();
        self.status = 0;
        self.priority = 0;
        self.category = 0;
    }

    pub fn to_filters(&self) -> TaskFilters {
        let mut filters = TaskFilters {
            status: self.statuses.get(self.status).copied().flatten(),
            priority: self.priorities.get(self.priority).copied().flatten(),
            ..Default::default()
        };
        filters.set_category(self.categories.get(self.category).cloned().flatten().as_deref());
        filters.set_search(&self.search.value);
        filters
    }

    pub fn status_label(&self) -> &'static str {
        self.statuses
            .get(self.status)
            .copied()
            .flatten()
            .map(format_status)
            .unwrap_or("All Statuses")
    }

    pub fn priority_label(&self) -> String {
        match self.priorities.get(self.priority).copied().flatten() {
            Some(p) => format!("{} priority", format_priority(p)),
            None => "All Priorities".to_string(),
        }
    }

    pub fn category_label(&self) -> &str {
        self.categories
            .get(self.category)
            .and_then(|c| c.as_deref())
            .unwrap_or("All Categories")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::default_categories;
    use chrono::Utc;

    fn categories() -> Vec<Category> {
        default_categories(Utc::now())
    }

    #[test]
    fn starts_from_existing_filters() {
        let filters = TaskFilters {
            status: Some(Status::InProgress),
            priority: None,
            category: Some("health".into()),
            search: Some("run".into()),
        };
        let form = FilterForm::from_filters(&filters, &categories());
        assert_eq!(form.status_label(), "In Progress");
        assert_eq!(form.priority_label(), "All Priorities");
        assert_eq!(form.category_label(), "health");
        assert_eq!(form.to_filters(), filters);
    }

    #[test]
    fn selectors_cycle_through_all() {
        let mut form = FilterForm::from_filters(&TaskFilters::default(), &categories());
        form.next_field();
        form.handle_left_right(true);
        assert_eq!(form.to_filters().status, Some(Status::Pending));
        form.handle_left_right(false);
        assert_eq!(form.to_filters().status, None);
        form.next_field();
        form.handle_left_right(true);
        assert_eq!(form.to_filters().priority, Some(Priority::High));
        form.next_field();
        form.handle_left_right(false);
        assert_eq!(form.to_filters().category.as_deref(), Some("learning"));
    }

    #[test]
    fn typing_only_reaches_the_search_box() {
        let mut form = FilterForm::from_filters(&TaskFilters::default(), &categories());
        form.handle_char('m');
        form.next_field();
        form.handle_char('x');
        assert_eq!(form.to_filters().search.as_deref(), Some("m"));

        form.prev_field();
        form.handle_backspace();
        assert_eq!(form.to_filters().search, None);
    }

    #[test]
    fn reset_clears_everything() {
        let filters = TaskFilters {
            status: Some(Status::Completed),
            priority: Some(Priority::Low),
            category: Some("work".into()),
            search: Some("x".into()),
        };
        let mut form = FilterForm::from_filters(&filters, &categories());
        form.reset();
        assert_eq!(form.to_filters(), TaskFilters::default());
    }
}
