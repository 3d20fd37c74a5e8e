//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` structure used to create tasks in the
//! TUI, including field ordering, selector cycling and conversion of the
//! entered values into a `NewTask`.

use chrono::NaiveDate;

use crate::{
    dates::parse_due_instant,
    fields::Priority,
    task::{Category, NewTask, DEFAULT_CATEGORY},
    tui::input::InputField,
};

/// Global order constants for the form fields.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;
pub const PRIORITY_GLOBAL_ORDER: usize = 2;
pub const CATEGORY_GLOBAL_ORDER: usize = 3;
pub const DUE_GLOBAL_ORDER: usize = 4;

const FIELD_COUNT: usize = 5;

/// Form for entering a new task.
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub priority: usize,
    pub category: usize,
    pub current_field: usize,
    pub priorities: Vec<Priority>,
    pub categories: Vec<String>,
}

impl TaskForm {
    /// Create an empty form offering the given categories.
    pub fn new(categories: &[Category]) -> Self {
        let mut names: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
        if names.is_empty() {
            names.push(DEFAULT_CATEGORY.to_string());
        }
        let category = names.iter().position(|n| n == DEFAULT_CATEGORY).unwrap_or(0);
        let priorities = Priority::ALL.to_vec();
        let priority = priorities
            .iter()
            .position(|&p| p == Priority::default())
            .unwrap_or(0);

        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            priority,
            category,
            current_field: TITLE_GLOBAL_ORDER,
            priorities,
            categories: names,
        };
        form.update_active_field();
        form
    }

    /// Reset every field to its default, keeping the category list.
    pub fn reset(&mut self) {
        let categories = std::mem::take(&mut self.categories);
        let mut form = TaskForm {
            categories,
            ..TaskForm::new(&[])
        };
        form.category = form
            .categories
            .iter()
            .position(|n| n == DEFAULT_CATEGORY)
            .unwrap_or(0);
        *self = form;
    }

    fn text_field_mut(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_GLOBAL_ORDER => Some(&mut self.title),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            DUE_GLOBAL_ORDER => Some(&mut self.due),
            _ => None,
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELD_COUNT - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_GLOBAL_ORDER;
        self.description.active = self.current_field == DESCRIPTION_GLOBAL_ORDER;
        self.due.active = self.current_field == DUE_GLOBAL_ORDER;
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.text_field_mut() {
            field.handle_char(c);
        }
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.text_field_mut() {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.text_field_mut() {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            PRIORITY_GLOBAL_ORDER => {
                self.priority = cycle(self.priority, self.priorities.len(), right);
            }
            CATEGORY_GLOBAL_ORDER => {
                self.category = cycle(self.category, self.categories.len(), right);
            }
            _ => {
                if let Some(field) = self.text_field_mut() {
                    if right {
                        field.move_cursor_right()
                    } else {
                        field.move_cursor_left()
                    }
                }
            }
        }
    }

    pub fn selected_priority(&self) -> Priority {
        self.priorities.get(self.priority).copied().unwrap_or_default()
    }

    pub fn selected_category(&self) -> &str {
        self.categories
            .get(self.category)
            .map(String::as_str)
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Build the submission, or `None` when the title is blank.
    ///
    /// An unparseable due date is dropped rather than rejected.
    pub fn to_new_task(&self, today: NaiveDate) -> Option<NewTask> {
        let title = self.title.value.trim();
        if title.is_empty() {
            return None;
        }
        let mut data = NewTask::new(title)
            .priority(self.selected_priority())
            .category(self.selected_category());
        let description = self.description.value.trim();
        if !description.is_empty() {
            data = data.description(description);
        }
        data.due_date = parse_due_instant(&self.due.value, today);
        Some(data)
    }
}

/// Step a selector index forwards or backwards with wrap-around.
pub fn cycle(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (index + 1) % len
    } else if index == 0 {
        len - 1
    } else {
        index - 1
    }
}
