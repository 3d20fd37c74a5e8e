//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the `TaskStore`, turns
//! key presses into store intents, drains store notifications into toasts
//! and renders the derived view. Each render pass reads the clock once and
//! derives the view from that single instant.

use std::io;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::cmd::{truncate, UiConfig};
use crate::dates::format_date;
use crate::fields::*;
use crate::notify::Severity;
use crate::store::TaskStore;
use crate::view::{is_overdue, EmptyState, ListStats, Summary};
use crate::tui::{
    colors::*,
    enums::AppState,
    filter_form::{FilterForm, CATEGORY_FIELD, PRIORITY_FIELD, SEARCH_FIELD, STATUS_FIELD},
    input::InputField,
    task_form::{
        TaskForm, CATEGORY_GLOBAL_ORDER, DESCRIPTION_GLOBAL_ORDER, DUE_GLOBAL_ORDER,
        PRIORITY_GLOBAL_ORDER, TITLE_GLOBAL_ORDER,
    },
    toast::Toasts,
    utils::{centered_rect, top_right_rect},
};

const TOAST_WIDTH: u16 = 46;
const TOAST_HEIGHT: u16 = 4;

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    store: TaskStore,
    table_state: TableState,
    visible_ids: Vec<String>,
    task_form: TaskForm,
    filter_form: FilterForm,
    search_active: bool,
    search_input: InputField,
    pending_delete: Option<String>,
    toasts: Toasts,
    status_message: String,
}

impl App {
    /// Create a new App around an existing store.
    pub fn new(store: TaskStore, config: UiConfig) -> Self {
        let task_form = TaskForm::new(store.categories());
        let filter_form = FilterForm::from_filters(store.filters(), store.categories());
        let mut app = App {
            state: AppState::TaskList,
            store,
            table_state: TableState::default(),
            visible_ids: Vec::new(),
            task_form,
            filter_form,
            search_active: false,
            search_input: InputField::new(),
            pending_delete: None,
            toasts: Toasts::new(config.toast_duration),
            status_message: String::new(),
        };
        app.refresh_visible(Utc::now());
        app
    }

    /// Recompute the visible task order, keeping the selection on the same task when possible.
    fn refresh_visible(&mut self, now: DateTime<Utc>) {
        let old_selected_id = self.selected_id().map(str::to_string);

        self.visible_ids = self
            .store
            .view(now)
            .tasks
            .iter()
            .map(|t| t.id.clone())
            .collect();

        let restored = old_selected_id
            .and_then(|old| self.visible_ids.iter().position(|id| *id == old));
        match restored {
            Some(idx) => self.table_state.select(Some(idx)),
            None if self.visible_ids.is_empty() => self.table_state.select(None),
            None => {
                let idx = self
                    .table_state
                    .selected()
                    .unwrap_or(0)
                    .min(self.visible_ids.len() - 1);
                self.table_state.select(Some(idx));
            }
        }
    }

    fn selected_id(&self) -> Option<&str> {
        self.table_state
            .selected()
            .and_then(|idx| self.visible_ids.get(idx))
            .map(String::as_str)
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Move any notifications the store emitted into the toast queue.
    fn drain_notifications(&mut self) {
        let now = Instant::now();
        for notification in self.store.take_notifications() {
            debug!(title = %notification.title, "toast");
            self.toasts.push(notification, now);
        }
    }

    fn apply_filter_form(&mut self) {
        self.store.set_filters(self.filter_form.to_filters());
    }

    fn apply_search(&mut self) {
        let mut filters = self.store.filters().clone();
        filters.set_search(&self.search_input.value);
        self.store.set_filters(filters);
    }

    fn select_prev(&mut self) {
        match self.table_state.selected() {
            Some(selected) if selected > 0 => self.table_state.select(Some(selected - 1)),
            None if !self.visible_ids.is_empty() => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    fn select_next(&mut self) {
        match self.table_state.selected() {
            Some(selected) if selected + 1 < self.visible_ids.len() => {
                self.table_state.select(Some(selected + 1))
            }
            None if !self.visible_ids.is_empty() => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    fn set_selected_status(&mut self, status: Status) {
        if let Some(id) = self.selected_id().map(str::to_string) {
            self.store.set_status(&id, status);
        }
    }

    /// Apply one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        self.status_message.clear();

        let should_quit = match self.state {
            AppState::TaskList => self.handle_task_list_input(key),
            AppState::AddTask => self.handle_form_input(key),
            AppState::Filters => self.handle_filters_input(key, modifiers),
            AppState::Help => {
                self.state = AppState::TaskList;
                false
            }
            AppState::Confirm => self.handle_confirm_input(key),
        };

        self.drain_notifications();
        self.refresh_visible(Utc::now());
        should_quit
    }

    fn handle_task_list_input(&mut self, key: KeyCode) -> bool {
        if self.search_active {
            self.handle_search_input(key);
            return false;
        }

        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.store.filters().has_active() {
                    self.store.clear_filters();
                    self.set_status_message("Filters cleared");
                } else {
                    return true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.task_form.reset();
                self.state = AppState::AddTask;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.selected_id().map(str::to_string) {
                    self.store.cycle_status(&id);
                }
            }
            KeyCode::Char('1') => self.set_selected_status(Status::Pending),
            KeyCode::Char('2') => self.set_selected_status(Status::InProgress),
            KeyCode::Char('3') => self.set_selected_status(Status::Completed),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id().map(str::to_string) {
                    self.pending_delete = Some(id);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('/') => {
                let current = self.store.filters().search.clone().unwrap_or_default();
                self.search_input = InputField::with_value(&current);
                self.search_input.active = true;
                self.search_active = true;
            }
            KeyCode::Char('f') => {
                self.filter_form =
                    FilterForm::from_filters(self.store.filters(), self.store.categories());
                self.state = AppState::Filters;
            }
            KeyCode::Char('c') => {
                if self.store.filters().has_active() {
                    self.store.clear_filters();
                    self.set_status_message("Filters cleared");
                }
            }
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.search_active = false;
                self.search_input.clear();
                self.apply_search();
            }
            KeyCode::Enter => {
                self.search_active = false;
                if self.search_input.value.is_empty() {
                    self.set_status_message("Search cleared");
                } else {
                    self.set_status_message(format!(
                        "Search applied: '{}' ({} tasks)",
                        self.search_input.value,
                        self.visible_ids.len()
                    ));
                }
            }
            KeyCode::Backspace => {
                self.search_input.handle_backspace();
                self.apply_search();
            }
            KeyCode::Left => self.search_input.move_cursor_left(),
            KeyCode::Right => self.search_input.move_cursor_right(),
            KeyCode::Char(c) => {
                self.search_input.handle_char(c);
                self.apply_search();
            }
            _ => {}
        }
    }

    fn handle_form_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => {
                let today = Utc::now().date_naive();
                match self.task_form.to_new_task(today) {
                    Some(data) => {
                        let due_text = self.task_form.due.value.trim().to_string();
                        if !due_text.is_empty() && data.due_date.is_none() {
                            debug!(input = %due_text, "unrecognised due date dropped");
                        }
                        self.store.create_task(data);
                        self.task_form.reset();
                        self.state = AppState::TaskList;
                    }
                    None => self.set_status_message("Title is required"),
                }
            }
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        false
    }

    fn handle_filters_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Esc | KeyCode::Enter => {
                self.state = AppState::TaskList;
                return false;
            }
            KeyCode::Tab | KeyCode::Down => self.filter_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.filter_form.prev_field(),
            KeyCode::Left => self.filter_form.handle_left_right(false),
            KeyCode::Right => self.filter_form.handle_left_right(true),
            KeyCode::Backspace => self.filter_form.handle_backspace(),
            KeyCode::Char('x') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.filter_form.reset();
                self.set_status_message("Filters cleared");
            }
            KeyCode::Char(c) => self.filter_form.handle_char(c),
            _ => {}
        }
        self.apply_filter_form();
        false
    }

    fn handle_confirm_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.pending_delete.take() {
                    self.store.delete_task(&id);
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_delete = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(false);
                }
                return Ok(self.handle_key(key.code, key.modifiers));
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect, summary: &Summary) {
        let mut spans = vec![Span::styled(
            "SMART TODO MANAGER",
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        )];
        if summary.total > 0 {
            spans.push(Span::raw("   Total Tasks: "));
            spans.push(Span::styled(
                summary.total.to_string(),
                Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw("  Completed: "));
            spans.push(Span::styled(
                summary.completed.to_string(),
                Style::default().fg(SUCCESS).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw("  Success Rate: "));
            spans.push(Span::styled(
                format!("{}%", summary.completion_rate),
                Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
            ));
        }
        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_filter_line(&self, f: &mut Frame, area: Rect) {
        let line = if self.search_active {
            Line::from(vec![
                Span::styled("Search: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(self.search_input.display_with_cursor()),
            ])
        } else {
            let chips = self.store.filters().describe();
            if chips.is_empty() {
                Line::from(Span::styled(
                    "No filters  ( / search, f filters )",
                    Style::default().fg(MUTED),
                ))
            } else {
                let mut spans = Vec::new();
                for chip in chips {
                    spans.push(Span::styled(
                        format!(" {} ", chip),
                        Style::default().fg(Color::Black).bg(Color::Gray),
                    ));
                    spans.push(Span::raw(" "));
                }
                spans.push(Span::styled("( c clears )", Style::default().fg(MUTED)));
                Line::from(spans)
            }
        };
        let block = Block::default().borders(Borders::ALL).title("Filters & Search");
        f.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_overview(&self, f: &mut Frame, area: Rect, stats: &ListStats) {
        let block = Block::default().borders(Borders::ALL).title("Task Overview");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let counts = Line::from(vec![
            Span::raw("Total "),
            Span::styled(stats.total.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   Completed "),
            Span::styled(stats.completed.to_string(), Style::default().fg(SUCCESS)),
            Span::raw("   In Progress "),
            Span::styled(stats.in_progress.to_string(), Style::default().fg(PRIMARY)),
            Span::raw("   Pending "),
            Span::styled(stats.pending.to_string(), Style::default().fg(WARNING)),
        ]);
        f.render_widget(Paragraph::new(counts), rows[0]);

        if stats.total > 0 {
            let rate = stats.completion_rate();
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(SUCCESS).bg(Color::Black))
                .percent(rate.min(100) as u16)
                .label(format!("Progress {}%", rate));
            f.render_widget(gauge, rows[1]);
        }
    }

    fn render_empty(&self, f: &mut Frame, area: Rect, empty: EmptyState) {
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                empty.headline(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(empty.hint(), Style::default().fg(MUTED))),
        ];
        if empty == EmptyState::NoTasks {
            text.extend([
                Line::from(""),
                Line::from("Ready to get organized? Press 'a' to create a task."),
                Line::from(""),
                Line::from("Create Tasks: add titles, descriptions, and due dates"),
                Line::from("Set Priorities: organize by high, medium, or low priority"),
                Line::from(
                    "Track Progress: move tasks through pending, in progress, and completed",
                ),
            ]);
        }
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Tasks"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the header, filters, overview and the derived task table.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect, now: DateTime<Utc>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(area);

        let summary = self.store.summary();
        self.render_header(f, chunks[0], &summary);
        if !self.store.is_empty() {
            self.render_filter_line(f, chunks[1]);
        }

        let view = self.store.view(now);
        if let Some(empty) = view.empty {
            let top = if self.store.is_empty() {
                chunks[1].y
            } else {
                chunks[2].y
            };
            let rest = Rect {
                y: top,
                height: area.bottom().saturating_sub(top),
                ..area
            };
            self.render_empty(f, rest, empty);
            return;
        }
        self.render_overview(f, chunks[2], &view.stats);

        let header = Row::new(["", "Title", "Priority", "Due", "Category", "Status"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(PRIMARY).fg(Color::White))
        .height(1);

        let rows: Vec<Row> = view
            .tasks
            .iter()
            .map(|task| {
                let overdue = is_overdue(task, now);
                let status_color = status_color(task.status);
                let due = match task.due_date {
                    Some(d) if overdue => format!("{} (late)", format_date(d)),
                    Some(d) => format_date(d),
                    None => "-".into(),
                };
                let due_style = if overdue {
                    Style::default().fg(DESTRUCTIVE).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(MUTED)
                };
                let title_style = if task.status == Status::Completed {
                    Style::default().fg(MUTED).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                let mut title = vec![Span::styled(task.title.clone(), title_style)];
                if let Some(desc) = &task.description {
                    title.push(Span::styled(
                        format!("  {}", truncate(desc, 48)),
                        Style::default().fg(MUTED),
                    ));
                }

                Row::new(vec![
                    Cell::from(status_icon(task.status)).style(Style::default().fg(status_color)),
                    Cell::from(Line::from(title)),
                    Cell::from(format_priority(task.priority))
                        .style(Style::default().fg(priority_color(task.priority))),
                    Cell::from(due).style(due_style),
                    Cell::from(task.category.clone()),
                    Cell::from(format_status(task.status)).style(Style::default().fg(status_color)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(2),  // Icon
            Constraint::Min(24),    // Title
            Constraint::Length(8),  // Priority
            Constraint::Length(20), // Due
            Constraint::Length(10), // Category
            Constraint::Length(12), // Status
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                view.tasks.len(),
                self.store.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[3], &mut self.table_state);
    }

    fn field_style(focused: bool) -> Style {
        if focused {
            Style::default().fg(PRIMARY)
        } else {
            Style::default()
        }
    }

    fn render_task_form(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 70, area);
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Create New Task")
            .border_style(Style::default().fg(PRIMARY));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(4), // Description
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Category
                Constraint::Length(3), // Due date
                Constraint::Min(1),    // Instructions
            ])
            .split(inner);

        let form = &self.task_form;
        let text_field = |field: &InputField, order: usize, title: &'static str| {
            let focused = form.current_field == order;
            let text = if focused {
                field.display_with_cursor()
            } else {
                field.value.clone()
            };
            Paragraph::new(text)
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(title)
                        .border_style(Self::field_style(focused)),
                )
        };
        let selector = |label: String, order: usize, title: &'static str| {
            Paragraph::new(format!("< {} >", label)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Self::field_style(form.current_field == order)),
            )
        };

        f.render_widget(text_field(&form.title, TITLE_GLOBAL_ORDER, "Task Title *"), chunks[0]);
        f.render_widget(
            text_field(&form.description, DESCRIPTION_GLOBAL_ORDER, "Description (Optional)"),
            chunks[1],
        );
        f.render_widget(
            selector(
                format!("{} priority", format_priority(form.selected_priority())),
                PRIORITY_GLOBAL_ORDER,
                "Priority",
            ),
            chunks[2],
        );
        f.render_widget(
            selector(form.selected_category().to_string(), CATEGORY_GLOBAL_ORDER, "Category"),
            chunks[3],
        );
        f.render_widget(
            text_field(
                &form.due,
                DUE_GLOBAL_ORDER,
                "Due Date (Optional: YYYY-MM-DD, tomorrow, in 3d, fri)",
            ),
            chunks[4],
        );

        let help = Paragraph::new(vec![
            Line::from("Tab/Up/Down: move   Left/Right: change selection"),
            Line::from("Enter: create task   Esc: cancel"),
        ])
        .style(Style::default().fg(MUTED));
        f.render_widget(help, chunks[5]);
    }

    fn render_filters(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(50, 60, area);
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Filters & Search")
            .border_style(Style::default().fg(PRIMARY));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        let form = &self.filter_form;
        let search_focused = form.current_field == SEARCH_FIELD;
        let search_text = if search_focused {
            form.search.display_with_cursor()
        } else {
            form.search.value.clone()
        };
        f.render_widget(
            Paragraph::new(search_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Search tasks...")
                    .border_style(Self::field_style(search_focused)),
            ),
            chunks[0],
        );

        let selectors = [
            (form.status_label().to_string(), STATUS_FIELD, "Status"),
            (form.priority_label(), PRIORITY_FIELD, "Priority"),
            (form.category_label().to_string(), CATEGORY_FIELD, "Category"),
        ];
        for (i, (label, field, title)) in selectors.into_iter().enumerate() {
            let widget = Paragraph::new(format!("< {} >", label)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Self::field_style(form.current_field == field)),
            );
            f.render_widget(widget, chunks[i + 1]);
        }

        let help = Paragraph::new(vec![
            Line::from("Tab/Up/Down: move   Left/Right: change"),
            Line::from("Ctrl+X: clear all   Enter/Esc: close"),
        ])
        .style(Style::default().fg(MUTED));
        f.render_widget(help, chunks[4]);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let keys = [
            ("a / n", "Create a new task"),
            ("Up/Down, k/j", "Move selection"),
            ("Space / Enter", "Cycle status: pending > in progress > completed"),
            ("1 / 2 / 3", "Set pending / in progress / completed"),
            ("d / Delete", "Delete the selected task"),
            ("/", "Search titles and descriptions"),
            ("f", "Open the filter panel"),
            ("c", "Clear all filters"),
            ("h / ?", "Show this help"),
            ("q / Esc", "Quit (Esc clears filters first)"),
        ];
        let mut text = vec![Line::from("")];
        for (key, what) in keys {
            text.push(Line::from(vec![
                Span::styled(
                    format!("{:>16}  ", key),
                    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
                ),
                Span::raw(what),
            ]));
        }
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "Press any key to return",
            Style::default().fg(MUTED),
        )));
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"));
        f.render_widget(paragraph, area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DESTRUCTIVE));

        let area = centered_rect(50, 25, area);
        f.render_widget(Clear, area);

        let title = self
            .pending_delete
            .as_deref()
            .and_then(|id| self.store.get(id))
            .map(|t| t.title.as_str())
            .unwrap_or("");
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Delete this task?",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("\"{}\"", title)),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_toasts(&self, f: &mut Frame, area: Rect) {
        let slot = top_right_rect(TOAST_WIDTH, TOAST_HEIGHT, area);
        for (i, toast) in self.toasts.iter().enumerate() {
            let y = slot.y + i as u16 * TOAST_HEIGHT;
            if y + slot.height > area.bottom() {
                break;
            }
            let rect = Rect { y, ..slot };
            let bg = match toast.notification.severity {
                Severity::Normal => Color::Rgb(30, 30, 40),
                Severity::Destructive => DESTRUCTIVE,
            };
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    toast.notification.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(toast.notification.description.clone()),
            ])
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().bg(bg).fg(Color::White))
            .wrap(Wrap { trim: true });
            f.render_widget(Clear, rect);
            f.render_widget(paragraph, rect);
        }
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.search_active {
            "Search: type to filter (Esc to clear, Enter to confirm)".to_string()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "Tasks: {}/{} | a add  space cycle  d delete  / search  f filters  h help  \
                     q quit",
                    self.visible_ids.len(),
                    self.store.len()
                ),
                AppState::AddTask => "Create New Task".to_string(),
                AppState::Filters => "Filters & Search".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(PRIMARY).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        self.render_at(f, Utc::now());
    }

    /// Draw one frame as of `now`.
    ///
    /// The row order the key handlers act on is rebuilt here from the same
    /// instant the table is drawn with, so the highlighted row is always the
    /// selected task.
    fn render_at(&mut self, f: &mut Frame, now: DateTime<Utc>) {
        self.refresh_visible(now);
        self.toasts.prune(Instant::now());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
            .split(f.area());

        match self.state {
            AppState::Help => self.render_help(f, chunks[0]),
            _ => self.render_task_list(f, chunks[0], now),
        }
        match self.state {
            AppState::AddTask => self.render_task_form(f, chunks[0]),
            AppState::Filters => self.render_filters(f, chunks[0]),
            AppState::Confirm => self.render_confirm(f, chunks[0]),
            AppState::TaskList | AppState::Help => {}
        }

        self.render_toasts(f, chunks[0]);
        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Pending => "○",
        Status::InProgress => "▶",
        Status::Completed => "✔",
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Pending => WARNING,
        Status::InProgress => PRIMARY,
        Status::Completed => SUCCESS,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => PRIORITY_HIGH,
        Priority::Medium => PRIORITY_MEDIUM,
        Priority::Low => PRIORITY_LOW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;

    fn app_with(titles: &[&str]) -> App {
        let mut store = TaskStore::new();
        for title in titles {
            store.create_task(NewTask::new(*title));
        }
        store.take_notifications();
        App::new(store, UiConfig::default())
    }

    fn press(app: &mut App, key: KeyCode) -> bool {
        app.handle_key(key, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn create_through_the_form() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, AppState::AddTask);
        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.tasks()[0].title, "Buy milk");
        assert_eq!(app.visible_ids.len(), 1);
        assert_eq!(app.table_state.selected(), Some(0));
        assert_eq!(app.toasts.len(), 1);
        assert!(app.task_form.title.value.is_empty());
    }

    #[test]
    fn blank_title_keeps_the_form_open() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::AddTask);
        assert_eq!(app.status_message, "Title is required");
        assert!(app.store.is_empty());
        assert!(app.toasts.is_empty());
    }

    #[test]
    fn escape_cancels_the_form() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "draft");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::TaskList);
        assert!(app.store.is_empty());
    }

    #[test]
    fn space_cycles_and_digits_set_status() {
        let mut app = app_with(&["Buy milk"]);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.store.tasks()[0].status, Status::InProgress);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.store.tasks()[0].status, Status::Completed);
        assert!(app.store.tasks()[0].completed_at.is_some());
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.store.tasks()[0].status, Status::Pending);
        assert_eq!(app.toasts.len(), 3);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app_with(&["keep", "drop"]);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.len(), 2);

        let selected = app.selected_id().unwrap().to_string();
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.store.len(), 1);
        assert!(app.store.get(&selected).is_none());
        let toast = app.toasts.iter().next().unwrap();
        assert_eq!(toast.notification.severity, Severity::Destructive);
    }

    #[test]
    fn search_filters_live_and_escape_clears() {
        let mut app = app_with(&["Buy milk", "Walk dog"]);
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "MILK");
        assert_eq!(app.store.filters().search.as_deref(), Some("MILK"));
        assert_eq!(app.visible_ids.len(), 1);

        press(&mut app, KeyCode::Enter);
        assert!(!app.search_active);
        assert_eq!(app.visible_ids.len(), 1);

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.store.filters().search, None);
        assert_eq!(app.visible_ids.len(), 2);
    }

    #[test]
    fn filter_panel_applies_changes_immediately() {
        let mut app = app_with(&["a", "b"]);
        let first = app.store.tasks()[0].id.clone();
        app.store.set_status(&first, Status::Completed);

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.state, AppState::Filters);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.store.filters().status, Some(Status::Completed));
        assert_eq!(app.visible_ids, vec![first]);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state, AppState::TaskList);
        assert!(app.store.filters().has_active());

        press(&mut app, KeyCode::Char('c'));
        assert!(!app.store.filters().has_active());
        assert_eq!(app.visible_ids.len(), 2);
    }

    #[test]
    fn escape_clears_filters_before_quitting() {
        let mut app = app_with(&["a"]);
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "zzz");
        press(&mut app, KeyCode::Enter);
        assert!(app.visible_ids.is_empty());

        assert!(!press(&mut app, KeyCode::Esc));
        assert_eq!(app.status_message, "Filters cleared");
        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn selection_follows_rows_that_become_overdue() {
        use chrono::Duration as ChronoDuration;
        use ratatui::backend::TestBackend;

        let t0 = Utc::now();
        let mut store = TaskStore::new();
        let soon = store
            .create_task_at(
                NewTask::new("Soon due")
                    .priority(Priority::Low)
                    .due(t0 + ChronoDuration::seconds(2)),
                t0,
            )
            .unwrap()
            .id
            .clone();
        let urgent = store
            .create_task_at(NewTask::new("Urgent").priority(Priority::High), t0)
            .unwrap()
            .id
            .clone();
        store.take_notifications();

        let mut app = App::new(store, UiConfig::default());
        app.refresh_visible(t0);
        assert_eq!(app.visible_ids, vec![urgent.clone(), soon.clone()]);
        assert_eq!(app.selected_id(), Some(urgent.as_str()));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let later = t0 + ChronoDuration::seconds(5);
        terminal.draw(|f| app.render_at(f, later)).unwrap();

        assert_eq!(app.visible_ids, vec![soon.clone(), urgent.clone()]);
        assert_eq!(app.table_state.selected(), Some(1));
        assert_eq!(app.selected_id(), Some(urgent.as_str()));

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.store.get(&urgent).unwrap().status, Status::Completed);
        assert_eq!(app.store.get(&soon).unwrap().status, Status::Pending);
    }

    #[test]
    fn quit_keys() {
        let mut app = app_with(&[]);
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn selection_moves_within_bounds() {
        let mut app = app_with(&["a", "b", "c"]);
        assert_eq!(app.table_state.selected(), Some(0));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.table_state.selected(), Some(0));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.table_state.selected(), Some(2));
    }
}
