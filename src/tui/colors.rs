//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Palette for status, priority and toast styling

pub const PRIMARY: Color = Color::Rgb(124, 92, 255);
/// Completed tasks and the progress gauge
pub const SUCCESS: Color = Color::Rgb(34, 160, 90);
/// Pending tasks
pub const WARNING: Color = Color::Rgb(230, 160, 30);
/// Overdue dates and destructive toasts
pub const DESTRUCTIVE: Color = Color::Rgb(200, 40, 50);
pub const MUTED: Color = Color::DarkGray;

pub const PRIORITY_HIGH: Color = Color::Rgb(220, 70, 70);
pub const PRIORITY_MEDIUM: Color = Color::Rgb(230, 180, 40);
pub const PRIORITY_LOW: Color = Color::Rgb(80, 170, 110);
