//! Transient toast messages built from store notifications.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::notify::Notification;

/// Most toasts shown at once; older ones are dropped first.
pub const TOAST_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

/// Newest-first queue of toasts that expire after a fixed duration.
#[derive(Debug)]
pub struct Toasts {
    items: VecDeque<Toast>,
    duration: Duration,
}

impl Toasts {
    pub fn new(duration: Duration) -> Self {
        Toasts {
            items: VecDeque::new(),
            duration,
        }
    }

    pub fn push(&mut self, notification: Notification, now: Instant) {
        self.items.push_front(Toast {
            notification,
            shown_at: now,
        });
        self.items.truncate(TOAST_LIMIT);
    }

    /// Drop toasts that have been visible for longer than the configured duration.
    pub fn prune(&mut self, now: Instant) {
        let duration = self.duration;
        self.items
            .retain(|t| now.saturating_duration_since(t.shown_at) < duration);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
