// SPDX-License-Identifier: GPL-3.0-only

//! Transient notifications
//!
//! The capture flow reports every outcome through a [`NotificationSink`]
//! handed to it at construction. [`ToastQueue`] keeps the notifications a
//! UI would show as toasts and expires them after their duration;
//! [`LogSink`] writes them to the log.

use crate::constants::DEFAULT_TOAST_DURATION;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{error, info};
use uuid::Uuid;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A single user-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Overrides the sink's default display time
    pub duration: Option<Duration>,
}

impl Notification {
    pub fn new(severity: Severity, (title, description): (&str, &str)) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            severity,
            duration: None,
        }
    }

    pub fn success(text: (&str, &str)) -> Self {
        Self::new(Severity::Success, text)
    }

    pub fn error(text: (&str, &str)) -> Self {
        Self::new(Severity::Error, text)
    }

    pub fn info(text: (&str, &str)) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Receives notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// A notification on screen
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub notification: Notification,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.duration
    }
}

/// Toast stack with automatic dismissal
#[derive(Debug)]
pub struct ToastQueue {
    default_duration: Duration,
    toasts: Mutex<Vec<Toast>>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl ToastQueue {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            toasts: Mutex::new(Vec::new()),
        }
    }

    /// Add a notification and return its id
    pub fn push(&self, notification: Notification) -> Uuid {
        self.push_at(notification, Instant::now())
    }

    fn push_at(&self, notification: Notification, now: Instant) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            duration: notification.duration.unwrap_or(self.default_duration),
            notification,
            created_at: now,
        };
        let id = toast.id;
        let mut toasts = self.lock();
        toasts.retain(|queued| !queued.is_expired_at(now));
        toasts.push(toast);
        id
    }

    /// Dismiss a toast manually; false if it was already gone
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }

    /// Toasts still visible now, oldest first
    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }

    /// Toasts visible at `now`; expired ones are dropped
    pub fn active_at(&self, now: Instant) -> Vec<Toast> {
        let mut toasts = self.lock();
        toasts.retain(|toast| !toast.is_expired_at(now));
        toasts.clone()
    }

    /// Remove everything and return what was queued
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSink for ToastQueue {
    fn notify(&self, notification: Notification) {
        self.push(notification);
    }
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => error!(
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
            severity => info!(
                %severity,
                title = %notification.title,
                description = %notification.description,
                "Notification"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_uses_default_duration() {
        let queue = ToastQueue::default();
        queue.notify(Notification::info(("Camera ready", "Go")));

        let active = queue.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].duration, Duration::from_millis(4200));
    }

    #[test]
    fn test_toasts_expire_after_duration() {
        let queue = ToastQueue::new(Duration::from_millis(100));
        let start = Instant::now();
        queue.push_at(Notification::success(("A", "a")), start);
        queue.push_at(
            Notification::error(("B", "b")).with_duration(Duration::from_secs(10)),
            start,
        );

        assert_eq!(queue.active_at(start + Duration::from_millis(50)).len(), 2);

        let remaining = queue.active_at(start + Duration::from_millis(100));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].notification.title, "B");
    }

    #[test]
    fn test_push_drops_expired_toasts() {
        let queue = ToastQueue::new(Duration::from_millis(100));
        let start = Instant::now();
        for _ in 0..50 {
            queue.push_at(Notification::info(("A", "a")), start);
        }

        queue.push_at(Notification::info(("B", "b")), start + Duration::from_secs(1));

        let queued = queue.drain();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].notification.title, "B");
    }

    #[test]
    fn test_manual_dismiss() {
        let queue = ToastQueue::default();
        let id = queue.push(Notification::info(("A", "a")));

        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
        assert!(queue.active().is_empty());
    }
}
