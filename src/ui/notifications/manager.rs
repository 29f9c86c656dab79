// SPDX-License-Identifier: MPL-2.0
//! Notification lifecycle management.
//!
//! The `Manager` handles queuing, display timing, and dismissal of notifications.
//! It limits the number of visible toasts and expires timed ones on `tick`.

use super::notification::{Notification, NotificationId, Severity};
use super::toast::Toast;
use super::Notify;
use crate::i18n::LocaleManager;
use std::collections::VecDeque;
use std::time::Instant;

/// Maximum number of notifications visible at once.
const MAX_VISIBLE: usize = 3;

/// Prefix of keys reporting a failed sign-in.
const AUTH_ERROR_PREFIX: &str = "auth.";

/// Messages for notification state changes.
#[derive(Debug, Clone)]
pub enum Message {
    Dismiss(NotificationId),
    /// Periodic check of auto-dismiss timers.
    Tick,
}

/// Manages the notification queue and visible notifications.
#[derive(Debug, Default)]
pub struct Manager {
    /// Currently visible notifications (newest first).
    visible: VecDeque<Notification>,
    /// Waiting for a free slot, oldest first.
    queue: VecDeque<Notification>,
}

impl Manager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a notification, or queues it while `MAX_VISIBLE` are showing.
    ///
    /// Warnings and errors are also logged.
    pub fn push(&mut self, notification: Notification) {
        match notification.severity() {
            Severity::Warning => {
                tracing::warn!(key = notification.message_key(), "warning notification");
            }
            Severity::Error => {
                tracing::error!(key = notification.message_key(), "error notification");
            }
            Severity::Success | Severity::Info => {}
        }

        if self.visible.len() < MAX_VISIBLE {
            self.visible.push_front(notification);
        } else {
            self.queue.push_back(notification);
        }
    }

    /// Dismisses a notification by its ID.
    ///
    /// Returns `true` if the notification was found and removed.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        if let Some(pos) = self.visible.iter().position(|n| n.id() == id) {
            self.visible.remove(pos);
            self.promote_from_queue();
            return true;
        }

        if let Some(pos) = self.queue.iter().position(|n| n.id() == id) {
            self.queue.remove(pos);
            return true;
        }

        false
    }

    /// Dismisses visible notifications whose display time is over.
    pub fn tick(&mut self) {
        self.expire(Instant::now());
    }

    /// Like [`Self::tick`] against an explicit clock reading.
    pub fn expire(&mut self, now: Instant) {
        let to_dismiss: Vec<NotificationId> = self
            .visible
            .iter()
            .filter(|n| n.is_expired_at(now))
            .map(Notification::id)
            .collect();

        for id in to_dismiss {
            self.dismiss(id);
        }
    }

    pub fn handle_message(&mut self, message: &Message) {
        match message {
            Message::Dismiss(id) => {
                self.dismiss(*id);
            }
            Message::Tick => {
                self.tick();
            }
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.visible.iter()
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn has_notifications(&self) -> bool {
        !self.visible.is_empty() || !self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.visible.clear();
        self.queue.clear();
    }

    /// Removes sign-in failure notifications.
    ///
    /// Called after a successful sign-in so earlier failures do not linger.
    pub fn clear_auth_errors(&mut self) {
        let is_stale = |n: &Notification| {
            n.severity() == Severity::Error && n.message_key().starts_with(AUTH_ERROR_PREFIX)
        };
        let visible_before = self.visible.len();
        self.visible.retain(|n| !is_stale(n));
        self.queue.retain(|n| !is_stale(n));

        if self.visible.len() < visible_before {
            self.promote_from_queue();
        }
    }

    /// Resolves visible notifications in the active locale.
    #[must_use]
    pub fn render(&self, locale: &LocaleManager) -> Vec<Toast> {
        self.visible
            .iter()
            .map(|notification| Toast::render(notification, locale))
            .collect()
    }

    fn promote_from_queue(&mut self) {
        while self.visible.len() < MAX_VISIBLE {
            if let Some(notification) = self.queue.pop_front() {
                // Queued notifications are newer than every visible one.
                self.visible.push_front(notification);
            } else {
                break;
            }
        }
    }
}

impl Notify for Manager {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn new_manager_is_empty() {
        let manager = Manager::new();
        assert_eq!(manager.visible_count(), 0);
        assert_eq!(manager.queued_count(), 0);
        assert!(!manager.has_notifications());
    }

    #[test]
    fn push_queues_when_visible_is_full() {
        let mut manager = Manager::new();

        for i in 0..MAX_VISIBLE {
            manager.push(Notification::success(format!("test-{i}")));
        }
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 0);

        manager.push(Notification::success("queued"));
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 1);
    }

    #[test]
    fn dismiss_promotes_from_queue() {
        let mut manager = Manager::new();
        let first = Notification::success("visible-0");
        let first_id = first.id();
        manager.push(first);
        for i in 1..MAX_VISIBLE {
            manager.push(Notification::success(format!("visible-{i}")));
        }
        manager.push(Notification::success("queued"));

        assert!(manager.dismiss(first_id));

        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 0);
        assert!(manager.visible().any(|n| n.message_key() == "queued"));
    }

    #[test]
    fn promoted_notifications_keep_newest_first_order() {
        let mut manager = Manager::new();
        let keys = ["first", "second", "third", "fourth", "fifth"];
        let mut ids = Vec::new();
        for key in keys {
            let notification = Notification::info(key);
            ids.push(notification.id());
            manager.push(notification);
        }

        assert!(manager.dismiss(ids[1]));
        assert!(manager.dismiss(ids[0]));

        let order: Vec<&str> = manager.visible().map(Notification::message_key).collect();
        assert_eq!(order, vec!["fifth", "fourth", "third"]);
        assert_eq!(manager.queued_count(), 0);
    }

    #[test]
    fn dismiss_nonexistent_returns_false() {
        let mut manager = Manager::new();
        let fake_id = Notification::success("temp").id();

        assert!(!manager.dismiss(fake_id));
    }

    #[test]
    fn expire_keeps_errors_until_dismissed() {
        let mut manager = Manager::new();
        let error = Notification::error("auth.loginError");
        let error_id = error.id();
        let success = Notification::success("language.changed");
        let later = success.created_at() + Duration::from_secs(10);
        manager.push(error);
        manager.push(success);

        manager.expire(later);
        assert_eq!(manager.visible_count(), 1);

        manager.handle_message(&Message::Dismiss(error_id));
        assert_eq!(manager.visible_count(), 0);
    }

    #[test]
    fn clear_auth_errors_keeps_other_notifications() {
        let mut manager = Manager::new();
        manager.push(Notification::error("auth.loginError"));
        manager.push(Notification::error("auth.networkError"));
        manager.push(Notification::warning("notifications.configLoadError"));
        manager.push(Notification::success("language.changed"));

        assert_eq!(manager.visible_count(), 3);
        assert_eq!(manager.queued_count(), 1);

        manager.clear_auth_errors();

        assert_eq!(manager.visible_count(), 2);
        assert_eq!(manager.queued_count(), 0);
        assert!(manager
            .visible()
            .all(|n| !n.message_key().starts_with(AUTH_ERROR_PREFIX)));
    }

    #[test]
    fn clear_removes_all() {
        let mut manager = Manager::new();
        for i in 0..5 {
            manager.push(Notification::success(format!("test-{i}")));
        }

        manager.clear();
        assert!(!manager.has_notifications());
    }
}
