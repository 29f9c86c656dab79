// SPDX-License-Identifier: MPL-2.0
//! Toast notification system for user feedback.
//!
//! Notifications inform users about outcomes (sign-in failure, language
//! change, degraded persistence) without blocking interaction. They are
//! fire-and-forget: nothing in the session or locale state depends on them.
//!
//! # Components
//!
//! - [`notification`] - Core `Notification` struct with severity levels
//! - [`manager`] - `Manager` for queuing and lifecycle management
//! - [`toast`] - `Toast`, a notification resolved to localized text
//!
//! # Usage
//!
//! ```
//! use amap_console::ui::notifications::{Manager, Notification, Notify};
//!
//! let mut manager = Manager::new();
//! manager.notify(Notification::success("language.changed"));
//! assert_eq!(manager.visible_count(), 1);
//! ```
//!
//! # Design Considerations
//!
//! - Toast duration: 3s for success/info, 5s for warnings, manual dismiss for errors
//! - Max visible toasts: 3 (others are queued)

mod manager;
mod notification;
mod toast;

pub use manager::{Manager, Message as NotificationMessage};
pub use notification::{Notification, NotificationId, Severity};
pub use toast::Toast;

/// Sink for user-facing notifications.
pub trait Notify {
    fn notify(&mut self, notification: Notification);
}
