// SPDX-License-Identifier: MPL-2.0
//! Rendered form of a notification.

use super::notification::{Notification, NotificationId, Severity};
use crate::i18n::LocaleManager;
use std::fmt;

/// A notification resolved to text in the active locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: NotificationId,
    pub severity: Severity,
    pub text: String,
}

impl Toast {
    #[must_use]
    pub fn render(notification: &Notification, locale: &LocaleManager) -> Self {
        let args: Vec<(&str, &str)> = notification
            .message_args()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        Self {
            id: notification.id(),
            severity: notification.severity(),
            text: locale.translate_with(notification.message_key(), &args),
        }
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.text)
    }
}
