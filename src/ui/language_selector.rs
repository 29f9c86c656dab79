// SPDX-License-Identifier: MPL-2.0
//! Language selector: current-language badge and option list.
//!
//! Delegates the switch to [`LocaleManager::set_locale`] and confirms a
//! successful change with a toast.

use crate::i18n::LocaleManager;
use crate::ui::notifications::{Notification, Notify};
use unic_langid::LanguageIdentifier;

/// One selectable language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    pub locale: LanguageIdentifier,
    /// Translated name, from `language.<tag>`.
    pub label: String,
    pub is_current: bool,
}

/// Messages emitted by the selector.
#[derive(Debug, Clone)]
pub enum Message {
    Select(LanguageIdentifier),
}

/// Events propagated to the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    None,
    Changed(LanguageIdentifier),
}

/// Short uppercase badge for the active locale, e.g. `FR`.
#[must_use]
pub fn badge(locale: &LanguageIdentifier) -> String {
    locale.language.as_str().to_ascii_uppercase()
}

/// Available languages in display order.
#[must_use]
pub fn options(locales: &LocaleManager) -> Vec<LanguageOption> {
    let active = locales.active_locale();
    locales
        .available_locales()
        .iter()
        .map(|locale| LanguageOption {
            locale: locale.clone(),
            label: locales.translate(&format!("language.{locale}")),
            is_current: *locale == active,
        })
        .collect()
}

/// Process a selector message.
///
/// Selecting the active language or an unavailable one changes nothing
/// and shows nothing.
pub fn update(message: Message, locales: &LocaleManager, notifier: &mut impl Notify) -> Event {
    match message {
        Message::Select(locale) => {
            if locales.active_locale() == locale {
                return Event::None;
            }
            match locales.set_locale(&locale) {
                Ok(()) => {
                    notifier.notify(Notification::success("language.changed"));
                    Event::Changed(locale)
                }
                Err(_) => Event::None,
            }
        }
    }
}
