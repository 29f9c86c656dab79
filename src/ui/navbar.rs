// SPDX-License-Identifier: MPL-2.0
//! Navigation bar shown above the protected pages.
//!
//! Shows who is signed in, the language badge and the logout action.

use crate::i18n::LocaleManager;
use crate::routing::Route;
use crate::session::SessionStore;
use crate::ui::language_selector;

/// Data needed to render the navbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Signed-in user's email, absent while signed out.
    pub user_email: Option<String>,
    /// Translated role of the signed-in user.
    pub user_role: Option<String>,
    pub logout_label: String,
    pub language_badge: String,
    pub language_label: String,
}

/// Messages emitted by the navbar.
#[derive(Debug, Clone)]
pub enum Message {
    Logout,
}

/// Events propagated to the parent application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Navigate(Route),
}

#[must_use]
pub fn view_model(session: &SessionStore, locales: &LocaleManager) -> ViewModel {
    let user = session.user();
    ViewModel {
        user_email: user.as_ref().map(|user| user.email.clone()),
        user_role: user.as_ref().map(|user| locales.translate(user.role.i18n_key())),
        logout_label: locales.translate("common.logout"),
        language_badge: language_selector::badge(&locales.active_locale()),
        language_label: locales.translate("language.select"),
    }
}

/// Process a navbar message and return the corresponding event.
pub fn update(message: Message, session: &SessionStore) -> Event {
    match message {
        Message::Logout => {
            session.sign_out();
            Event::Navigate(Route::Login)
        }
    }
}
