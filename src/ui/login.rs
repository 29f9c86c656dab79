// SPDX-License-Identifier: MPL-2.0
//! Sign-in form.
//!
//! Blank fields are flagged locally with `validation.required` and never
//! reach the session store. A rejected attempt is reported through the
//! notifier with the error's translation key; a successful one sends the
//! user to the dashboard.

use crate::routing::Route;
use crate::session::{SessionStore, SignInError, UserIdentity};
use crate::ui::notifications::{Notification, Notify};

const REQUIRED_KEY: &str = "validation.required";

/// Per-field validation messages (translation keys).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

/// Result of [`LoginForm::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A required field is blank; see [`LoginForm::errors`].
    Invalid,
    /// A submission is already in flight; nothing was sent.
    Busy,
    Failed(SignInError),
    SignedIn {
        user: UserIdentity,
        redirect: Route,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    errors: FieldErrors,
    submitting: bool,
}

impl LoginForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a form pre-filled with credentials.
    #[must_use]
    pub fn with_credentials(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Re-checks required fields. Returns whether the form may be submitted.
    pub fn validate(&mut self) -> bool {
        self.errors = FieldErrors {
            email: self.email.trim().is_empty().then_some(REQUIRED_KEY),
            password: self.password.is_empty().then_some(REQUIRED_KEY),
        };
        self.errors.is_empty()
    }

    /// Submits the form to the session store.
    pub async fn submit(&mut self, session: &SessionStore, notifier: &mut impl Notify) -> LoginOutcome {
        if self.submitting {
            return LoginOutcome::Busy;
        }
        if !self.validate() {
            return LoginOutcome::Invalid;
        }

        self.submitting = true;
        let result = session.sign_in(&self.email, &self.password).await;
        self.submitting = false;

        match result {
            Ok(user) => {
                self.password.clear();
                LoginOutcome::SignedIn {
                    user,
                    redirect: Route::Dashboard,
                }
            }
            Err(SignInError::InProgress) => LoginOutcome::Busy,
            Err(SignInError::AlreadySignedIn) => {
                self.password.clear();
                LoginOutcome::Failed(SignInError::AlreadySignedIn)
            }
            Err(error) if error.is_validation() => {
                self.validate();
                LoginOutcome::Invalid
            }
            Err(error) => {
                let notification = match error {
                    SignInError::Superseded => Notification::info(error.i18n_key()),
                    _ => Notification::error(error.i18n_key()),
                };
                notifier.notify(notification);
                LoginOutcome::Failed(error)
            }
        }
    }
}
