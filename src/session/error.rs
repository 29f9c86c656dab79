// SPDX-License-Identifier: MPL-2.0
use std::fmt;

/// Failures reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The provider rejected the email/password pair.
    InvalidCredentials,

    /// The provider could not be reached (or did not answer in time).
    NetworkFailure(String),

    /// A persisted token was rejected during restore.
    SessionExpired,
}

impl AuthError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "auth.loginError",
            AuthError::NetworkFailure(_) => "auth.networkError",
            AuthError::SessionExpired => "auth.sessionExpired",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::NetworkFailure(msg) => write!(f, "Auth provider unreachable: {}", msg),
            AuthError::SessionExpired => write!(f, "Session expired"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Result of a rejected [`super::SessionStore::sign_in`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInError {
    /// Email was missing or blank once trimmed. The provider was not called.
    MissingEmail,

    /// Password was empty. The provider was not called.
    MissingPassword,

    /// Another sign-in (or the boot restore) is still in flight.
    InProgress,

    /// A user is already signed in; sign out first.
    AlreadySignedIn,

    /// A sign-out happened while this attempt was in flight; its result was
    /// discarded.
    Superseded,

    /// The provider rejected the attempt; the session is now in `error`.
    Rejected(AuthError),
}

impl SignInError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            SignInError::MissingEmail | SignInError::MissingPassword => "validation.required",
            SignInError::InProgress => "auth.inProgress",
            SignInError::AlreadySignedIn => "auth.alreadySignedIn",
            SignInError::Superseded => "auth.superseded",
            SignInError::Rejected(err) => err.i18n_key(),
        }
    }

    /// Returns true for local validation failures that never reached the
    /// provider and left the session untouched.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, SignInError::MissingEmail | SignInError::MissingPassword)
    }
}

impl fmt::Display for SignInError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInError::MissingEmail => write!(f, "Email must not be empty"),
            SignInError::MissingPassword => write!(f, "Password must not be empty"),
            SignInError::InProgress => write!(f, "A sign-in attempt is already in progress"),
            SignInError::AlreadySignedIn => write!(f, "A user is already signed in"),
            SignInError::Superseded => write!(f, "Sign-in attempt was superseded"),
            SignInError::Rejected(err) => write!(f, "Sign-in rejected: {}", err),
        }
    }
}

impl std::error::Error for SignInError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignInError::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AuthError> for SignInError {
    fn from(err: AuthError) -> Self {
        SignInError::Rejected(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_i18n_keys() {
        assert_eq!(AuthError::InvalidCredentials.i18n_key(), "auth.loginError");
        assert_eq!(
            AuthError::NetworkFailure("timeout".into()).i18n_key(),
            "auth.networkError"
        );
        assert_eq!(AuthError::SessionExpired.i18n_key(), "auth.sessionExpired");
    }

    #[test]
    fn rejected_sign_in_uses_provider_key() {
        let err = SignInError::from(AuthError::InvalidCredentials);
        assert_eq!(err.i18n_key(), "auth.loginError");
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_errors_share_required_key() {
        assert!(SignInError::MissingEmail.is_validation());
        assert!(SignInError::MissingPassword.is_validation());
        assert_eq!(SignInError::MissingEmail.i18n_key(), "validation.required");
    }

    #[test]
    fn network_failure_display_includes_detail() {
        let err = AuthError::NetworkFailure("connection refused".into());
        assert!(format!("{}", err).contains("connection refused"));
    }
}
