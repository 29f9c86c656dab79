// SPDX-License-Identifier: MPL-2.0
//! Auth provider port and the in-process directory adapter.
//!
//! The [`AuthProvider`] trait is the only way the session store talks to an
//! identity backend. [`DirectoryAuthProvider`] answers from an in-memory
//! account table and issues opaque `<user-id>.<issued-unix-seconds>` tokens;
//! it performs no cryptography and is meant for demos and tests.

use super::error::AuthError;
use super::model::{Role, UserId, UserIdentity};
use super::SignInError;
use crate::config::DEFAULT_TOKEN_TTL_SECS;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// Credentials & tokens
// =============================================================================

/// Validated sign-in input.
///
/// ## Invariants
/// - `email` is trimmed and non-empty.
/// - `password` is non-empty; surrounding whitespace is kept as typed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Result<Self, SignInError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SignInError::MissingEmail);
        }
        if password.is_empty() {
            return Err(SignInError::MissingPassword);
        }
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque credential persisted between runs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Successful sign-in answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: SessionToken,
    pub identity: UserIdentity,
}

// =============================================================================
// Port
// =============================================================================

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchanges credentials for a token and the user's identity.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError>;

    /// Resolves a previously issued token back into an identity.
    async fn restore(&self, token: &SessionToken) -> Result<UserIdentity, AuthError>;
}

// =============================================================================
// DirectoryAuthProvider
// =============================================================================

#[derive(Debug, Clone)]
struct Account {
    identity: UserIdentity,
    password: String,
}

/// In-process account directory.
#[derive(Debug)]
pub struct DirectoryAuthProvider {
    /// Accounts keyed by lowercase email.
    accounts: HashMap<String, Account>,
    token_ttl: Duration,
    reachable: AtomicBool,
}

impl Default for DirectoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryAuthProvider {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            reachable: AtomicBool::new(true),
        }
    }

    /// Creates a directory with one account per role.
    #[must_use]
    pub fn demo() -> Self {
        Self::new()
            .with_account("u-admin", "admin@amap.local", "admin", Role::SuperAdmin, "Jean Dupont")
            .with_account("u-lilas", "lilas@amap.local", "lilas", Role::AmapAdmin, "Marie Martin")
            .with_account("u-member", "member@amap.local", "member", Role::Member, "Paul Durand")
            .with_account("u-baker", "baker@amap.local", "baker", Role::Baker, "Louis Fournier")
    }

    /// Adds an account. A later account with the same email replaces the
    /// earlier one.
    #[must_use]
    pub fn with_account(
        mut self,
        id: &str,
        email: &str,
        password: &str,
        role: Role,
        display_name: &str,
    ) -> Self {
        let identity = UserIdentity {
            id: UserId::new(id),
            email: email.to_string(),
            role,
            display_name: display_name.to_string(),
        };
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                identity,
                password: password.to_string(),
            },
        );
        self
    }

    /// Overrides the lifetime of issued tokens.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Simulates the provider going offline (`false`) or coming back.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Builds the token format understood by [`AuthProvider::restore`].
    #[must_use]
    pub fn issue_token(id: &UserId, issued_at: DateTime<Utc>) -> SessionToken {
        SessionToken::new(format!("{}.{}", id, issued_at.timestamp()))
    }

    fn ensure_reachable(&self) -> Result<(), AuthError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AuthError::NetworkFailure("directory unreachable".to_string()))
        }
    }

    fn find_by_id(&self, id: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|account| account.identity.id.as_str() == id)
    }
}

#[async_trait]
impl AuthProvider for DirectoryAuthProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError> {
        self.ensure_reachable()?;

        let account = self
            .accounts
            .get(&credentials.email().to_lowercase())
            .filter(|account| account.password == credentials.password())
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(AuthGrant {
            token: Self::issue_token(&account.identity.id, Utc::now()),
            identity: account.identity.clone(),
        })
    }

    async fn restore(&self, token: &SessionToken) -> Result<UserIdentity, AuthError> {
        self.ensure_reachable()?;

        let (id, issued) = token
            .as_str()
            .rsplit_once('.')
            .ok_or(AuthError::SessionExpired)?;
        let issued = issued
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or(AuthError::SessionExpired)?;

        if Utc::now() - issued > self.token_ttl {
            return Err(AuthError::SessionExpired);
        }

        self.find_by_id(id)
            .map(|account| account.identity.clone())
            .ok_or(AuthError::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> DirectoryAuthProvider {
        DirectoryAuthProvider::new().with_account("u-1", "a@b.com", "right", Role::Member, "Ada")
    }

    #[test]
    fn credentials_trim_email_but_not_password() {
        let creds = Credentials::new("  a@b.com ", " pw ").expect("valid");
        assert_eq!(creds.email(), "a@b.com");
        assert_eq!(creds.password(), " pw ");
    }

    #[test]
    fn credentials_reject_blank_fields() {
        assert_eq!(Credentials::new("   ", "pw"), Err(SignInError::MissingEmail));
        assert_eq!(Credentials::new("a@b.com", ""), Err(SignInError::MissingPassword));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = Credentials::new("a@b.com", "hunter2").expect("valid");
        assert!(!format!("{creds:?}").contains("hunter2"));
        let token = SessionToken::new("u-1.123");
        assert!(!format!("{token:?}").contains("u-1"));
    }

    #[tokio::test]
    async fn sign_in_with_matching_password_grants_token() {
        let provider = directory();
        let creds = Credentials::new("A@B.com", "right").unwrap();

        let grant = provider.sign_in(&creds).await.expect("grant");
        assert_eq!(grant.identity.email, "a@b.com");
        assert!(grant.token.as_str().starts_with("u-1."));
    }

    #[tokio::test]
    async fn sign_in_with_wrong_password_is_rejected() {
        let provider = directory();
        let creds = Credentials::new("a@b.com", "wrong").unwrap();
        assert_eq!(
            provider.sign_in(&creds).await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn restore_round_trips_issued_token() {
        let provider = directory();
        let creds = Credentials::new("a@b.com", "right").unwrap();
        let grant = provider.sign_in(&creds).await.unwrap();

        let identity = provider.restore(&grant.token).await.expect("restore");
        assert_eq!(identity, grant.identity);
    }

    #[tokio::test]
    async fn restore_rejects_expired_and_malformed_tokens() {
        let provider = directory().with_token_ttl(Duration::seconds(60));
        let old = DirectoryAuthProvider::issue_token(
            &UserId::new("u-1"),
            Utc::now() - Duration::seconds(120),
        );
        assert_eq!(provider.restore(&old).await, Err(AuthError::SessionExpired));
        assert_eq!(
            provider.restore(&SessionToken::new("garbage")).await,
            Err(AuthError::SessionExpired)
        );
        assert_eq!(
            provider.restore(&SessionToken::new("u-unknown.0")).await,
            Err(AuthError::SessionExpired)
        );
    }

    #[tokio::test]
    async fn unreachable_directory_reports_network_failure() {
        let provider = directory();
        provider.set_reachable(false);
        let creds = Credentials::new("a@b.com", "right").unwrap();

        assert!(matches!(
            provider.sign_in(&creds).await,
            Err(AuthError::NetworkFailure(_))
        ));
    }

    #[test]
    fn demo_directory_covers_every_role() {
        let provider = DirectoryAuthProvider::demo();
        let roles: Vec<Role> = provider
            .accounts
            .values()
            .map(|account| account.identity.role)
            .collect();
        for role in [Role::SuperAdmin, Role::AmapAdmin, Role::Member, Role::Baker] {
            assert!(roles.contains(&role), "missing {role}");
        }
    }
}
