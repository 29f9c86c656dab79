// SPDX-License-Identifier: MPL-2.0
//! Client session state and its transitions.
//!
//! [`SessionStore`] owns the process-wide [`Session`] and is the only code
//! allowed to change it. Transitions:
//!
//! ```text
//! unauthenticated --sign_in--> authenticating --ok--> authenticated
//!                              authenticating --err-> error
//! error           --sign_in--> authenticating
//! authenticated   --sign_out-> unauthenticated
//! error           --sign_out-> unauthenticated
//! ```
//!
//! Every transition is a whole-value replacement inside a
//! [`StateCell`](crate::state::StateCell), so observers never see a status
//! without its matching identity.
//!
//! # Superseding
//!
//! Each accepted attempt (sign-in or boot restore) takes a generation
//! number. `sign_out` bumps the generation; an attempt whose generation is
//! no longer current when its provider call returns is discarded.

pub mod error;
pub mod model;
pub mod provider;

pub use error::{AuthError, SignInError};
pub use model::{Role, Session, SessionStatus, UserId, UserIdentity};
pub use provider::{AuthGrant, AuthProvider, Credentials, DirectoryAuthProvider, SessionToken};

use crate::config::SessionConfig;
use crate::state::{StateCell, SubscriptionId};
use crate::storage::{keys, KeyValueStore};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, OnceCell};

pub struct SessionStore {
    state: StateCell<Session>,
    provider: Arc<dyn AuthProvider>,
    storage: Arc<dyn KeyValueStore>,
    restore_timeout: Duration,
    generation: AtomicU64,
    /// Set while the `Authenticating` placeholder from construction has not
    /// been settled by a restore or a sign-out.
    restore_pending: AtomicBool,
    initialized: OnceCell<()>,
}

impl SessionStore {
    /// Creates the store.
    ///
    /// Starts as `Authenticating` when a token is persisted (a restore is
    /// pending and [`initialize`](Self::initialize) is expected to run), so
    /// the route guard shows a placeholder instead of bouncing to login.
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        storage: Arc<dyn KeyValueStore>,
        config: &SessionConfig,
    ) -> Self {
        let initial = match storage.get(keys::SESSION_TOKEN) {
            Ok(Some(_)) => Session::Authenticating,
            Ok(None) => Session::Unauthenticated,
            Err(error) => {
                tracing::warn!(%error, "cannot read persisted session token");
                Session::Unauthenticated
            }
        };

        let restore_pending = matches!(initial, Session::Authenticating);

        Self {
            state: StateCell::new(initial),
            provider,
            storage,
            restore_timeout: config.restore_timeout(),
            generation: AtomicU64::new(0),
            restore_pending: AtomicBool::new(restore_pending),
            initialized: OnceCell::new(),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns a snapshot of the committed session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.get()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.with(Session::status)
    }

    #[must_use]
    pub fn user(&self) -> Option<UserIdentity> {
        self.state.with(|session| session.user().cloned())
    }

    /// Registers a listener called with every committed session.
    pub fn subscribe(
        &self,
        listener: impl Fn(&Session) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Returns a receiver for async consumers.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.state.watch()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Restores a persisted session, once.
    ///
    /// Resolves to `authenticated` or `unauthenticated` within the configured
    /// restore timeout and never reports an error. Concurrent and repeated
    /// calls share the first run.
    pub async fn initialize(&self) {
        self.initialized.get_or_init(|| self.restore()).await;
    }

    async fn restore(&self) {
        let token = match self.storage.get(keys::SESSION_TOKEN) {
            Ok(Some(token)) => SessionToken::new(token),
            Ok(None) => {
                self.commit_restore_outcome(None, Session::Unauthenticated);
                return;
            }
            Err(error) => {
                tracing::warn!(%error, "cannot read persisted session token");
                self.commit_restore_outcome(None, Session::Unauthenticated);
                return;
            }
        };

        let mut generation = None;
        self.transition_if(|current| match current {
            // A sign-in that finished before boot wiring ran wins.
            Session::Authenticated(_) => None,
            // Already showing the restore placeholder set at construction.
            Session::Authenticating if self.restore_pending.swap(false, Ordering::SeqCst) => {
                generation = Some(self.next_generation());
                None
            }
            // A sign-in is in flight; its outcome wins.
            Session::Authenticating => None,
            _ => {
                generation = Some(self.next_generation());
                Some(Session::Authenticating)
            }
        });
        let Some(generation) = generation else {
            return;
        };

        let outcome = match tokio::time::timeout(self.restore_timeout, self.provider.restore(&token))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthError::NetworkFailure("restore timed out".to_string())),
        };

        match outcome {
            Ok(identity) => {
                tracing::info!(user = %identity.id, "session restored");
                self.commit_restore_outcome(Some(generation), Session::Authenticated(identity));
            }
            Err(error) => {
                tracing::info!(%error, "session restore failed; continuing signed out");
                if !matches!(error, AuthError::NetworkFailure(_)) {
                    self.forget_token();
                }
                self.commit_restore_outcome(Some(generation), Session::Unauthenticated);
            }
        }
    }

    fn commit_restore_outcome(&self, generation: Option<u64>, next: Session) {
        match generation {
            Some(generation) => {
                self.commit_if_current(generation, next);
            }
            None => {
                // No attempt was started: only settle the optimistic
                // `Authenticating` set at construction, never a sign-in.
                self.transition_if(|current| {
                    (matches!(current, Session::Authenticating)
                        && self.restore_pending.swap(false, Ordering::SeqCst))
                    .then_some(next)
                });
            }
        }
    }

    /// Signs in with email and password.
    ///
    /// Blank fields fail locally without touching the provider or the
    /// session. Only `unauthenticated` and `error` accept an attempt: while
    /// another attempt is in flight the call is rejected with
    /// [`SignInError::InProgress`], so at most one request reaches the
    /// provider, and a signed-in session is left alone with
    /// [`SignInError::AlreadySignedIn`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, SignInError> {
        let credentials = Credentials::new(email, password)?;

        let mut accepted = Err(SignInError::InProgress);
        self.transition_if(|current| match current {
            Session::Authenticating => None,
            Session::Authenticated(_) => {
                accepted = Err(SignInError::AlreadySignedIn);
                None
            }
            Session::Unauthenticated | Session::Failed(_) => {
                accepted = Ok(self.next_generation());
                Some(Session::Authenticating)
            }
        });
        let generation = match accepted {
            Ok(generation) => generation,
            Err(error) => {
                tracing::debug!(%error, "sign-in ignored");
                return Err(error);
            }
        };

        match self.provider.sign_in(&credentials).await {
            Ok(grant) => {
                let identity = grant.identity.clone();
                if !self.commit_if_current(generation, Session::Authenticated(grant.identity)) {
                    return Err(SignInError::Superseded);
                }
                if let Err(error) = self.storage.set(keys::SESSION_TOKEN, grant.token.as_str()) {
                    tracing::warn!(%error, "session token not persisted; it will not survive a restart");
                }
                tracing::info!(user = %identity.id, role = %identity.role, "signed in");
                Ok(identity)
            }
            Err(error) => {
                if !self.commit_if_current(generation, Session::Failed(error.clone())) {
                    return Err(SignInError::Superseded);
                }
                tracing::info!(%error, "sign-in rejected");
                Err(SignInError::Rejected(error))
            }
        }
    }

    /// Signs out. A no-op when already signed out; always succeeds.
    pub fn sign_out(&self) {
        let signed_out = self.transition_if(|current| match current {
            Session::Unauthenticated => None,
            _ => {
                // Any in-flight attempt is now stale.
                self.next_generation();
                self.restore_pending.store(false, Ordering::SeqCst);
                Some(Session::Unauthenticated)
            }
        });
        if signed_out {
            self.forget_token();
            tracing::info!("signed out");
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn commit_if_current(&self, generation: u64, next: Session) -> bool {
        self.transition_if(|_| {
            (self.generation.load(Ordering::SeqCst) == generation).then_some(next)
        })
    }

    fn transition_if(&self, decide: impl FnOnce(&Session) -> Option<Session>) -> bool {
        let mut from = None;
        let committed = self.state.replace_if(|current| {
            let next = decide(current)?;
            from = Some(current.status());
            Some(next)
        });
        if committed {
            if let Some(from) = from {
                tracing::debug!(%from, to = %self.status(), "session transition");
            }
        }
        committed
    }

    fn forget_token(&self) {
        if let Err(error) = self.storage.clear(keys::SESSION_TOKEN) {
            tracing::warn!(%error, "persisted session token could not be cleared");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("restore_timeout", &self.restore_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Provider stub that counts calls and yields once before answering, so
    /// concurrent callers actually overlap.
    struct CountingProvider {
        sign_in_calls: AtomicUsize,
        restore_calls: AtomicUsize,
        restore_answer: Mutex<Result<UserIdentity, AuthError>>,
        restore_delay: Option<Duration>,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                sign_in_calls: AtomicUsize::new(0),
                restore_calls: AtomicUsize::new(0),
                restore_answer: Mutex::new(Ok(member())),
                restore_delay: None,
            }
        }

        fn restoring(answer: Result<UserIdentity, AuthError>) -> Self {
            Self {
                restore_answer: Mutex::new(answer),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl AuthProvider for CountingProvider {
        async fn sign_in(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError> {
            self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            match credentials.password() {
                "right" => Ok(AuthGrant {
                    token: SessionToken::new("u-1.1"),
                    identity: UserIdentity {
                        email: credentials.email().to_string(),
                        ..member()
                    },
                }),
                "offline" => Err(AuthError::NetworkFailure("down".into())),
                _ => Err(AuthError::InvalidCredentials),
            }
        }

        async fn restore(&self, _token: &SessionToken) -> Result<UserIdentity, AuthError> {
            self.restore_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.restore_delay {
                tokio::time::sleep(delay).await;
            }
            self.restore_answer.lock().unwrap().clone()
        }
    }

    fn member() -> UserIdentity {
        UserIdentity {
            id: UserId::new("u-1"),
            email: "a@b.com".into(),
            role: Role::Member,
            display_name: "Ada".into(),
        }
    }

    fn store_with(
        provider: Arc<CountingProvider>,
        storage: Arc<MemoryStore>,
    ) -> SessionStore {
        SessionStore::new(provider, storage, &SessionConfig::default())
    }

    fn record(store: &SessionStore) -> Arc<Mutex<Vec<SessionStatus>>> {
        let seen = Arc::new(Mutex::new(vec![store.status()]));
        let sink = Arc::clone(&seen);
        store.subscribe(move |session| sink.lock().unwrap().push(session.status()));
        seen
    }

    #[tokio::test]
    async fn wrong_password_moves_to_error() {
        let provider = Arc::new(CountingProvider::new());
        let store = store_with(provider.clone(), Arc::new(MemoryStore::new()));
        let seen = record(&store);

        let result = store.sign_in("a@b.com", "wrong").await;

        assert_eq!(result, Err(SignInError::Rejected(AuthError::InvalidCredentials)));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                SessionStatus::Unauthenticated,
                SessionStatus::Authenticating,
                SessionStatus::Error
            ]
        );
        assert_eq!(store.session().error(), Some(&AuthError::InvalidCredentials));
        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn retry_after_error_authenticates_and_persists_token() {
        let provider = Arc::new(CountingProvider::new());
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(provider, storage.clone());
        let _ = store.sign_in("a@b.com", "wrong").await;
        let seen = record(&store);

        let user = store.sign_in("a@b.com", "right").await.expect("signed in");

        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.role, Role::Member);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                SessionStatus::Error,
                SessionStatus::Authenticating,
                SessionStatus::Authenticated
            ]
        );
        assert_eq!(
            storage.get(keys::SESSION_TOKEN).unwrap().as_deref(),
            Some("u-1.1")
        );
    }

    #[tokio::test]
    async fn failed_sign_in_persists_nothing() {
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(Arc::new(CountingProvider::new()), storage.clone());

        let result = store.sign_in("a@b.com", "offline").await;

        assert!(matches!(
            result,
            Err(SignInError::Rejected(AuthError::NetworkFailure(_)))
        ));
        assert_eq!(storage.get(keys::SESSION_TOKEN).unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_sign_ins_reach_provider_once() {
        let provider = Arc::new(CountingProvider::new());
        let store = store_with(provider.clone(), Arc::new(MemoryStore::new()));

        let (first, second) = tokio::join!(
            store.sign_in("a@b.com", "right"),
            store.sign_in("a@b.com", "right")
        );

        assert!(first.is_ok());
        assert_eq!(second, Err(SignInError::InProgress));
        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.status(), SessionStatus::Authenticated);
    }

    #[tokio::test]
    async fn blank_input_never_reaches_provider() {
        let provider = Arc::new(CountingProvider::new());
        let store = store_with(provider.clone(), Arc::new(MemoryStore::new()));

        assert_eq!(store.sign_in("", "pw").await, Err(SignInError::MissingEmail));
        assert_eq!(
            store.sign_in("a@b.com", "").await,
            Err(SignInError::MissingPassword)
        );
        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn sign_out_on_signed_out_session_is_noop() {
        let store = store_with(Arc::new(CountingProvider::new()), Arc::new(MemoryStore::new()));
        let seen = record(&store);

        store.sign_out();
        store.sign_out();

        assert_eq!(store.session(), Session::Unauthenticated);
        assert_eq!(*seen.lock().unwrap(), vec![SessionStatus::Unauthenticated]);
    }

    #[tokio::test]
    async fn sign_out_clears_identity_and_token() {
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(Arc::new(CountingProvider::new()), storage.clone());
        store.sign_in("a@b.com", "right").await.unwrap();

        store.sign_out();

        assert_eq!(store.session(), Session::Unauthenticated);
        assert_eq!(storage.get(keys::SESSION_TOKEN).unwrap(), None);
    }

    #[tokio::test]
    async fn sign_out_from_error_resets() {
        let store = store_with(Arc::new(CountingProvider::new()), Arc::new(MemoryStore::new()));
        let _ = store.sign_in("a@b.com", "wrong").await;

        store.sign_out();
        assert_eq!(store.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn sign_out_during_sign_in_discards_result() {
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(Arc::new(CountingProvider::new()), storage.clone());

        let (result, ()) = tokio::join!(store.sign_in("a@b.com", "right"), async {
            store.sign_out();
        });

        assert_eq!(result, Err(SignInError::Superseded));
        assert_eq!(store.session(), Session::Unauthenticated);
        assert_eq!(storage.get(keys::SESSION_TOKEN).unwrap(), None);
    }

    #[tokio::test]
    async fn persisted_token_restores_without_credentials() {
        let provider = Arc::new(CountingProvider::new());
        let storage = Arc::new(MemoryStore::with_entries([(keys::SESSION_TOKEN, "u-1.1")]));
        let store = store_with(provider.clone(), storage);
        assert_eq!(store.status(), SessionStatus::Authenticating);
        let seen = record(&store);

        store.initialize().await;

        assert_eq!(store.user(), Some(member()));
        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![SessionStatus::Authenticating, SessionStatus::Authenticated]
        );
    }

    #[tokio::test]
    async fn initialize_without_token_settles_signed_out() {
        let store = store_with(Arc::new(CountingProvider::new()), Arc::new(MemoryStore::new()));
        store.initialize().await;
        assert_eq!(store.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn expired_token_is_cleared_and_normalized() {
        let provider = Arc::new(CountingProvider::restoring(Err(AuthError::SessionExpired)));
        let storage = Arc::new(MemoryStore::with_entries([(keys::SESSION_TOKEN, "u-1.1")]));
        let store = store_with(provider, storage.clone());

        store.initialize().await;

        assert_eq!(store.session(), Session::Unauthenticated);
        assert_eq!(storage.get(keys::SESSION_TOKEN).unwrap(), None);
    }

    #[tokio::test]
    async fn network_failure_during_restore_keeps_token() {
        let provider = Arc::new(CountingProvider::restoring(Err(AuthError::NetworkFailure(
            "down".into(),
        ))));
        let storage = Arc::new(MemoryStore::with_entries([(keys::SESSION_TOKEN, "u-1.1")]));
        let store = store_with(provider, storage.clone());

        store.initialize().await;

        assert_eq!(store.session(), Session::Unauthenticated);
        assert!(storage.get(keys::SESSION_TOKEN).unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_restore_is_bounded_by_timeout() {
        let provider = Arc::new(CountingProvider {
            restore_delay: Some(Duration::from_secs(3600)),
            ..CountingProvider::new()
        });
        let storage = Arc::new(MemoryStore::with_entries([(keys::SESSION_TOKEN, "u-1.1")]));
        let store = store_with(provider, storage);

        store.initialize().await;

        assert_eq!(store.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn initialize_runs_restore_once() {
        let provider = Arc::new(CountingProvider::new());
        let storage = Arc::new(MemoryStore::with_entries([(keys::SESSION_TOKEN, "u-1.1")]));
        let store = store_with(provider.clone(), storage);

        tokio::join!(store.initialize(), store.initialize());
        store.initialize().await;

        assert_eq!(provider.restore_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sign_in_is_rejected_while_restore_is_pending() {
        let provider = Arc::new(CountingProvider::new());
        let storage = Arc::new(MemoryStore::with_entries([(keys::SESSION_TOKEN, "u-1.1")]));
        let store = store_with(provider.clone(), storage);

        assert_eq!(
            store.sign_in("a@b.com", "right").await,
            Err(SignInError::InProgress)
        );
        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn initialize_leaves_in_flight_sign_in_alone() {
        let provider = Arc::new(CountingProvider::new());
        let store = store_with(provider.clone(), Arc::new(MemoryStore::new()));
        let seen = record(&store);

        let (first, (), second) = tokio::join!(
            store.sign_in("a@b.com", "right"),
            store.initialize(),
            store.sign_in("a@b.com", "right"),
        );

        assert_eq!(first.map(|user| user.email), Ok("a@b.com".to_string()));
        assert_eq!(second, Err(SignInError::InProgress));
        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                SessionStatus::Unauthenticated,
                SessionStatus::Authenticating,
                SessionStatus::Authenticated
            ]
        );
    }

    #[tokio::test]
    async fn sign_in_while_signed_in_is_rejected() {
        let provider = Arc::new(CountingProvider::new());
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(provider.clone(), storage.clone());
        store.sign_in("a@b.com", "right").await.unwrap();
        let seen = record(&store);

        let result = store.sign_in("a@b.com", "wrong").await;

        assert_eq!(result, Err(SignInError::AlreadySignedIn));
        assert_eq!(provider.sign_in_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), vec![SessionStatus::Authenticated]);
        assert_eq!(store.user().map(|user| user.email), Some("a@b.com".to_string()));
        assert_eq!(
            storage.get(keys::SESSION_TOKEN).unwrap().as_deref(),
            Some("u-1.1")
        );
    }

    #[tokio::test]
    async fn sign_in_after_sign_out_then_initialize_is_not_settled() {
        let provider = Arc::new(CountingProvider::new());
        let storage = Arc::new(MemoryStore::with_entries([(keys::SESSION_TOKEN, "u-1.1")]));
        let store = store_with(provider.clone(), storage);
        store.sign_out();

        let (signed_in, ()) = tokio::join!(store.sign_in("a@b.com", "right"), store.initialize());

        assert!(signed_in.is_ok());
        assert_eq!(store.status(), SessionStatus::Authenticated);
        assert_eq!(provider.restore_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn watch_receiver_observes_commits() {
        let store = store_with(Arc::new(CountingProvider::new()), Arc::new(MemoryStore::new()));
        let mut rx = store.watch();

        store.sign_in("a@b.com", "right").await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());
    }
}
