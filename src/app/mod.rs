// SPDX-License-Identifier: MPL-2.0
//! Application root: wires configuration, persistence, the session and
//! locale stores, routing and notifications together.
//!
//! The stores are built here once and handed to the UI components by
//! reference; nothing else constructs them. Startup problems that leave the
//! console usable (unreadable settings, no data directory) become warning
//! toasts rather than errors.

pub mod paths;

use crate::config::{self, Config, DEFAULT_FALLBACK_LOCALE};
use crate::error::Error;
use crate::i18n::{negotiate, LocaleError, LocaleManager, LocaleSources, ResourceBundleStore};
use crate::routing::{Navigation, Route, RouteTable};
use crate::session::{AuthProvider, DirectoryAuthProvider, SessionStore};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::ui::login::{LoginForm, LoginOutcome};
use crate::ui::notifications::{self, Notification, Toast};
use crate::ui::{language_selector, navbar, sidebar};
use std::fmt;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

/// Launch options, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    /// Optional locale override in BCP-47 form (e.g. `fr`, `en-US`).
    pub lang: Option<String>,
    /// Optional data directory override (for the state file).
    /// Takes precedence over `AMAP_CONSOLE_DATA_DIR` environment variable.
    pub data_dir: Option<String>,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `AMAP_CONSOLE_CONFIG_DIR` environment variable.
    pub config_dir: Option<String>,
}

pub struct App {
    config: Config,
    session: SessionStore,
    locales: LocaleManager,
    routes: RouteTable,
    notifications: notifications::Manager,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session.status())
            .field("locale", &self.locales.active_locale())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Boots with the on-disk settings and state and the built-in account
    /// directory.
    ///
    /// Fails only when the resource bundles are unusable.
    pub fn new(flags: Flags) -> Result<Self, LocaleError> {
        paths::init_cli_overrides(flags.data_dir, flags.config_dir);

        let (config, config_warning) = config::load();
        let mut warnings: Vec<String> = config_warning.into_iter().collect();

        let storage: Arc<dyn KeyValueStore> = match FileStore::open() {
            Ok(store) => {
                tracing::debug!(path = %store.path().display(), "using state file");
                Arc::new(store)
            }
            Err(error) => {
                tracing::warn!(%error, "state will not persist across restarts");
                warnings.push(startup_warning_key(&error).to_string());
                Arc::new(MemoryStore::new())
            }
        };

        let mut app = Self::with_parts(
            config,
            Arc::new(DirectoryAuthProvider::demo()),
            storage,
            flags.lang.as_deref(),
            &negotiate::platform_preferences(),
        )?;
        for key in warnings {
            app.notifications.push(Notification::warning(key));
        }
        Ok(app)
    }

    /// Assembles the application from explicit collaborators.
    ///
    /// A configured fallback locale without a bundle is replaced by the
    /// default one and reported as a settings warning.
    pub fn with_parts(
        mut config: Config,
        provider: Arc<dyn AuthProvider>,
        storage: Arc<dyn KeyValueStore>,
        lang: Option<&str>,
        preferences: &[String],
    ) -> Result<Self, LocaleError> {
        let bundles = ResourceBundleStore::embedded()?;
        let fallback_usable = config
            .locale
            .fallback
            .parse::<LanguageIdentifier>()
            .is_ok_and(|fallback| bundles.contains(&fallback));
        if !fallback_usable {
            tracing::warn!(
                fallback = %config.locale.fallback,
                "configured fallback locale has no bundle; using the default"
            );
            config.locale.fallback = DEFAULT_FALLBACK_LOCALE.to_string();
        }

        let locales = LocaleManager::new(
            bundles,
            Arc::clone(&storage),
            &config.locale,
            LocaleSources {
                explicit: lang,
                persisted: None,
                preferences,
            },
        )?;
        let session = SessionStore::new(provider, storage, &config.session);

        let mut notifications = notifications::Manager::new();
        if !fallback_usable {
            notifications.push(Notification::warning(config::CONFIG_LOAD_WARNING));
        }

        Ok(Self {
            config,
            session,
            locales,
            routes: RouteTable::new(),
            notifications,
        })
    }

    /// Restores a persisted session. Call once at startup.
    pub async fn initialize(&self) {
        self.session.initialize().await;
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn locales(&self) -> &LocaleManager {
        &self.locales
    }

    #[must_use]
    pub fn notifications(&self) -> &notifications::Manager {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut notifications::Manager {
        &mut self.notifications
    }

    /// Resolves `path` against the route table and the current session.
    #[must_use]
    pub fn navigate(&self, path: &str) -> Navigation {
        self.routes.navigate(path, &self.session.session())
    }

    /// Submits the login form; clears stale sign-in errors on success.
    pub async fn submit_login(&mut self, form: &mut LoginForm) -> LoginOutcome {
        let outcome = form.submit(&self.session, &mut self.notifications).await;
        if matches!(outcome, LoginOutcome::SignedIn { .. }) {
            self.notifications.clear_auth_errors();
        }
        outcome
    }

    /// Signs in with raw credentials through a fresh login form.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> LoginOutcome {
        let mut form = LoginForm::with_credentials(email, password);
        self.submit_login(&mut form).await
    }

    /// Logs out through the navbar and returns where to go next.
    pub fn sign_out(&mut self) -> Route {
        match navbar::update(navbar::Message::Logout, &self.session) {
            navbar::Event::Navigate(route) => route,
        }
    }

    /// Switches language through the selector.
    pub fn select_language(&mut self, locale: LanguageIdentifier) -> language_selector::Event {
        language_selector::update(
            language_selector::Message::Select(locale),
            &self.locales,
            &mut self.notifications,
        )
    }

    #[must_use]
    pub fn navbar(&self) -> navbar::ViewModel {
        navbar::view_model(&self.session, &self.locales)
    }

    #[must_use]
    pub fn sidebar(&self, current: &Route) -> Vec<sidebar::Item> {
        sidebar::items(current, &self.locales)
    }

    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.notifications.render(&self.locales)
    }

    /// One-line, translated description of a navigation outcome.
    #[must_use]
    pub fn describe(&self, navigation: &Navigation) -> String {
        let tr = |key: &str| self.locales.translate(key);
        match navigation {
            Navigation::Render(route) => format!("{} ({})", tr(route.title_key()), route),
            Navigation::Loading(route) => format!("{} ({})", tr("common.loading"), route),
            Navigation::Redirect(route) => format!("→ {} ({})", tr(route.title_key()), route),
            Navigation::NotFound => tr("errors.notFound"),
        }
    }
}

fn startup_warning_key(error: &Error) -> &'static str {
    match error {
        Error::Storage(storage) => storage.i18n_key(),
        Error::Io(_) | Error::Config(_) => "notifications.stateWriteError",
    }
}
