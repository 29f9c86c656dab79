// SPDX-License-Identifier: MPL-2.0
//! Internationalization (i18n) support for the console.
//!
//! This module owns the active locale and everything derived from it:
//! translated strings, dates, numbers and monetary amounts.
//!
//! # Features
//!
//! - Initial locale from CLI override, persisted choice, platform settings
//!   or the configured fallback (see [`negotiate`])
//! - Embedded TOML resource bundles, preloaded and audited at startup
//! - Runtime language switching with synchronous change notification
//! - Per-key fallback to the fallback locale, then to the literal key
//!
//! Translation never fails: a key missing everywhere renders as itself, so
//! gaps are visible in the UI instead of breaking it.

pub mod bundle;
pub mod error;
pub mod format;
pub mod negotiate;

pub use bundle::{Bundle, MissingKey, ResourceBundleStore, ResourceNode, ResourceTree};
pub use error::LocaleError;
pub use format::{Currency, DatePattern};
pub use negotiate::LocaleSources;

use crate::config::LocaleConfig;
use crate::state::{StateCell, SubscriptionId};
use crate::storage::{keys, KeyValueStore};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::watch;
use unic_langid::LanguageIdentifier;

/// Active-locale owner and translation entry point.
pub struct LocaleManager {
    bundles: ResourceBundleStore,
    available: Vec<LanguageIdentifier>,
    fallback: LanguageIdentifier,
    active: StateCell<LanguageIdentifier>,
    storage: Arc<dyn KeyValueStore>,
    date_pattern: DatePattern,
    currency: Currency,
}

impl LocaleManager {
    /// Builds the manager and picks the initial locale.
    ///
    /// Fails only if the configured fallback is not a valid tag or has no
    /// bundle. Keys missing from non-fallback bundles are logged.
    pub fn new(
        bundles: ResourceBundleStore,
        storage: Arc<dyn KeyValueStore>,
        config: &LocaleConfig,
        sources: LocaleSources<'_>,
    ) -> Result<Self, LocaleError> {
        let fallback: LanguageIdentifier = config
            .fallback
            .parse()
            .map_err(|_| LocaleError::InvalidLocaleTag(config.fallback.clone()))?;
        if !bundles.contains(&fallback) {
            return Err(LocaleError::FallbackNotLoaded(fallback.to_string()));
        }

        for missing in bundles.audit(&fallback) {
            tracing::warn!(
                locale = %missing.locale,
                key = %missing.key,
                "translation missing, fallback locale will be used"
            );
        }

        let persisted = match storage.get(keys::LOCALE_PREFERENCE) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "cannot read persisted locale");
                None
            }
        };
        let sources = LocaleSources {
            persisted: sources.persisted.or(persisted.as_deref()),
            ..sources
        };

        let available = bundles.locales();
        let initial = negotiate::detect_initial_locale(&sources, &available, &fallback);
        tracing::debug!(locale = %initial, "initial locale selected");

        Ok(Self {
            bundles,
            available,
            fallback,
            active: StateCell::new(initial),
            storage,
            date_pattern: config.date_pattern,
            currency: config.currency,
        })
    }

    #[must_use]
    pub fn active_locale(&self) -> LanguageIdentifier {
        self.active.get()
    }

    /// Locales with a loaded bundle, sorted by tag.
    #[must_use]
    pub fn available_locales(&self) -> &[LanguageIdentifier] {
        &self.available
    }

    #[must_use]
    pub fn fallback_locale(&self) -> &LanguageIdentifier {
        &self.fallback
    }

    #[must_use]
    pub fn is_available(&self, locale: &LanguageIdentifier) -> bool {
        self.bundles.contains(locale)
    }

    /// Switches the active locale, persists the choice and notifies
    /// subscribers.
    ///
    /// An unavailable locale leaves everything unchanged and returns
    /// [`LocaleError::UnsupportedLocale`]. Selecting the active locale
    /// again is a silent no-op. A failed write is logged and does not
    /// prevent the switch.
    pub fn set_locale(&self, locale: &LanguageIdentifier) -> Result<(), LocaleError> {
        if !self.is_available(locale) {
            tracing::debug!(%locale, "ignoring unsupported locale");
            return Err(LocaleError::UnsupportedLocale(locale.to_string()));
        }
        if self.active.with(|active| active == locale) {
            return Ok(());
        }

        if let Err(error) = self.storage.set(keys::LOCALE_PREFERENCE, &locale.to_string()) {
            tracing::warn!(%error, %locale, "cannot persist locale preference");
        }
        tracing::debug!(from = %self.active_locale(), to = %locale, "locale changed");
        self.active.replace(locale.clone());
        Ok(())
    }

    /// Like [`Self::set_locale`] for a raw tag; an unparsable tag is
    /// unsupported.
    pub fn set_locale_tag(&self, tag: &str) -> Result<(), LocaleError> {
        let locale: LanguageIdentifier = tag
            .parse()
            .map_err(|_| LocaleError::UnsupportedLocale(tag.to_string()))?;
        self.set_locale(&locale)
    }

    /// Resolves `key` in the active locale.
    #[must_use]
    pub fn translate(&self, key: &str) -> String {
        self.translate_in(key, &self.active_locale())
    }

    /// Resolves `key` in `locale`, then the fallback locale, then returns
    /// the key itself.
    #[must_use]
    pub fn translate_in(&self, key: &str, locale: &LanguageIdentifier) -> String {
        match self.lookup(key, locale) {
            Ok(text) => text.to_string(),
            Err(error) => {
                tracing::debug!(%error, %locale, "rendering key literally");
                key.to_string()
            }
        }
    }

    /// Resolves `key` in the active locale and fills `{name}` placeholders.
    #[must_use]
    pub fn translate_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        format::interpolate(&self.translate(key), args)
    }

    /// Looks `key` up in `locale` then in the fallback bundle.
    pub fn lookup(&self, key: &str, locale: &LanguageIdentifier) -> Result<&str, LocaleError> {
        self.bundles
            .get(locale)
            .and_then(|bundle| bundle.get(key))
            .or_else(|| self.bundles.get(&self.fallback).and_then(|b| b.get(key)))
            .ok_or_else(|| LocaleError::MissingTranslationKey(key.to_string()))
    }

    /// Formats a date with a named pattern (`short`, `medium`, `long`).
    ///
    /// Unknown names use the configured default pattern.
    #[must_use]
    pub fn format_date(&self, date: NaiveDate, pattern: &str) -> String {
        let pattern = pattern.parse().unwrap_or(self.date_pattern);
        let locale = self.active_locale();
        let conv = format::conventions(&locale);

        self.lookup(&pattern.resource_key(), &locale)
            .ok()
            .and_then(|strftime| format::format_date(date, strftime, &conv))
            .or_else(|| {
                tracing::debug!(%locale, %pattern, "using built-in date pattern");
                format::format_date(date, pattern.builtin(), &conv)
            })
            .unwrap_or_else(|| date.to_string())
    }

    #[must_use]
    pub fn format_number(&self, value: f64) -> String {
        format::format_number(value, &format::conventions(&self.active_locale()))
    }

    /// Formats an amount in the given ISO-4217 code.
    ///
    /// Unsupported codes use the configured default currency.
    #[must_use]
    pub fn format_currency(&self, amount: f64, currency: &str) -> String {
        let currency = currency.parse().unwrap_or_else(|_| {
            tracing::debug!(code = currency, default = %self.currency, "unsupported currency");
            self.currency
        });
        format::format_currency(amount, currency, &format::conventions(&self.active_locale()))
    }

    /// Registers a listener called with the new locale after each change.
    pub fn subscribe(
        &self,
        listener: impl Fn(&LanguageIdentifier) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.active.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.active.unsubscribe(id)
    }

    pub fn watch(&self) -> watch::Receiver<LanguageIdentifier> {
        self.active.watch()
    }
}

impl std::fmt::Debug for LocaleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleManager")
            .field("active", &self.active)
            .field("available", &self.available)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Mutex;

    fn langid(tag: &str) -> LanguageIdentifier {
        tag.parse().expect("valid tag")
    }

    fn manager_with(
        store: Arc<MemoryStore>,
        sources: LocaleSources<'_>,
    ) -> LocaleManager {
        LocaleManager::new(
            ResourceBundleStore::embedded().expect("embedded bundles"),
            store,
            &LocaleConfig::default(),
            sources,
        )
        .expect("manager")
    }

    fn manager(explicit: &str) -> (LocaleManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let manager = manager_with(
            Arc::clone(&store),
            LocaleSources {
                explicit: Some(explicit),
                ..LocaleSources::default()
            },
        );
        (manager, store)
    }

    /// Store with a French-only key so fallback can be observed.
    fn partial_store() -> ResourceBundleStore {
        ResourceBundleStore::from_bundles([
            Bundle::from_toml(
                langid("fr"),
                "[orders]\ncustomer = \"Client\"\ntotal = \"Total\"\n",
            )
            .unwrap(),
            Bundle::from_toml(langid("en"), "[orders]\ntotal = \"Total amount\"\n").unwrap(),
        ])
    }

    #[test]
    fn missing_key_falls_back_to_fallback_locale() {
        let manager = LocaleManager::new(
            partial_store(),
            Arc::new(MemoryStore::new()),
            &LocaleConfig::default(),
            LocaleSources {
                explicit: Some("en"),
                ..LocaleSources::default()
            },
        )
        .unwrap();

        assert_eq!(manager.translate("orders.total"), "Total amount");
        assert_eq!(manager.translate("orders.customer"), "Client");
    }

    #[test]
    fn key_missing_everywhere_renders_literally() {
        let (manager, _) = manager("en");
        assert_eq!(manager.translate("orders.nonexistent"), "orders.nonexistent");
        assert!(matches!(
            manager.lookup("orders.nonexistent", &langid("en")),
            Err(LocaleError::MissingTranslationKey(_))
        ));
    }

    #[test]
    fn translate_in_ignores_active_locale() {
        let (manager, _) = manager("en");
        assert_eq!(manager.translate_in("orders.customer", &langid("fr")), "Client");
        assert_eq!(manager.translate("orders.customer"), "Customer");
    }

    #[test]
    fn translate_with_fills_placeholders() {
        let (manager, _) = manager("en");
        assert_eq!(
            manager.translate_with("common.welcomeUser", &[("name", "Jean")]),
            "Welcome, Jean"
        );
    }

    #[test]
    fn unsupported_locale_changes_nothing() {
        let (manager, store) = manager("fr");
        let calls = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&calls);
        manager.subscribe(move |_| *sink.lock().unwrap() += 1);

        assert_eq!(
            manager.set_locale_tag("xx"),
            Err(LocaleError::UnsupportedLocale("xx".into()))
        );
        assert_eq!(manager.active_locale(), langid("fr"));
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(store.get(keys::LOCALE_PREFERENCE).unwrap(), None);
    }

    #[test]
    fn set_locale_persists_and_notifies() {
        let (manager, store) = manager("fr");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        manager.subscribe(move |locale| sink.lock().unwrap().push(locale.to_string()));

        manager.set_locale(&langid("en")).unwrap();

        assert_eq!(manager.active_locale(), langid("en"));
        assert_eq!(*seen.lock().unwrap(), vec!["en".to_string()]);
        assert_eq!(
            store.get(keys::LOCALE_PREFERENCE).unwrap().as_deref(),
            Some("en")
        );
    }

    #[test]
    fn reselecting_active_locale_is_silent() {
        let (manager, _) = manager("fr");
        let calls = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&calls);
        manager.subscribe(move |_| *sink.lock().unwrap() += 1);

        manager.set_locale(&langid("fr")).unwrap();
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn persisted_preference_is_restored() {
        let store = Arc::new(MemoryStore::with_entries([(
            keys::LOCALE_PREFERENCE,
            "en",
        )]));
        let manager = manager_with(store, LocaleSources::default());
        assert_eq!(manager.active_locale(), langid("en"));
    }

    #[test]
    fn missing_fallback_bundle_is_an_error() {
        let config = LocaleConfig {
            fallback: "de".into(),
            ..LocaleConfig::default()
        };
        let err = LocaleManager::new(
            ResourceBundleStore::embedded().unwrap(),
            Arc::new(MemoryStore::new()),
            &config,
            LocaleSources::default(),
        )
        .unwrap_err();
        assert_eq!(err, LocaleError::FallbackNotLoaded("de".into()));
    }

    #[test]
    fn currency_follows_active_locale() {
        let (manager, _) = manager("fr");
        assert_eq!(manager.format_currency(42.5, "EUR"), "42,50\u{A0}€");
        manager.set_locale(&langid("en")).unwrap();
        assert_eq!(manager.format_currency(42.5, "EUR"), "€42.50");
        assert_eq!(manager.format_currency(42.5, "XYZ"), "€42.50");
    }

    #[test]
    fn number_follows_active_locale() {
        let (manager, _) = manager("en");
        assert_eq!(manager.format_number(1234.5), "1,234.5");
    }

    #[test]
    fn dates_use_bundle_patterns() {
        let (manager, _) = manager("en");
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(manager.format_date(date, "short"), "03/05/2024");
        assert_eq!(manager.format_date(date, "long"), "March 05, 2024");
        assert_eq!(manager.format_date(date, "weekday"), "Mar 05, 2024");

        manager.set_locale(&langid("fr")).unwrap();
        assert_eq!(manager.format_date(date, "short"), "05/03/2024");
    }

    #[test]
    fn available_locales_are_sorted() {
        let (manager, _) = manager("fr");
        assert_eq!(manager.available_locales(), &[langid("en"), langid("fr")]);
        assert_eq!(manager.fallback_locale(), &langid("fr"));
    }
}
