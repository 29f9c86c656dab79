// SPDX-License-Identifier: MPL-2.0
//! This module handles the console's configuration, loaded from a
//! `settings.toml` file in the config directory.
//!
//! # Configuration Sections
//!
//! - `[locale]` - Fallback locale and formatting defaults
//! - `[session]` - Session restore bounds
//!
//! The user's language choice is *not* stored here: it is runtime state
//! persisted through [`crate::storage::KeyValueStore`] by the
//! [`crate::i18n::LocaleManager`].
//!
//! # Examples
//!
//! ```no_run
//! use amap_console::config::{self, Config};
//!
//! let (mut config, _warning) = config::load();
//! config.locale.fallback = "en".to_string();
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::error::{Error, Result};
use crate::i18n::format::{Currency, DatePattern};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Notification key reported when settings could not be applied.
pub const CONFIG_LOAD_WARNING: &str = "notifications.configLoadError";

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// Localization settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfig {
    /// Locale consulted when the active bundle lacks a key (e.g., "fr").
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Pattern used when `format_date` receives an unknown pattern key.
    #[serde(default)]
    pub date_pattern: DatePattern,

    /// Currency used when `format_currency` receives an unsupported code.
    #[serde(default)]
    pub currency: Currency,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            date_pattern: DatePattern::default(),
            currency: Currency::default(),
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Upper bound for `SessionStore::initialize` (milliseconds).
    #[serde(default = "default_restore_timeout_ms")]
    pub restore_timeout_ms: u64,
}

impl SessionConfig {
    /// Returns the restore timeout clamped to the supported range.
    #[must_use]
    pub fn restore_timeout(&self) -> Duration {
        Duration::from_millis(
            self.restore_timeout_ms
                .clamp(MIN_RESTORE_TIMEOUT_MS, MAX_RESTORE_TIMEOUT_MS),
        )
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            restore_timeout_ms: default_restore_timeout_ms(),
        }
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Console configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub locale: LocaleConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_fallback() -> String {
    DEFAULT_FALLBACK_LOCALE.to_string()
}

fn default_restore_timeout_ms() -> u64 {
    DEFAULT_RESTORE_TIMEOUT_MS
}

// =============================================================================
// Config Path Resolution
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning key explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "ignoring unreadable settings");
                    return (Config::default(), Some(CONFIG_LOAD_WARNING.to_string()));
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
