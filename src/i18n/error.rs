// SPDX-License-Identifier: MPL-2.0
use std::fmt;

/// Localization failures.
///
/// `UnsupportedLocale` and `MissingTranslationKey` are absorbed by the
/// [`super::LocaleManager`] (no-op / literal key) and only reach logs. The
/// remaining variants come from loading bundles and are hard failures at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// `set_locale` was given a locale outside the available set.
    UnsupportedLocale(String),

    /// A key path resolved in neither the requested nor the fallback bundle.
    MissingTranslationKey(String),

    /// A language tag could not be parsed.
    InvalidLocaleTag(String),

    /// A resource file could not be parsed.
    InvalidBundle { locale: String, reason: String },

    /// A resource tree contains a segment that cannot form a dotted path.
    InvalidKeyPath { locale: String, key: String },

    /// The configured fallback locale has no bundle.
    FallbackNotLoaded(String),
}

impl fmt::Display for LocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocaleError::UnsupportedLocale(tag) => write!(f, "Unsupported locale: {}", tag),
            LocaleError::MissingTranslationKey(key) => write!(f, "Missing translation key: {}", key),
            LocaleError::InvalidLocaleTag(tag) => write!(f, "Invalid locale tag: {}", tag),
            LocaleError::InvalidBundle { locale, reason } => {
                write!(f, "Invalid bundle for '{}': {}", locale, reason)
            }
            LocaleError::InvalidKeyPath { locale, key } => {
                write!(f, "Invalid key path '{}' in bundle '{}'", key, locale)
            }
            LocaleError::FallbackNotLoaded(tag) => {
                write!(f, "Fallback locale '{}' has no bundle", tag)
            }
        }
    }
}

impl std::error::Error for LocaleError {}
