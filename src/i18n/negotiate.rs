// SPDX-License-Identifier: MPL-2.0
//! Initial locale selection.
//!
//! Priority, first match wins:
//! 1. explicit override (`--lang`)
//! 2. persisted choice
//! 3. platform preferences, in order
//! 4. configured fallback
//!
//! Each candidate matches an available locale exactly, or else by language
//! subtag (`fr-CA` selects `fr`).

use unic_langid::LanguageIdentifier;

/// Inputs considered by [`detect_initial_locale`].
#[derive(Debug, Clone, Default)]
pub struct LocaleSources<'a> {
    pub explicit: Option<&'a str>,
    pub persisted: Option<&'a str>,
    pub preferences: &'a [String],
}

/// Parses a tag, accepting POSIX forms such as `fr_FR.UTF-8`.
#[must_use]
pub fn parse_tag(tag: &str) -> Option<LanguageIdentifier> {
    let base = tag.split(['.', '@']).next().unwrap_or(tag).trim();
    if base.is_empty() {
        return None;
    }
    base.replace('_', "-").parse().ok()
}

/// Finds the available locale best matching one requested tag.
#[must_use]
pub fn match_locale(
    requested: &str,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    let requested = parse_tag(requested)?;
    if let Some(exact) = available.iter().find(|locale| **locale == requested) {
        return Some(exact.clone());
    }
    let mut same_language = available
        .iter()
        .filter(|locale| locale.language == requested.language);
    let first = same_language.next()?;
    // Prefer the bare language bundle over a regional one.
    if first.region.is_none() {
        return Some(first.clone());
    }
    Some(
        same_language
            .find(|locale| locale.region.is_none())
            .unwrap_or(first)
            .clone(),
    )
}

/// Picks the initial active locale.
#[must_use]
pub fn detect_initial_locale(
    sources: &LocaleSources<'_>,
    available: &[LanguageIdentifier],
    fallback: &LanguageIdentifier,
) -> LanguageIdentifier {
    let candidates = sources
        .explicit
        .into_iter()
        .chain(sources.persisted)
        .chain(sources.preferences.iter().map(String::as_str));

    for candidate in candidates {
        if let Some(locale) = match_locale(candidate, available) {
            return locale;
        }
    }
    fallback.clone()
}

/// Preferred languages reported by the operating system, most preferred first.
#[must_use]
pub fn platform_preferences() -> Vec<String> {
    sys_locale::get_locales().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langid(tag: &str) -> LanguageIdentifier {
        tag.parse().expect("valid tag")
    }

    fn available() -> Vec<LanguageIdentifier> {
        vec![langid("en"), langid("fr")]
    }

    #[test]
    fn parse_tag_accepts_posix_locales() {
        assert_eq!(parse_tag("fr_FR.UTF-8"), Some(langid("fr-FR")));
        assert_eq!(parse_tag("en_US@euro"), Some(langid("en-US")));
        assert_eq!(parse_tag(""), None);
        assert_eq!(parse_tag("!!"), None);
    }

    #[test]
    fn match_prefers_exact_then_language() {
        assert_eq!(match_locale("en", &available()), Some(langid("en")));
        assert_eq!(match_locale("fr-CA", &available()), Some(langid("fr")));
        assert_eq!(match_locale("de-DE", &available()), None);
    }

    #[test]
    fn language_match_prefers_bare_bundle() {
        let available = vec![langid("fr-BE"), langid("fr")];
        assert_eq!(match_locale("fr-CA", &available), Some(langid("fr")));
    }

    #[test]
    fn explicit_override_wins() {
        let sources = LocaleSources {
            explicit: Some("en"),
            persisted: Some("fr"),
            preferences: &["fr-FR".to_string()],
        };
        assert_eq!(
            detect_initial_locale(&sources, &available(), &langid("fr")),
            langid("en")
        );
    }

    #[test]
    fn persisted_choice_beats_platform_preferences() {
        let sources = LocaleSources {
            explicit: None,
            persisted: Some("en"),
            preferences: &["fr-FR".to_string()],
        };
        assert_eq!(
            detect_initial_locale(&sources, &available(), &langid("fr")),
            langid("en")
        );
    }

    #[test]
    fn stale_persisted_choice_falls_through_to_preferences() {
        let sources = LocaleSources {
            explicit: None,
            persisted: Some("xx"),
            preferences: &["de-DE".to_string(), "en-GB".to_string()],
        };
        assert_eq!(
            detect_initial_locale(&sources, &available(), &langid("fr")),
            langid("en")
        );
    }

    #[test]
    fn nothing_matching_yields_fallback() {
        let sources = LocaleSources {
            preferences: &["ja-JP".to_string()],
            ..LocaleSources::default()
        };
        assert_eq!(
            detect_initial_locale(&sources, &available(), &langid("fr")),
            langid("fr")
        );
    }
}
