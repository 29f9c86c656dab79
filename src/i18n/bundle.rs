// SPDX-License-Identifier: MPL-2.0
//! Resource bundles: translated strings per locale.
//!
//! Translations are authored as nested TOML tables ([`ResourceTree`]) and
//! flattened once, at load, into a [`Bundle`] keyed by dotted paths
//! (`[orders] customer = ".."` becomes `orders.customer`). Every segment is
//! checked while flattening, so a lookup is a plain map access and a missing
//! key is a definite answer rather than an accident of traversal.
//!
//! Bundles are immutable after construction; [`ResourceBundleStore`] only
//! hands out shared references.

use super::error::LocaleError;
use rust_embed::RustEmbed;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use unic_langid::LanguageIdentifier;

#[derive(RustEmbed)]
#[folder = "assets/i18n/"]
struct Asset;

const RESOURCE_EXTENSION: &str = ".toml";

// =============================================================================
// Resource trees
// =============================================================================

/// A node of an authored resource file: a string leaf or a nested table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResourceNode {
    Leaf(String),
    Tree(ResourceTree),
}

/// Key segment → node mapping, as authored.
pub type ResourceTree = BTreeMap<String, ResourceNode>;

// =============================================================================
// Bundle
// =============================================================================

/// Flattened, validated strings of one locale.
#[derive(Debug, Clone)]
pub struct Bundle {
    locale: LanguageIdentifier,
    entries: HashMap<String, String>,
}

impl Bundle {
    /// Parses a TOML resource file.
    pub fn from_toml(locale: LanguageIdentifier, source: &str) -> Result<Self, LocaleError> {
        let tree: ResourceTree = toml::from_str(source).map_err(|e| LocaleError::InvalidBundle {
            locale: locale.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_tree(locale, &tree)
    }

    /// Flattens a resource tree, rejecting segments that are empty or
    /// contain a `.`.
    pub fn from_tree(locale: LanguageIdentifier, tree: &ResourceTree) -> Result<Self, LocaleError> {
        let mut entries = HashMap::new();
        flatten(&locale, "", tree, &mut entries)?;
        Ok(Self { locale, entries })
    }

    #[must_use]
    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(
    locale: &LanguageIdentifier,
    prefix: &str,
    tree: &ResourceTree,
    out: &mut HashMap<String, String>,
) -> Result<(), LocaleError> {
    for (segment, node) in tree {
        let path = if prefix.is_empty() {
            segment.clone()
        } else {
            format!("{prefix}.{segment}")
        };
        if segment.is_empty() || segment.contains('.') {
            return Err(LocaleError::InvalidKeyPath {
                locale: locale.to_string(),
                key: path,
            });
        }
        match node {
            ResourceNode::Leaf(text) => {
                out.insert(path, text.clone());
            }
            ResourceNode::Tree(child) => flatten(locale, &path, child, out)?,
        }
    }
    Ok(())
}

// =============================================================================
// ResourceBundleStore
// =============================================================================

/// A key the reference bundle has but another locale lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey {
    pub locale: LanguageIdentifier,
    pub key: String,
}

/// All preloaded bundles, keyed by locale.
#[derive(Debug, Clone, Default)]
pub struct ResourceBundleStore {
    bundles: HashMap<LanguageIdentifier, Bundle>,
}

impl ResourceBundleStore {
    /// Loads every `<tag>.toml` compiled into the binary from `assets/i18n/`.
    pub fn embedded() -> Result<Self, LocaleError> {
        let mut bundles = Vec::new();
        for file in Asset::iter() {
            let filename = file.as_ref();
            let Some(tag) = filename.strip_suffix(RESOURCE_EXTENSION) else {
                continue;
            };
            let locale: LanguageIdentifier = tag
                .parse()
                .map_err(|_| LocaleError::InvalidLocaleTag(tag.to_string()))?;
            let Some(content) = Asset::get(filename) else {
                continue;
            };
            let source =
                std::str::from_utf8(content.data.as_ref()).map_err(|e| LocaleError::InvalidBundle {
                    locale: tag.to_string(),
                    reason: e.to_string(),
                })?;
            bundles.push(Bundle::from_toml(locale, source)?);
        }
        Ok(Self::from_bundles(bundles))
    }

    /// Builds a store from already-loaded bundles. A later bundle for the
    /// same locale replaces an earlier one.
    pub fn from_bundles(bundles: impl IntoIterator<Item = Bundle>) -> Self {
        Self {
            bundles: bundles
                .into_iter()
                .map(|bundle| (bundle.locale.clone(), bundle))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, locale: &LanguageIdentifier) -> Option<&Bundle> {
        self.bundles.get(locale)
    }

    #[must_use]
    pub fn contains(&self, locale: &LanguageIdentifier) -> bool {
        self.bundles.contains_key(locale)
    }

    /// Loaded locales, sorted by tag.
    #[must_use]
    pub fn locales(&self) -> Vec<LanguageIdentifier> {
        let mut locales: Vec<LanguageIdentifier> = self.bundles.keys().cloned().collect();
        locales.sort_by_cached_key(ToString::to_string);
        locales
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Lists keys of `reference` missing from the other bundles, sorted by
    /// locale then key.
    #[must_use]
    pub fn audit(&self, reference: &LanguageIdentifier) -> Vec<MissingKey> {
        let Some(reference_bundle) = self.bundles.get(reference) else {
            return Vec::new();
        };

        let mut missing: Vec<MissingKey> = self
            .bundles
            .values()
            .filter(|bundle| bundle.locale != *reference)
            .flat_map(|bundle| {
                reference_bundle
                    .keys()
                    .filter(|key| !bundle.contains(key))
                    .map(|key| MissingKey {
                        locale: bundle.locale.clone(),
                        key: key.to_string(),
                    })
            })
            .collect();
        missing.sort_by(|a, b| {
            (a.locale.to_string(), &a.key).cmp(&(b.locale.to_string(), &b.key))
        });
        missing
    }
}
