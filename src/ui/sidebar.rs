// SPDX-License-Identifier: MPL-2.0
//! Sidebar entries of the protected layout.

use crate::i18n::LocaleManager;
use crate::routing::Route;

/// One sidebar link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub route: Route,
    pub label: String,
    /// The current route belongs to this entry's section.
    pub active: bool,
}

const ENTRIES: [(Route, &str); 4] = [
    (Route::Dashboard, "nav.dashboard"),
    (Route::AmapList, "nav.amaps"),
    (Route::OrderList, "nav.orders"),
    (Route::Profile, "nav.profile"),
];

/// Builds the sidebar for `current`; detail pages highlight their list.
#[must_use]
pub fn items(current: &Route, locales: &LocaleManager) -> Vec<Item> {
    ENTRIES
        .into_iter()
        .map(|(route, key)| Item {
            active: route.section() == current.section(),
            label: locales.translate(key),
            route,
        })
        .collect()
}
