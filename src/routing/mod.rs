// SPDX-License-Identifier: MPL-2.0
//! Table-driven routing.
//!
//! Routes are plain [`RouteDef`] records: a segment pattern, an access
//! level and a constructor. [`RouteTable::navigate`] resolves a path and
//! runs [`guard`] for protected routes only; the login route is always
//! reachable.

pub mod guard;

pub use guard::{guard, GuardDecision};

use crate::session::Session;
use std::fmt;

// =============================================================================
// Routes
// =============================================================================

/// A resolved location in the console.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    AmapList,
    AmapDetail(String),
    OrderList,
    OrderDetail(String),
    Profile,
}

impl Route {
    /// Canonical path, e.g. `/amaps/42`.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::AmapList => "/amaps".to_string(),
            Route::AmapDetail(id) => format!("/amaps/{id}"),
            Route::OrderList => "/orders".to_string(),
            Route::OrderDetail(id) => format!("/orders/{id}"),
            Route::Profile => "/profile".to_string(),
        }
    }

    /// Translation key of the page title.
    #[must_use]
    pub fn title_key(&self) -> &'static str {
        match self {
            Route::Login => "auth.signIn",
            Route::Dashboard => "nav.dashboard",
            Route::AmapList | Route::AmapDetail(_) => "amaps.title",
            Route::OrderList => "orders.title",
            Route::OrderDetail(_) => "orders.details",
            Route::Profile => "profile.title",
        }
    }

    /// Top-level section, used for sidebar highlighting.
    #[must_use]
    pub fn section(&self) -> Section {
        match self {
            Route::Login => Section::None,
            Route::Dashboard => Section::Dashboard,
            Route::AmapList | Route::AmapDetail(_) => Section::Amaps,
            Route::OrderList | Route::OrderDetail(_) => Section::Orders,
            Route::Profile => Section::Profile,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Sidebar section a route belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    None,
    Dashboard,
    Amaps,
    Orders,
    Profile,
}

// =============================================================================
// Route table
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

/// One path segment of a route pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Literal(&'static str),
    /// A non-empty identifier, captured for the constructor.
    Param,
}

/// A route definition.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub segments: &'static [Segment],
    pub access: Access,
    build: fn(Option<String>) -> Route,
}

impl RouteDef {
    fn matches(&self, parts: &[&str]) -> Option<Route> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut param = None;
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param => param = Some((*part).to_string()),
            }
        }
        Some((self.build)(param))
    }
}

/// Outcome of navigating to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// The route is protected and the session is still settling.
    Loading(Route),
    Redirect(Route),
    NotFound,
}

/// The console's routes: `/login` is public, everything else sits in one
/// protected subtree rooted at `/`.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl Default for RouteTable {
    fn default() -> Self {
        use Segment::{Literal, Param};

        let routes = vec![
            RouteDef {
                segments: &[Literal("login")],
                access: Access::Public,
                build: |_| Route::Login,
            },
            RouteDef {
                segments: &[],
                access: Access::Protected,
                build: |_| Route::Dashboard,
            },
            RouteDef {
                segments: &[Literal("amaps")],
                access: Access::Protected,
                build: |_| Route::AmapList,
            },
            RouteDef {
                segments: &[Literal("amaps"), Param],
                access: Access::Protected,
                build: |id| Route::AmapDetail(id.unwrap_or_default()),
            },
            RouteDef {
                segments: &[Literal("orders")],
                access: Access::Protected,
                build: |_| Route::OrderList,
            },
            RouteDef {
                segments: &[Literal("orders"), Param],
                access: Access::Protected,
                build: |id| Route::OrderDetail(id.unwrap_or_default()),
            },
            RouteDef {
                segments: &[Literal("profile")],
                access: Access::Protected,
                build: |_| Route::Profile,
            },
        ];
        Self { routes }
    }
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// Parses a path into a route and its access level.
    ///
    /// One trailing slash is tolerated; empty inner segments are not.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<(Route, Access)> {
        let path = path.strip_prefix('/')?;
        let path = path.strip_suffix('/').unwrap_or(path);
        let parts: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };
        if parts.iter().any(|part| part.is_empty()) {
            return None;
        }

        self.routes
            .iter()
            .find_map(|def| def.matches(&parts).map(|route| (route, def.access)))
    }

    /// Resolves `path` and applies the guard to protected routes.
    #[must_use]
    pub fn navigate(&self, path: &str, session: &Session) -> Navigation {
        let Some((route, access)) = self.resolve(path) else {
            return Navigation::NotFound;
        };
        if access == Access::Public {
            return Navigation::Render(route);
        }
        match guard(session.status()) {
            GuardDecision::Render => Navigation::Render(route),
            GuardDecision::Loading => Navigation::Loading(route),
            GuardDecision::RedirectToLogin => Navigation::Redirect(Route::Login),
        }
    }
}
