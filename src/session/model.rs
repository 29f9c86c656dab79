// SPDX-License-Identifier: MPL-2.0
//! Session data model.

use super::error::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Identity
// =============================================================================

/// Stable user identifier issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single authorization attribute carried by an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    AmapAdmin,
    Member,
    Baker,
}

impl Role {
    /// Returns the i18n key of the role's display label.
    pub fn i18n_key(self) -> &'static str {
        match self {
            Role::SuperAdmin | Role::AmapAdmin => "roles.admin",
            Role::Member => "roles.member",
            Role::Baker => "roles.baker",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::AmapAdmin => "amap_admin",
            Role::Member => "member",
            Role::Baker => "baker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the signed-in user. Replaced wholesale on every sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub display_name: String,
}

// =============================================================================
// Session
// =============================================================================

/// Coarse session status, as consumed by the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Error,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Unauthenticated => "unauthenticated",
            SessionStatus::Authenticating => "authenticating",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Authentication state of the process.
///
/// The identity lives inside the `Authenticated` variant and the error
/// inside `Failed`, so "user present iff authenticated" cannot be violated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated(UserIdentity),
    Failed(AuthError),
}

impl Session {
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self {
            Session::Unauthenticated => SessionStatus::Unauthenticated,
            Session::Authenticating => SessionStatus::Authenticating,
            Session::Authenticated(_) => SessionStatus::Authenticated,
            Session::Failed(_) => SessionStatus::Error,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Session::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&AuthError> {
        match self {
            Session::Failed(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}
