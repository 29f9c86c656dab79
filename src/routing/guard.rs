// SPDX-License-Identifier: MPL-2.0
//! Access decision for the protected subtree.

use crate::session::SessionStatus;

/// What the protected subtree should do for a given session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Restore or sign-in still running: show a neutral placeholder.
    Loading,
    RedirectToLogin,
    Render,
}

/// Decides from the session status alone.
///
/// `Authenticating` never redirects, so a persisted session being restored
/// does not flash the login page.
#[must_use]
pub fn guard(status: SessionStatus) -> GuardDecision {
    match status {
        SessionStatus::Authenticating => GuardDecision::Loading,
        SessionStatus::Unauthenticated | SessionStatus::Error => GuardDecision::RedirectToLogin,
        SessionStatus::Authenticated => GuardDecision::Render,
    }
}
