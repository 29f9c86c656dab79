// SPDX-License-Identifier: MPL-2.0
//! User-facing collaborators of the session and locale core.
//!
//! Each component follows the "state down, messages up" pattern: it reads
//! from the stores, and reports what happened as an `Event` for the caller
//! to act on. None of them owns session or locale state.
//!
//! - [`login`] - Sign-in form with required-field validation
//! - [`language_selector`] - Language badge and switcher
//! - [`navbar`] - Signed-in user, language badge, logout
//! - [`sidebar`] - Section links with active highlighting
//! - [`notifications`] - Toast notification system for user feedback

pub mod language_selector;
pub mod login;
pub mod navbar;
pub mod notifications;
pub mod sidebar;
