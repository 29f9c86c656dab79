// SPDX-License-Identifier: MPL-2.0
//! `amap_console` is the client core of the AMAP administration console:
//! who is signed in, which language the console speaks, and which pages the
//! current session may open.
//!
//! - [`session`] - Session state machine over a pluggable auth provider
//! - [`i18n`] - Active locale, translation with fallback, formatting
//! - [`routing`] - Route table and the guard for the protected subtree
//! - [`ui`] - Login form, language selector, navbar, sidebar, toasts
//! - [`app`] - Composition root used by the binary
//!
//! Both stores publish whole-value replacements through [`state::StateCell`]
//! and persist through a [`storage::KeyValueStore`].

pub mod app;
pub mod config;
pub mod error;
pub mod i18n;
pub mod routing;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;
