// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Locale**: Fallback language and formatting defaults
//! - **Session**: Bounds on the boot-time session restore

// ==========================================================================
// Locale Defaults
// ==========================================================================

/// Locale consulted when a key is missing from the active bundle.
pub const DEFAULT_FALLBACK_LOCALE: &str = "fr";

/// Date pattern key used when a caller passes an unknown key.
pub const DEFAULT_DATE_PATTERN: &str = "medium";

/// ISO 4217 code used when a caller passes an unsupported currency.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Maximum fraction digits rendered by `format_number`.
pub const MAX_NUMBER_FRACTION_DIGITS: usize = 3;

/// Fraction digits rendered by `format_currency`.
pub const CURRENCY_FRACTION_DIGITS: usize = 2;

// ==========================================================================
// Session Defaults
// ==========================================================================

/// Default upper bound for restoring a persisted session at boot (ms).
pub const DEFAULT_RESTORE_TIMEOUT_MS: u64 = 5_000;

/// Minimum restore timeout (ms).
pub const MIN_RESTORE_TIMEOUT_MS: u64 = 100;

/// Maximum restore timeout (ms).
pub const MAX_RESTORE_TIMEOUT_MS: u64 = 60_000;

/// Lifetime of tokens issued by the in-process directory provider (seconds).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
