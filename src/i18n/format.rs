// SPDX-License-Identifier: MPL-2.0
//! Locale-aware formatting of dates, numbers and monetary amounts.
//!
//! Number and currency output follows per-language conventions:
//!
//! | Language | Number      | Currency   |
//! |----------|-------------|------------|
//! | `en`     | `1,234.5`   | `€42.50`   |
//! | `fr`     | `1 234,5`   | `42,50 €`  |
//!
//! French groups with a narrow no-break space (U+202F) and separates the
//! currency symbol with a no-break space (U+00A0). Other languages use the
//! English conventions. Date patterns are chrono `strftime` strings read from
//! the active bundle and rendered with localized month and day names.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

use crate::config::{CURRENCY_FRACTION_DIGITS, MAX_NUMBER_FRACTION_DIGITS};

// =============================================================================
// Date patterns
// =============================================================================

/// Named date pattern, resolved through `dates.formats.<name>` in a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePattern {
    Short,
    #[default]
    Medium,
    Long,
}

impl DatePattern {
    pub const ALL: [DatePattern; 3] = [DatePattern::Short, DatePattern::Medium, DatePattern::Long];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DatePattern::Short => "short",
            DatePattern::Medium => "medium",
            DatePattern::Long => "long",
        }
    }

    /// Bundle key holding the `strftime` pattern.
    #[must_use]
    pub fn resource_key(self) -> String {
        format!("dates.formats.{}", self.as_str())
    }

    /// Pattern used when a bundle has no entry for this key.
    #[must_use]
    pub fn builtin(self) -> &'static str {
        match self {
            DatePattern::Short => "%Y-%m-%d",
            DatePattern::Medium => "%d %b %Y",
            DatePattern::Long => "%d %B %Y",
        }
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatePattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatePattern::ALL
            .into_iter()
            .find(|pattern| pattern.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown date pattern: {s}"))
    }
}

// =============================================================================
// Currencies
// =============================================================================

/// Supported ISO-4217 currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
    Chf,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Eur, Currency::Usd, Currency::Gbp, Currency::Chf];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Chf => "CHF",
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Usd => "$",
            Currency::Gbp => "£",
            Currency::Chf => "CHF",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported currency: {s}"))
    }
}

// =============================================================================
// Conventions
// =============================================================================

/// Separators and symbol placement for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conventions {
    pub decimal: char,
    pub group: char,
    pub symbol_after: bool,
    pub chrono_locale: chrono::Locale,
}

const ENGLISH: Conventions = Conventions {
    decimal: '.',
    group: ',',
    symbol_after: false,
    chrono_locale: chrono::Locale::en_US,
};

const FRENCH: Conventions = Conventions {
    decimal: ',',
    group: '\u{202F}',
    symbol_after: true,
    chrono_locale: chrono::Locale::fr_FR,
};

const NO_BREAK_SPACE: char = '\u{00A0}';

/// Conventions for a locale, chosen by its language subtag.
#[must_use]
pub fn conventions(locale: &LanguageIdentifier) -> Conventions {
    match locale.language.as_str() {
        "fr" => FRENCH,
        _ => ENGLISH,
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats a number with grouping and up to three fraction digits.
#[must_use]
pub fn format_number(value: f64, conv: &Conventions) -> String {
    format_decimal(value, 0, MAX_NUMBER_FRACTION_DIGITS, conv)
}

/// Formats an amount with exactly two fraction digits and the currency symbol.
#[must_use]
pub fn format_currency(amount: f64, currency: Currency, conv: &Conventions) -> String {
    if !amount.is_finite() {
        return format_decimal(amount, 0, 0, conv);
    }
    let digits = format_decimal(
        amount.abs(),
        CURRENCY_FRACTION_DIGITS,
        CURRENCY_FRACTION_DIGITS,
        conv,
    );
    let sign = if is_negative(amount, CURRENCY_FRACTION_DIGITS) {
        "-"
    } else {
        ""
    };
    let symbol = currency.symbol();

    if conv.symbol_after {
        format!("{sign}{digits}{NO_BREAK_SPACE}{symbol}")
    } else if symbol.chars().all(char::is_alphabetic) {
        format!("{sign}{symbol}{NO_BREAK_SPACE}{digits}")
    } else {
        format!("{sign}{symbol}{digits}")
    }
}

/// Renders a calendar date with a `strftime` pattern and localized names.
///
/// Returns `None` if the pattern contains an invalid specifier.
#[must_use]
pub fn format_date(date: NaiveDate, pattern: &str, conv: &Conventions) -> Option<String> {
    let instant = date.and_time(NaiveTime::MIN).and_utc();
    let mut out = String::new();
    write!(out, "{}", instant.format_localized(pattern, conv.chrono_locale)).ok()?;
    Some(out)
}

/// Substitutes `{name}` placeholders in a single pass.
///
/// Unknown placeholders are kept verbatim and substituted values are never
/// re-scanned.
#[must_use]
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match args.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn format_decimal(value: f64, min_fraction: usize, max_fraction: usize, conv: &Conventions) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-∞" } else { "∞" }.to_string();
    }

    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let kept = fraction.trim_end_matches('0').len().max(min_fraction);
    let fraction = &fraction[..kept.min(fraction.len())];

    let mut out = String::with_capacity(fixed.len() + integer.len() / 3 * 3 + 1);
    if is_negative(value, max_fraction) {
        out.push('-');
    }
    push_grouped(&mut out, integer, conv.group);
    if !fraction.is_empty() {
        out.push(conv.decimal);
        out.push_str(fraction);
    }
    out
}

/// True when the value still shows a non-zero digit once rounded, so that
/// `-0.0001` does not render as `-0`.
fn is_negative(value: f64, fraction_digits: usize) -> bool {
    value < 0.0
        && format!("{:.*}", fraction_digits, value.abs())
            .bytes()
            .any(|b| matches!(b, b'1'..=b'9'))
}

fn push_grouped(out: &mut String, digits: &str, separator: char) {
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
}
