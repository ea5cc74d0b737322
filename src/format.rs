//! Bilingual (English/French) number, currency, percentage and ordinal formatting.
//!
//! Every locale difference lives in one [`LocaleSpec`] table row, so formatting
//! functions look separators and patterns up instead of branching on the locale.
//!
//! ```
//! use factbook::format::{Locale, PercentStyle, format_grouped, format_percent};
//!
//! assert_eq!(format_grouped(12345.67, 1, Locale::En), "12,345.7");
//! assert_eq!(format_grouped(12345.67, 1, Locale::Fr), "12\u{a0}345,7");
//! assert_eq!(format_percent(Some(19.6), PercentStyle::Headline, Locale::En), "20%");
//! assert_eq!(format_percent(Some(19.6), PercentStyle::Detail, Locale::Fr), "19,6\u{a0}%");
//! ```

use crate::error::{ReportError, Result};
use num_format::{Locale as NumLocale, ToFormattedString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report language.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

/// Locale-specific separators, affixes and words.
#[derive(Debug)]
pub struct LocaleSpec {
    pub tag: &'static str,
    pub group_separator: &'static str,
    pub decimal_separator: char,
    /// Appended to percentages (`%` or no-break space + `%`).
    pub percent_suffix: &'static str,
    /// Billion-currency pattern; `{n}` is replaced by the formatted magnitude.
    pub billion_pattern: &'static str,
    pub not_applicable: &'static str,
    /// Ordinal suffixes for 1, 2, 3 and everything else.
    pub ordinal_suffixes: [&'static str; 4],
    /// Pick the suffix by last digit (21st) rather than by the whole number (21e);
    /// 11 to 13 then take the "everything else" suffix.
    pub ordinal_by_last_digit: bool,
}

static EN: LocaleSpec = LocaleSpec {
    tag: "en",
    group_separator: ",",
    decimal_separator: '.',
    percent_suffix: "%",
    billion_pattern: "${n} billion",
    not_applicable: "n/a",
    ordinal_suffixes: ["st", "nd", "rd", "th"],
    ordinal_by_last_digit: true,
};

static FR: LocaleSpec = LocaleSpec {
    tag: "fr",
    group_separator: "\u{a0}",
    decimal_separator: ',',
    percent_suffix: "\u{a0}%",
    billion_pattern: "{n}\u{a0}milliards\u{a0}$",
    not_applicable: "s.o.",
    ordinal_suffixes: ["er", "e", "e", "e"],
    ordinal_by_last_digit: false,
};

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Fr];

    pub fn spec(self) -> &'static LocaleSpec {
        match self {
            Locale::En => &EN,
            Locale::Fr => &FR,
        }
    }

    pub fn tag(self) -> &'static str {
        self.spec().tag
    }

    /// Map a user-provided tag to a locale.
    /// Accepted (case-insensitive): `en`, `en-CA`, `en_US`, `english`, `fr`, `fr-CA`, `fr_FR`, `french`.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().to_lowercase().replace('-', "_").as_str() {
            "en" | "en_ca" | "en_us" | "en_gb" | "english" => Ok(Locale::En),
            "fr" | "fr_ca" | "fr_fr" | "french" | "francais" | "français" => Ok(Locale::Fr),
            _ => Err(ReportError::UnsupportedLocale(tag.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::from_tag(s)
    }
}

/// Precision policy for percentages: headline narrative text rounds to an
/// integer, hover/detail text keeps one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentStyle {
    Headline,
    Detail,
}

/// Semantic unit tag of a displayed value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Values in thousands of currency, displayed in billions.
    CurrencyBillions,
    Percentage,
    Integer,
    #[default]
    Plain,
}

/// Round `value` exactly the way a `decimals`-digit cell displays it.
///
/// Uses the same decimal expansion as [`format_grouped`], so
/// `format_grouped(round_display(x, d), d, _) == format_grouped(x, d, _)`.
pub fn round_display(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

/// Format with locale grouping and exactly `decimals` fraction digits.
/// Non-finite values render as the locale's "not applicable" text.
pub fn format_grouped(value: f64, decimals: usize, locale: Locale) -> String {
    let spec = locale.spec();
    if !value.is_finite() {
        return spec.not_applicable.to_string();
    }
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = match int_part.parse::<u64>() {
        Ok(n) => n
            .to_formatted_string(&NumLocale::en)
            .replace(',', spec.group_separator),
        Err(_) => int_part.to_string(),
    };
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    let mut out = String::with_capacity(grouped.len() + decimals + 2);
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(spec.decimal_separator);
        out.push_str(frac);
    }
    out
}

/// Headline-style whole number: rounds half away from zero (`2.5` → `3`).
pub fn format_headline(value: f64, locale: Locale) -> String {
    format_grouped(value.round(), 0, locale)
}

/// Years are never grouped (`2021`, not `2,021`).
pub fn format_year(year: i32) -> String {
    year.to_string()
}

pub fn format_integer(value: i64, locale: Locale) -> String {
    let grouped = value
        .unsigned_abs()
        .to_formatted_string(&NumLocale::en)
        .replace(',', locale.spec().group_separator);
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Percentage text; `None` (an undefined ratio) renders as "not applicable".
pub fn format_percent(value: Option<f64>, style: PercentStyle, locale: Locale) -> String {
    let spec = locale.spec();
    match value {
        Some(v) if v.is_finite() => {
            let number = match style {
                PercentStyle::Headline => format_headline(v, locale),
                PercentStyle::Detail => format_grouped(v, 1, locale),
            };
            format!("{number}{}", spec.percent_suffix)
        }
        _ => spec.not_applicable.to_string(),
    }
}

/// Currency in billions from a value expressed in thousands of currency.
/// English puts the symbol first (`$1.2 billion`), French after (`1,2 milliards $`).
pub fn format_currency_billions(thousands: f64, decimals: usize, locale: Locale) -> String {
    let spec = locale.spec();
    if !thousands.is_finite() {
        return spec.not_applicable.to_string();
    }
    let billions = thousands / 1_000_000.0;
    let magnitude = if decimals == 0 {
        format_headline(billions.abs(), locale)
    } else {
        format_grouped(billions.abs(), decimals, locale)
    };
    let body = spec.billion_pattern.replace("{n}", &magnitude);
    let negative = billions < 0.0 && magnitude.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    if negative { format!("-{body}") } else { body }
}

/// Format `value` according to its unit tag.
pub fn format_value(value: f64, unit: UnitKind, decimals: usize, locale: Locale) -> String {
    match unit {
        UnitKind::CurrencyBillions => format_currency_billions(value, decimals, locale),
        UnitKind::Percentage => {
            let style = if decimals == 0 {
                PercentStyle::Headline
            } else {
                PercentStyle::Detail
            };
            format_percent(Some(value), style, locale)
        }
        UnitKind::Integer => format_grouped(value, 0, locale),
        UnitKind::Plain => format_grouped(value, decimals, locale),
    }
}

/// Attach the unit's affixes to an already formatted magnitude
/// (`12.3` → `$12.3 billion`, `12,3` → `12,3 milliards $`).
pub fn with_unit(number: &str, unit: UnitKind, locale: Locale) -> String {
    let spec = locale.spec();
    match unit {
        UnitKind::CurrencyBillions => spec.billion_pattern.replace("{n}", number),
        UnitKind::Percentage => format!("{number}{}", spec.percent_suffix),
        UnitKind::Integer | UnitKind::Plain => number.to_string(),
    }
}

/// `1st`, `2nd`, `3rd`, `11th` / `1er`, `2e`.
pub fn format_ordinal(n: u32, locale: Locale) -> String {
    let spec = locale.spec();
    let selector = match (spec.ordinal_by_last_digit, n % 100) {
        (true, 11..=13) => 0,
        (true, _) => n % 10,
        (false, _) => n,
    };
    let suffix = match selector {
        1..=3 => spec.ordinal_suffixes[selector as usize - 1],
        _ => spec.ordinal_suffixes[3],
    };
    format!("{n}{suffix}")
}

/// Inverse of [`format_grouped`]: strip group separators and normalise the decimal mark.
pub fn parse_number(text: &str, locale: Locale) -> Option<f64> {
    let spec = locale.spec();
    let cleaned: String = text
        .trim()
        .replace(spec.group_separator, "")
        .chars()
        .filter(|c| !matches!(c, '\u{a0}' | '\u{202f}' | ' '))
        .map(|c| if c == spec.decimal_separator { '.' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_zero_has_no_sign() {
        assert_eq!(format_grouped(-0.04, 1, Locale::En), "0.0");
        assert_eq!(format_grouped(-1.26, 1, Locale::En), "-1.3");
    }

    #[test]
    fn large_values_group_by_thousands() {
        assert_eq!(format_grouped(1_234_567.0, 0, Locale::En), "1,234,567");
        assert_eq!(
            format_grouped(1_234_567.0, 2, Locale::Fr),
            "1\u{a0}234\u{a0}567,00"
        );
    }

    #[test]
    fn ordinal_suffixes_come_from_the_locale_table() {
        assert_eq!(format_ordinal(0, Locale::En), "0th");
        assert_eq!(format_ordinal(113, Locale::En), "113th");
        assert_eq!(format_ordinal(3, Locale::Fr), "3e");
        assert_eq!(Locale::Fr.spec().ordinal_suffixes[0], "er");
    }

    #[test]
    fn integer_values_round_like_table_cells() {
        for v in [0.5, 2.5, 3.5, 1234.5] {
            let shown = format_value(v, UnitKind::Integer, 1, Locale::En);
            assert_eq!(parse_number(&shown, Locale::En), Some(round_display(v, 0)));
        }
    }

    #[test]
    fn tags_are_case_and_separator_insensitive() {
        assert_eq!(Locale::from_tag("EN-ca").unwrap(), Locale::En);
        assert_eq!(Locale::from_tag("fr_CA").unwrap(), Locale::Fr);
        assert!(Locale::from_tag("de").is_err());
    }
}
