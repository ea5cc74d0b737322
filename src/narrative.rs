//! Text lookup and template-driven narrative sentences.
//!
//! Each locale has its own template string per key, with `{placeholder}` slots.
//! The two languages therefore order fragments independently ("peaked in 2021
//! at $150 billion" vs "C'est en 2021 que … a atteint 150 milliards $").

use crate::error::{ReportError, Result};
use crate::format::{
    Locale, PercentStyle, format_currency_billions, format_grouped, format_ordinal,
    format_percent, format_year,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Lookup of translated strings by key.
pub trait TextLookup {
    fn text(&self, key: &str, locale: Locale) -> Result<&str>;
}

/// Built-in strings: `(key, English, French)`.
const BUILTIN: &[(&str, &str, &str)] = &[
    ("year", "Year", "Année"),
    ("total", "Total", "Total"),
    ("no_data", "No data available.", "Aucune donnée disponible."),
    (
        "load_error",
        "The data could not be loaded.",
        "Les données n'ont pas pu être chargées.",
    ),
    (
        "narrative.decline",
        "{title} peaked at {peak_value} in {peak_year}. By {latest_year}, it had declined {decline_pct} to {latest_value}.",
        "C'est en {peak_year} que {title} a atteint un sommet de {peak_value}. En {latest_year}, le total avait reculé de {decline_pct} pour s'établir à {latest_value}.",
    ),
    (
        "narrative.at_peak",
        "{title} reached {latest_value} in {latest_year}, the highest level since {first_year}.",
        "En {latest_year}, {title} a atteint {latest_value}, le niveau le plus élevé depuis {first_year}.",
    ),
    (
        "narrative.rebound",
        "Compared with {reference_year}, the total changed by {rebound_pct}.",
        "Par rapport à {reference_year}, le total a varié de {rebound_pct}.",
    ),
    (
        "narrative.top_share",
        "In {year}, {category} accounted for the largest share ({share}).",
        "{category} représentait la plus grande part ({share}) en {year}.",
    ),
    (
        "narrative.growth",
        "Between {base_year} and {latest_year}, the total changed by {growth_pct}.",
        "De {base_year} à {latest_year}, le total a varié de {growth_pct}.",
    ),
    (
        "chart.hover",
        "{category} ({year}): {value} ({share})",
        "{category} ({year}) : {value} ({share})",
    ),
    (
        "chart.description",
        "Stacked bar chart of {title} by category, {first_year} to {last_year}.",
        "Graphique à barres empilées : {title} par catégorie, de {first_year} à {last_year}.",
    ),
    (
        "chart.donut_description",
        "Donut chart of {title} by category for {year}.",
        "Graphique en anneau : {title} par catégorie en {year}.",
    ),
    (
        "table.cell_label",
        "{category}, {year}: {value}",
        "{category}, {year} : {value}",
    ),
    ("rank.country", "Resource", "Ressource"),
    ("rank.reserves", "Reserves", "Réserves"),
    ("rank.production", "Production", "Production"),
    ("rank.exports", "Exports", "Exportations"),
    ("rank.title", "World rankings", "Classement mondial"),
    ("rank.file_suffix", "rankings", "classement"),
];

/// Per-locale overrides as they appear in page configuration (`[text.en]`, `[text.fr]`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextOverrides {
    #[serde(default)]
    pub en: HashMap<String, String>,
    #[serde(default)]
    pub fr: HashMap<String, String>,
}

/// In-memory [`TextLookup`]: built-in defaults plus overrides.
#[derive(Debug, Clone, Default)]
pub struct TextCatalog {
    entries: HashMap<(Locale, String), String>,
}

impl TextCatalog {
    /// Empty catalog; every lookup fails until strings are inserted.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut cat = Self::empty();
        for (key, en, fr) in BUILTIN {
            cat.insert(Locale::En, key, en);
            cat.insert(Locale::Fr, key, fr);
        }
        cat
    }

    pub fn insert(&mut self, locale: Locale, key: &str, value: &str) {
        self.entries
            .insert((locale, key.to_string()), value.to_string());
    }

    pub fn with_overrides(mut self, overrides: &TextOverrides) -> Self {
        for (locale, map) in [(Locale::En, &overrides.en), (Locale::Fr, &overrides.fr)] {
            for (k, v) in map {
                self.insert(locale, k, v);
            }
        }
        self
    }

    /// Parse overrides from TOML (`[en] "narrative.decline" = "…"`) on top of the built-ins.
    /// Dotted keys must be quoted, otherwise TOML reads them as nested tables.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let overrides: TextOverrides = toml::from_str(s)?;
        Ok(Self::builtin().with_overrides(&overrides))
    }
}

impl TextLookup for TextCatalog {
    fn text(&self, key: &str, locale: Locale) -> Result<&str> {
        self.entries
            .get(&(locale, key.to_string()))
            .map(String::as_str)
            .ok_or_else(|| ReportError::MissingText {
                key: key.to_string(),
                locale,
            })
    }
}

/// A typed value bound to a template placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Year(i32),
    /// Headline percentage (rounded to an integer).
    Percent(Option<f64>),
    /// Detail percentage (one decimal).
    PercentDetail(Option<f64>),
    /// Thousands of currency rendered in billions with the given fraction digits.
    Currency { thousands: f64, decimals: usize },
    Number { value: f64, decimals: usize },
    Ordinal(u32),
    Text(String),
}

impl Slot {
    pub fn render(&self, locale: Locale) -> String {
        match self {
            Slot::Year(y) => format_year(*y),
            Slot::Percent(v) => format_percent(*v, PercentStyle::Headline, locale),
            Slot::PercentDetail(v) => format_percent(*v, PercentStyle::Detail, locale),
            Slot::Currency {
                thousands,
                decimals,
            } => format_currency_billions(*thousands, *decimals, locale),
            Slot::Number { value, decimals } => format_grouped(*value, *decimals, locale),
            Slot::Ordinal(n) => format_ordinal(*n, locale),
            Slot::Text(s) => s.clone(),
        }
    }
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_][a-z0-9_]*)\}").expect("placeholder regex"));

/// Fill the `locale` template for `key` with `slots`.
///
/// Every placeholder must be bound; unused slots are ignored.
pub fn render_template(
    lookup: &dyn TextLookup,
    key: &str,
    locale: Locale,
    slots: &[(&str, Slot)],
) -> Result<String> {
    let template = lookup.text(key, locale)?;
    fill(key, template, locale, slots)
}

fn fill(key: &str, template: &str, locale: Locale, slots: &[(&str, Slot)]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        let slot = slots
            .iter()
            .find(|(n, _)| *n == name.as_str())
            .map(|(_, s)| s)
            .ok_or_else(|| ReportError::UnknownPlaceholder {
                template: key.to_string(),
                placeholder: name.as_str().to_string(),
            })?;
        let mut rendered = slot.render(locale);
        // "s.o." before a sentence's closing period.
        if rendered.ends_with('.') && template[whole.end()..].starts_with('.') {
            rendered.pop();
        }
        out.push_str(&rendered);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_key_exists_in_both_locales() {
        let cat = TextCatalog::builtin();
        for (key, _, _) in BUILTIN {
            for locale in Locale::ALL {
                assert!(cat.text(key, locale).is_ok(), "{key} missing for {locale}");
            }
        }
    }

    #[test]
    fn unbound_placeholder_is_an_error() {
        let cat = TextCatalog::builtin();
        let err = render_template(&cat, "narrative.rebound", Locale::En, &[]).unwrap_err();
        assert!(matches!(err, ReportError::UnknownPlaceholder { .. }));
    }
}
