//! Configuration: per-page TOML files and runtime [`Settings`].
//!
//! A page file names its dataset, categories, unit and text overrides:
//!
//! ```toml
//! id = "capex"
//! title = { en = "Capital expenditures", fr = "Dépenses en immobilisations" }
//! dataset = { en = "capital_expenditures", fr = "depenses_en_immobilisations" }
//! reference_year = 2019
//!
//! [unit]
//! divisor = 1000000
//! kind = "currency_billions"
//! suffix = { en = "($ billions)", fr = "(milliards $)" }
//!
//! [[categories]]
//! key = "oil_gas"
//! vector = "capex_oil_gas"
//! name = { en = "Oil and gas", fr = "Pétrole et gaz" }
//! ```
//!
//! Settings come from `<config dir>/factbook/settings.toml` and are then
//! overridden by `FACTBOOK_LOCALE`, `FACTBOOK_OUTPUT_DIR` and `FACTBOOK_FONT`.

use crate::error::{ReportError, Result};
use crate::format::Locale;
use crate::metrics::DEFAULT_TOP_K;
use crate::models::{Category, Localized, RankingEntry};
use crate::narrative::TextOverrides;
use crate::projection::{TOTAL_KEY, ValueFormat};
use crate::rankings;
use crate::viz::util::parse_hex;
use crate::viz::{ChartKind, DEFAULT_HEIGHT, DEFAULT_WIDTH, LEGEND_BAND_PX, TITLE_BAND_PX};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub kind: ChartKind,
    #[serde(default = "ChartConfig::default_width")]
    pub width: u32,
    #[serde(default = "ChartConfig::default_height")]
    pub height: u32,
}

impl ChartConfig {
    fn default_width() -> u32 {
        DEFAULT_WIDTH
    }

    fn default_height() -> u32 {
        DEFAULT_HEIGHT
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            kind: ChartKind::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageConfig {
    pub id: String,
    pub title: Localized,
    /// File stem of downloads, per locale.
    pub dataset: Localized,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub total_vector: Option<String>,
    #[serde(default = "default_true")]
    pub include_total: bool,
    #[serde(default)]
    pub reference_year: Option<i32>,
    #[serde(default)]
    pub base_year: Option<i32>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub unit: ValueFormat,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub rankings: Vec<RankingEntry>,
    #[serde(default)]
    pub text: TextOverrides,
}

fn is_file_stem(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !s.starts_with('.')
}

impl PageConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PageConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ReportError::Config(format!("{}: {e}", path.display())))?;
        let cfg = Self::from_toml_str(&text)?;
        log::debug!("loaded page `{}` from {}", cfg.id, path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(ReportError::Config(format!("page `{}`: {msg}", self.id)));

        if self.id.trim().is_empty() {
            return Err(ReportError::Config("page id is empty".into()));
        }
        for locale in Locale::ALL {
            let stem = self.dataset.get(locale);
            if !is_file_stem(stem) {
                return bad(format!("dataset name `{stem}` ({locale}) is not a file stem"));
            }
        }
        if self.categories.is_empty() && self.total_vector.is_none() {
            return bad("no categories and no total_vector".into());
        }

        let mut keys = HashSet::new();
        for c in &self.categories {
            if c.key == TOTAL_KEY {
                return bad(format!("category key `{TOTAL_KEY}` is reserved"));
            }
            if !keys.insert(c.key.as_str()) {
                return bad(format!("category `{}` appears twice", c.key));
            }
            if let Some(color) = &c.color {
                if parse_hex(color).is_none() {
                    return bad(format!("category `{}` has invalid color `{color}`", c.key));
                }
            }
        }

        if !(self.unit.divisor.is_finite() && self.unit.divisor > 0.0) {
            return bad(format!("unit divisor {} must be positive", self.unit.divisor));
        }
        if self.top_k == 0 {
            return bad("top_k must be at least 1".into());
        }
        let min_h = TITLE_BAND_PX + LEGEND_BAND_PX + 64;
        if self.chart.width < 64 || self.chart.height < min_h {
            return bad(format!(
                "chart {}x{} is too small (minimum 64x{min_h})",
                self.chart.width, self.chart.height
            ));
        }
        rankings::ordered(&self.rankings)?;
        Ok(())
    }

    pub fn category_keys(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.key.as_str()).collect()
    }
}

/// Runtime settings shared by every page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub locale: Locale,
    pub output_dir: PathBuf,
    pub font: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            output_dir: PathBuf::from("."),
            font: None,
        }
    }
}

impl Settings {
    /// `<config dir>/factbook/settings.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("factbook").join("settings.toml"))
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            log::debug!("no settings file at {}", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&text)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply `FACTBOOK_*` overrides read through `lookup`.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tag) = lookup("FACTBOOK_LOCALE") {
            self.locale = Locale::from_tag(&tag)?;
        }
        if let Some(dir) = lookup("FACTBOOK_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Some(font) = lookup("FACTBOOK_FONT") {
            self.font = (!font.trim().is_empty()).then(|| PathBuf::from(font));
        }
        Ok(self)
    }

    /// Default file, then the process environment.
    pub fn resolve() -> Result<Self> {
        Self::load(Self::default_path().as_deref())?.apply_env(|k| std::env::var(k).ok())
    }
}
