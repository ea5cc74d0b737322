use crate::error::{ReportError, Result};
use crate::format::Locale;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One year of a dataset: per-category values (thousands of currency) plus their total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
    pub total: f64,
}

impl YearRecord {
    pub fn new<K, I>(year: i32, values: I, total: f64) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self {
            year,
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            total,
        }
    }

    /// Record whose total is the sum of its category values.
    pub fn from_values<K, I>(year: i32, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let values: BTreeMap<String, f64> =
            values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let total = values.values().sum();
        Self {
            year,
            values,
            total,
        }
    }

    /// Record with only a total (no category breakdown).
    pub fn total_only(year: i32, total: f64) -> Self {
        Self {
            year,
            values: BTreeMap::new(),
            total,
        }
    }

    /// Value for `key`; a missing category is an error, never a silent zero.
    pub fn value(&self, key: &str) -> Result<f64> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| ReportError::MissingCategory {
                year: self.year,
                key: key.to_string(),
            })
    }
}

/// Chronologically ordered, year-unique sequence of [`YearRecord`]s.
///
/// Order is validated, never repaired: the series is not re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<YearRecord>", into = "Vec<YearRecord>")]
pub struct Series {
    records: Vec<YearRecord>,
}

impl Series {
    pub fn new(records: Vec<YearRecord>) -> Result<Self> {
        for rec in &records {
            let bad = rec
                .values
                .iter()
                .map(|(k, v)| (k.as_str(), *v))
                .chain(std::iter::once(("total", rec.total)))
                .find(|(_, v)| !v.is_finite() || *v < 0.0);
            if let Some((key, value)) = bad {
                return Err(ReportError::InvalidValue {
                    year: rec.year,
                    key: key.to_string(),
                    value,
                });
            }
        }
        for pair in records.windows(2) {
            let (prev, next) = (pair[0].year, pair[1].year);
            if next == prev {
                return Err(ReportError::DuplicateYear(next));
            }
            if next < prev {
                return Err(ReportError::UnorderedYears { prev, next });
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[YearRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, YearRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    pub fn get(&self, year: i32) -> Option<&YearRecord> {
        self.records.iter().find(|r| r.year == year)
    }

    pub fn position(&self, year: i32) -> Option<usize> {
        self.records.iter().position(|r| r.year == year)
    }
}

impl TryFrom<Vec<YearRecord>> for Series {
    type Error = ReportError;

    fn try_from(records: Vec<YearRecord>) -> Result<Self> {
        Series::new(records)
    }
}

impl From<Series> for Vec<YearRecord> {
    fn from(s: Series) -> Self {
        s.records
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a YearRecord;
    type IntoIter = std::slice::Iter<'a, YearRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A string in both report languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    pub en: String,
    pub fr: String,
}

impl Localized {
    pub fn new(en: impl Into<String>, fr: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            fr: fr.into(),
        }
    }

    /// Same text in both languages (codes, proper nouns).
    pub fn same(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            en: text.clone(),
            fr: text,
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Fr => &self.fr,
        }
    }
}

/// A named sub-component of a yearly total (a sector, an energy source, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    /// Dataset vector holding this category's values (defaults to `key`).
    #[serde(default)]
    pub vector: Option<String>,
    pub name: Localized,
    /// Display color as `#RRGGBB`; palette color by position when absent.
    #[serde(default)]
    pub color: Option<String>,
}

impl Category {
    pub fn new(key: impl Into<String>, name: Localized) -> Self {
        Self {
            key: key.into(),
            vector: None,
            name,
            color: None,
        }
    }

    pub fn vector(&self) -> &str {
        self.vector.as_deref().unwrap_or(&self.key)
    }
}

/// A rank position or "not applicable".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Rank {
    Ranked(u32),
    #[default]
    NotApplicable,
}

impl From<Option<u32>> for Rank {
    fn from(v: Option<u32>) -> Self {
        match v {
            Some(n) if n > 0 => Rank::Ranked(n),
            _ => Rank::NotApplicable,
        }
    }
}

impl From<Rank> for Option<u32> {
    fn from(r: Rank) -> Self {
        match r {
            Rank::Ranked(n) => Some(n),
            Rank::NotApplicable => None,
        }
    }
}

/// Static world-ranking lookup row (independent of any series).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub key: String,
    pub name: Localized,
    pub display_order: u32,
    #[serde(default)]
    pub reserve_rank: Rank,
    #[serde(default)]
    pub production_rank: Rank,
    #[serde(default)]
    pub export_rank: Rank,
}
