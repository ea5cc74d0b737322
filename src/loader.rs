//! Dataset loading: the tidy `vector,ref_date,value` CSV the factbook site
//! publishes, read from disk or fetched once over HTTP(S).
//!
//! Each page maps its categories (and optionally a total) onto dataset
//! vectors; the loader pivots matching observations into [`YearRecord`]s.

use crate::error::{ReportError, Result};
use crate::models::{Category, Series, YearRecord};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

/// Supplies the ordered yearly series for one page.
pub trait DatasetLoader {
    fn load(&self) -> Result<Series>;

    /// Human-readable source for logs and error messages.
    fn describe(&self) -> String;
}

/// Which dataset vectors feed a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesMapping {
    /// `(category key, vector)` in display order.
    pub categories: Vec<(String, String)>,
    /// Vector holding the yearly total; the sum of the categories when absent.
    pub total_vector: Option<String>,
}

impl SeriesMapping {
    pub fn from_categories(categories: &[Category], total_vector: Option<&str>) -> Self {
        Self {
            categories: categories
                .iter()
                .map(|c| (c.key.clone(), c.vector().to_string()))
                .collect(),
            total_vector: total_vector.map(str::to_string),
        }
    }

    fn wanted(&self) -> BTreeSet<&str> {
        self.categories
            .iter()
            .map(|(_, v)| v.as_str())
            .chain(self.total_vector.as_deref())
            .collect()
    }
}

/// Shell-style vector pattern: `*` matches any run, `?` one character.
#[derive(Debug, Clone)]
pub struct VectorFilter {
    pattern: String,
    re: Regex,
}

impl VectorFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut re = String::with_capacity(pattern.len() + 8);
        re.push('^');
        for ch in pattern.chars() {
            match ch {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                c => re.push_str(&regex::escape(&c.to_string())),
            }
        }
        re.push('$');
        let re = Regex::new(&re)
            .map_err(|e| ReportError::Config(format!("bad vector pattern `{pattern}`: {e}")))?;
        Ok(Self {
            pattern: pattern.to_string(),
            re,
        })
    }

    pub fn matches(&self, vector: &str) -> bool {
        self.re.is_match(vector)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[derive(Debug, Deserialize)]
struct TidyRow {
    vector: String,
    ref_date: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    value: Option<f64>,
}

/// Year of a `ref_date` cell: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
pub fn parse_ref_year(ref_date: &str) -> Result<i32> {
    let s = ref_date.trim();
    let bad = || ReportError::Load(format!("unrecognised ref_date `{ref_date}`"));
    let year = match s.len() {
        4 => s.parse::<i32>().map_err(|_| bad())?,
        7 => NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map_err(|_| bad())?
            .year(),
        10 => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| bad())?
            .year(),
        _ => return Err(bad()),
    };
    Ok(year)
}

fn rows(text: &str) -> impl Iterator<Item = Result<TidyRow>> + '_ {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
        .into_deserialize::<TidyRow>()
        .map(|r| r.map_err(ReportError::from))
}

/// Pivot tidy CSV text into a series for `mapping`.
///
/// Only years where every mapped vector has a value are kept; partial years
/// are dropped with a warning. Two observations of one vector in one year are
/// an error.
pub fn series_from_tidy_csv(text: &str, mapping: &SeriesMapping) -> Result<Series> {
    let wanted = mapping.wanted();
    if wanted.is_empty() {
        return Err(ReportError::Config(
            "page maps no category or total vector".into(),
        ));
    }

    let mut by_year: BTreeMap<i32, BTreeMap<String, f64>> = BTreeMap::new();
    for row in rows(text) {
        let row = row?;
        if !wanted.contains(row.vector.as_str()) {
            continue;
        }
        let Some(value) = row.value else {
            log::debug!("skipping empty value for {} at {}", row.vector, row.ref_date);
            continue;
        };
        let year = parse_ref_year(&row.ref_date)?;
        if by_year
            .entry(year)
            .or_default()
            .insert(row.vector.clone(), value)
            .is_some()
        {
            return Err(ReportError::Load(format!(
                "vector `{}` has more than one value for {year}",
                row.vector
            )));
        }
    }

    let mut records = Vec::with_capacity(by_year.len());
    for (year, observed) in by_year {
        let missing: Vec<&str> = wanted
            .iter()
            .copied()
            .filter(|v| !observed.contains_key(*v))
            .collect();
        if !missing.is_empty() {
            log::warn!("dropping {year}: no value for {}", missing.join(", "));
            continue;
        }
        let values: Vec<(String, f64)> = mapping
            .categories
            .iter()
            .map(|(key, vector)| (key.clone(), observed[vector.as_str()]))
            .collect();
        let record = match &mapping.total_vector {
            Some(tv) => YearRecord::new(year, values, observed[tv.as_str()]),
            None => YearRecord::from_values(year, values),
        };
        records.push(record);
    }
    log::debug!("pivoted {} yearly records", records.len());
    Series::new(records)
}

/// Distinct vector names in tidy CSV text, sorted, optionally filtered.
pub fn list_vectors(text: &str, filter: Option<&VectorFilter>) -> Result<Vec<String>> {
    let mut names = BTreeSet::new();
    for row in rows(text) {
        let row = row?;
        if filter.is_none_or(|f| f.matches(&row.vector)) {
            names.insert(row.vector);
        }
    }
    Ok(names.into_iter().collect())
}

/// Reads a tidy CSV file from disk.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    pub path: PathBuf,
    pub mapping: SeriesMapping,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>, mapping: SeriesMapping) -> Self {
        Self {
            path: path.into(),
            mapping,
        }
    }
}

impl DatasetLoader for CsvLoader {
    fn load(&self) -> Result<Series> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| ReportError::Load(format!("{}: {e}", self.path.display())))?;
        series_from_tidy_csv(&text, &self.mapping)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetches a tidy CSV over HTTP(S): one request, no retry.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    pub url: String,
    pub mapping: SeriesMapping,
    http: HttpClient,
}

impl HttpLoader {
    pub fn new(url: impl Into<String>, mapping: SeriesMapping) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(None::<Duration>)
            .redirect(Policy::limited(5))
            .user_agent(concat!("factbook-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            mapping,
            http,
        })
    }

    pub fn fetch_text(&self) -> Result<String> {
        let resp = self.http.get(&self.url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ReportError::Load(format!(
                "{} answered HTTP {status}",
                self.url
            )));
        }
        let html = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));
        let body = resp.text()?;
        if html || body.trim_start().starts_with('<') {
            return Err(ReportError::Load(format!(
                "{} returned HTML instead of CSV",
                self.url
            )));
        }
        Ok(body)
    }
}

impl DatasetLoader for HttpLoader {
    fn load(&self) -> Result<Series> {
        let text = self.fetch_text()?;
        series_from_tidy_csv(&text, &self.mapping)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Loader over an already built series.
#[derive(Debug, Clone)]
pub struct InMemoryLoader(pub Series);

impl DatasetLoader for InMemoryLoader {
    fn load(&self) -> Result<Series> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory series ({} years)", self.0.len())
    }
}

/// Pick the loader for a `--data` argument: URLs are fetched, anything else is a path.
pub fn loader_for(source: &str, mapping: SeriesMapping) -> Result<Box<dyn DatasetLoader>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Box::new(HttpLoader::new(source, mapping)?))
    } else {
        Ok(Box::new(CsvLoader::new(source, mapping)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_prefix_and_suffix_patterns() {
        let f = VectorFilter::new("capex_*").unwrap();
        assert!(f.matches("capex_oil"));
        assert!(!f.matches("opex_oil"));
        let f = VectorFilter::new("*_total").unwrap();
        assert!(f.matches("capex_total"));
        assert!(!f.matches("capex_total_2"));
        let f = VectorFilter::new("a.b?").unwrap();
        assert!(f.matches("a.bc"));
        assert!(!f.matches("axbc"));
    }

    #[test]
    fn ref_dates_accept_year_month_and_day_forms() {
        assert_eq!(parse_ref_year("2021").unwrap(), 2021);
        assert_eq!(parse_ref_year("2021-06").unwrap(), 2021);
        assert_eq!(parse_ref_year("2021-12-31").unwrap(), 2021);
        assert!(parse_ref_year("2021-13-01").is_err());
        assert!(parse_ref_year("21").is_err());
    }
}
