//! World-ranking lookup table (reserves, production, exports).
//!
//! The table is static page configuration, independent of the loaded series.

use crate::error::{ReportError, Result};
use crate::format::{Locale, format_ordinal};
use crate::models::{Rank, RankingEntry};
use crate::narrative::TextLookup;
use crate::projection::ExportTable;
use serde::Serialize;
use std::collections::HashSet;

const HEADER_KEYS: [&str; 4] = ["rank.country", "rank.reserves", "rank.production", "rank.exports"];

pub fn format_rank(rank: Rank, locale: Locale) -> String {
    match rank {
        Rank::Ranked(n) => format_ordinal(n, locale),
        Rank::NotApplicable => locale.spec().not_applicable.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub key: String,
    pub name: String,
    pub reserves: String,
    pub production: String,
    pub exports: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingTable {
    pub headers: Vec<String>,
    pub rows: Vec<RankingRow>,
}

/// Entries in display order; equal orders keep their configured order.
pub fn ordered(entries: &[RankingEntry]) -> Result<Vec<&RankingEntry>> {
    let mut seen = HashSet::new();
    for e in entries {
        if !seen.insert(e.key.as_str()) {
            return Err(ReportError::Config(format!(
                "ranking key `{}` appears twice",
                e.key
            )));
        }
    }
    let mut out: Vec<&RankingEntry> = entries.iter().collect();
    out.sort_by_key(|e| e.display_order);
    Ok(out)
}

pub fn ranking_table(
    entries: &[RankingEntry],
    text: &dyn TextLookup,
    locale: Locale,
) -> Result<RankingTable> {
    let headers = HEADER_KEYS
        .iter()
        .map(|k| text.text(k, locale).map(str::to_string))
        .collect::<Result<Vec<_>>>()?;
    let rows = ordered(entries)?
        .into_iter()
        .map(|e| RankingRow {
            key: e.key.clone(),
            name: e.name.get(locale).to_string(),
            reserves: format_rank(e.reserve_rank, locale),
            production: format_rank(e.production_rank, locale),
            exports: format_rank(e.export_rank, locale),
        })
        .collect();
    Ok(RankingTable { headers, rows })
}

impl RankingTable {
    pub fn to_export(&self, title: &str, locale: Locale) -> ExportTable {
        ExportTable {
            title: title.to_string(),
            locale,
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .map(|r| {
                    vec![
                        r.name.clone(),
                        r.reserves.clone(),
                        r.production.clone(),
                        r.exports.clone(),
                    ]
                })
                .collect(),
        }
    }
}
