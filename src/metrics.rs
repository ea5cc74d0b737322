//! Summary metrics over a yearly series: latest, peak, trough, reference year,
//! decline/rebound/growth percentages and category shares.
//!
//! Zero denominators never leak NaN or infinity: the standalone functions fail
//! with [`ReportError::DivisionUndefined`], and [`DerivedMetrics`] stores the
//! affected percentages as `None` ("not applicable").

use crate::error::{ReportError, Result};
use crate::format::round_display;
use crate::models::{Series, YearRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Top-N cut used for ranking tables and share narratives.
pub const DEFAULT_TOP_K: usize = 6;

/// Display rounding applied to totals before percentages are computed, so that
/// a reader recomputing from the on-screen figures gets the narrative's value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPrecision {
    pub divisor: f64,
    pub decimals: usize,
}

impl DisplayPrecision {
    pub fn apply(&self, value: f64) -> f64 {
        round_display(value / self.divisor, self.decimals)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeriveOptions {
    /// Baseline for the rebound percentage; falls back to the latest year when absent.
    pub reference_year: Option<i32>,
    /// Year used for category shares; falls back to the latest year when absent.
    pub selected_year: Option<i32>,
    pub display: Option<DisplayPrecision>,
}

/// One category's share of a record's total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub key: String,
    pub value: f64,
    /// Percentage of the record's total (0 when the total is 0).
    pub share_pct: f64,
    /// 1-based position when ordered by descending share.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub latest: YearRecord,
    pub peak: YearRecord,
    pub trough: YearRecord,
    pub reference: YearRecord,
    pub selected: YearRecord,
    pub decline_pct: Option<f64>,
    pub rebound_pct: Option<f64>,
    /// Shares of the selected year, in category order.
    pub shares: Vec<CategoryShare>,
}

pub fn latest(series: &Series) -> Result<&YearRecord> {
    series.records().last().ok_or(ReportError::NoDataAvailable)
}

/// Record with the highest total; the first one wins a tie.
pub fn peak(series: &Series) -> Result<&YearRecord> {
    extreme_by_total(series, Ordering::Greater)
}

/// Record with the lowest total; the first one wins a tie.
pub fn trough(series: &Series) -> Result<&YearRecord> {
    extreme_by_total(series, Ordering::Less)
}

fn extreme_by_total(series: &Series, wanted: Ordering) -> Result<&YearRecord> {
    let mut iter = series.iter();
    let mut best = iter.next().ok_or(ReportError::NoDataAvailable)?;
    for rec in iter {
        if rec.total.partial_cmp(&best.total) == Some(wanted) {
            best = rec;
        }
    }
    Ok(best)
}

/// Record for `year`, or the latest record when that year is absent.
pub fn reference_year(series: &Series, year: i32) -> Result<&YearRecord> {
    match series.get(year) {
        Some(rec) => Ok(rec),
        None => {
            let fallback = latest(series)?;
            log::debug!(
                "reference year {year} not in series; using latest ({})",
                fallback.year
            );
            Ok(fallback)
        }
    }
}

/// `(to - from) / from * 100`.
pub fn percent_change(from: f64, to: f64) -> Result<f64> {
    if from == 0.0 {
        return Err(ReportError::DivisionUndefined);
    }
    Ok((to - from) / from * 100.0)
}

/// `(peak - latest) / peak * 100`.
pub fn decline_pct(peak: f64, latest: f64) -> Result<f64> {
    if peak == 0.0 {
        return Err(ReportError::DivisionUndefined);
    }
    Ok((peak - latest) / peak * 100.0)
}

/// Share of `value` in `total` as a percentage; 0 when the total is 0.
pub fn share_pct(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}

/// Shares of `keys` in `record.total`, in key order, each tagged with its rank.
pub fn category_shares<S: AsRef<str>>(record: &YearRecord, keys: &[S]) -> Result<Vec<CategoryShare>> {
    let mut shares = keys
        .iter()
        .map(|k| -> Result<CategoryShare> {
            let key = k.as_ref();
            let value = record.value(key)?;
            Ok(CategoryShare {
                key: key.to_string(),
                value,
                share_pct: share_pct(value, record.total),
                rank: 0,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| by_share_desc(&shares[a], &shares[b]));
    for (pos, idx) in order.into_iter().enumerate() {
        shares[idx].rank = pos + 1;
    }
    Ok(shares)
}

/// Top `k` shares of `record`, descending; equal shares keep key order.
pub fn top_shares<S: AsRef<str>>(record: &YearRecord, keys: &[S], k: usize) -> Result<Vec<CategoryShare>> {
    let mut shares = category_shares(record, keys)?;
    shares.sort_by(by_share_desc);
    shares.truncate(k);
    Ok(shares)
}

fn by_share_desc(a: &CategoryShare, b: &CategoryShare) -> Ordering {
    b.share_pct
        .partial_cmp(&a.share_pct)
        .unwrap_or(Ordering::Equal)
}

/// Percent change of the total from `base_year` to every later year.
pub fn growth_since(series: &Series, base_year: i32) -> Result<Vec<(i32, f64)>> {
    if series.is_empty() {
        return Err(ReportError::NoDataAvailable);
    }
    let base = series
        .get(base_year)
        .ok_or(ReportError::MissingYear(base_year))?;
    series
        .iter()
        .filter(|r| r.year > base_year)
        .map(|r| -> Result<(i32, f64)> { Ok((r.year, percent_change(base.total, r.total)?)) })
        .collect()
}

/// Compute every summary metric for `series`.
pub fn derive<S: AsRef<str>>(
    series: &Series,
    category_keys: &[S],
    opts: &DeriveOptions,
) -> Result<DerivedMetrics> {
    let latest = latest(series)?;
    let peak = peak(series)?;
    let trough = trough(series)?;
    let reference = match opts.reference_year {
        Some(y) => reference_year(series, y)?,
        None => latest,
    };
    let selected = match opts.selected_year {
        Some(y) => reference_year(series, y)?,
        None => latest,
    };

    let shown = |v: f64| match opts.display {
        Some(p) => p.apply(v),
        None => v,
    };
    let decline = decline_pct(shown(peak.total), shown(latest.total)).ok();
    let rebound = percent_change(shown(reference.total), shown(latest.total)).ok();

    let shares = category_shares(selected, category_keys)?;

    log::debug!(
        "derived metrics: latest={} peak={} trough={} decline={:?} rebound={:?}",
        latest.year,
        peak.year,
        trough.year,
        decline,
        rebound
    );

    Ok(DerivedMetrics {
        latest: latest.clone(),
        peak: peak.clone(),
        trough: trough.clone(),
        reference: reference.clone(),
        selected: selected.clone(),
        decline_pct: decline,
        rebound_pct: rebound,
        shares,
    })
}
