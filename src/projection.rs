//! Presentation projection: turn a validated [`Series`] into chart series,
//! donut slices, an accessible table and the flat export matrix.
//!
//! All transforms are pure. The export matrix is copied from the accessible
//! table's display strings, so the numbers a user downloads are exactly the
//! numbers shown on the page.

use crate::error::Result;
use crate::format::{
    Locale, UnitKind, format_grouped, format_headline, format_year, round_display, with_unit,
};
use crate::metrics::{DisplayPrecision, share_pct};
use crate::models::{Category, Localized, Series, YearRecord};
use crate::narrative::{Slot, TextLookup, render_template};
use crate::view_state::ViewState;
use crate::viz::util::palette_hex;
use serde::{Deserialize, Serialize};

/// Key of the synthetic series used when a page has no category breakdown.
pub const TOTAL_KEY: &str = "total";

fn default_divisor() -> f64 {
    1.0
}

fn default_decimals() -> usize {
    1
}

/// How raw values become displayed numbers on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFormat {
    /// Raw values are divided by this before display (`1000000` for thousands → billions).
    #[serde(default = "default_divisor")]
    pub divisor: f64,
    /// Fraction digits of table and export cells.
    #[serde(default = "default_decimals")]
    pub decimals: usize,
    #[serde(default)]
    pub kind: UnitKind,
    /// Appended to column headers, e.g. `($ billions)`.
    #[serde(default)]
    pub suffix: Localized,
}

impl Default for ValueFormat {
    fn default() -> Self {
        Self {
            divisor: default_divisor(),
            decimals: default_decimals(),
            kind: UnitKind::Plain,
            suffix: Localized::default(),
        }
    }
}

impl ValueFormat {
    pub fn effective_decimals(&self) -> usize {
        match self.kind {
            UnitKind::Integer => 0,
            _ => self.decimals,
        }
    }

    pub fn precision(&self) -> DisplayPrecision {
        DisplayPrecision {
            divisor: self.divisor,
            decimals: self.effective_decimals(),
        }
    }

    pub fn scaled(&self, raw: f64) -> f64 {
        raw / self.divisor
    }

    /// Bare number as a table cell shows it. Rounds exactly like [`Self::shown`].
    pub fn number(&self, raw: f64, locale: Locale) -> String {
        format_grouped(self.scaled(raw), self.effective_decimals(), locale)
    }

    /// Whole-number figure with the unit's affixes, for narrative sentences.
    pub fn headline(&self, raw: f64, locale: Locale) -> String {
        with_unit(&format_headline(self.scaled(raw), locale), self.kind, locale)
    }

    /// Number with the unit's affixes, for hover and assistive text.
    pub fn rich(&self, raw: f64, locale: Locale) -> String {
        with_unit(&self.number(raw, locale), self.kind, locale)
    }

    /// Numeric value a reader sees in the cell.
    pub fn shown(&self, raw: f64) -> f64 {
        round_display(self.scaled(raw), self.effective_decimals())
    }

    pub fn header(&self, name: &str, locale: Locale) -> String {
        let suffix = self.suffix.get(locale).trim();
        if suffix.is_empty() {
            name.to_string()
        } else {
            format!("{name} {suffix}")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub year: i32,
    /// Raw value.
    pub value: f64,
    /// Value divided by the page divisor, as plotted.
    pub y: f64,
    pub share_pct: f64,
    pub hover: String,
    pub aria_label: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub key: String,
    pub name: String,
    pub color: String,
    pub visible: bool,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutSlice {
    pub key: String,
    pub name: String,
    pub year: i32,
    pub value: f64,
    pub share_pct: f64,
    pub color: String,
    pub hover: String,
    pub visible: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessibleCell {
    pub display: String,
    /// Distinct label for assistive technology ("Oil and gas, 2021: $1.2 billion").
    pub aria_label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessibleRow {
    pub year: i32,
    pub header: String,
    pub cells: Vec<AccessibleCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessibleTable {
    pub caption: String,
    pub headers: Vec<String>,
    pub rows: Vec<AccessibleRow>,
}

/// Flat, fully formatted table handed to the export encoders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTable {
    pub title: String,
    pub locale: Locale,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Everything a page renders for one locale and view state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub chart: Vec<ChartSeries>,
    pub donut: Vec<DonutSlice>,
    pub table: AccessibleTable,
    pub export: ExportTable,
}

/// One plotted/tabulated column.
struct Column<'c> {
    key: &'c str,
    name: String,
    color: String,
}

pub struct Projector<'a> {
    pub title: &'a str,
    pub categories: &'a [Category],
    pub format: &'a ValueFormat,
    /// Append a `Total` column to the table (always on when there are no categories).
    pub include_total: bool,
    pub text: &'a dyn TextLookup,
    pub locale: Locale,
}

impl<'a> Projector<'a> {
    fn category_columns(&self) -> Vec<Column<'a>> {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, c)| Column {
                key: c.key.as_str(),
                name: c.name.get(self.locale).to_string(),
                color: c.color.clone().unwrap_or_else(|| palette_hex(i)),
            })
            .collect()
    }

    fn total_column(&self) -> Result<Column<'static>> {
        Ok(Column {
            key: TOTAL_KEY,
            name: self.text.text("total", self.locale)?.to_string(),
            color: palette_hex(0),
        })
    }

    /// Plotted columns: the categories, or the total alone when there are none.
    fn chart_columns(&self) -> Result<Vec<Column<'a>>> {
        if self.categories.is_empty() {
            Ok(vec![self.total_column()?])
        } else {
            Ok(self.category_columns())
        }
    }

    fn table_columns(&self) -> Result<Vec<Column<'a>>> {
        let mut cols = self.category_columns();
        if self.include_total || cols.is_empty() {
            cols.push(self.total_column()?);
        }
        Ok(cols)
    }

    fn raw(record: &YearRecord, key: &str) -> Result<f64> {
        if key == TOTAL_KEY {
            Ok(record.total)
        } else {
            record.value(key)
        }
    }

    fn hover(&self, name: &str, year: i32, raw: f64, share: f64) -> Result<String> {
        render_template(
            self.text,
            "chart.hover",
            self.locale,
            &[
                ("category", Slot::Text(name.to_string())),
                ("year", Slot::Year(year)),
                ("value", Slot::Text(self.format.rich(raw, self.locale))),
                ("share", Slot::PercentDetail(Some(share))),
            ],
        )
    }

    fn cell_label(&self, name: &str, year: i32, raw: f64) -> Result<String> {
        render_template(
            self.text,
            "table.cell_label",
            self.locale,
            &[
                ("category", Slot::Text(name.to_string())),
                ("year", Slot::Year(year)),
                ("value", Slot::Text(self.format.rich(raw, self.locale))),
            ],
        )
    }

    /// One series per category (with its visibility flag), in category order.
    pub fn chart_series(&self, series: &Series, view: &ViewState) -> Result<Vec<ChartSeries>> {
        let selection = view.selection();
        self.chart_columns()?
            .into_iter()
            .map(|col| -> Result<ChartSeries> {
                let points = series
                    .iter()
                    .enumerate()
                    .map(|(idx, rec)| -> Result<ChartPoint> {
                        let raw = Self::raw(rec, col.key)?;
                        let share = share_pct(raw, rec.total);
                        Ok(ChartPoint {
                            year: rec.year,
                            value: raw,
                            y: self.format.scaled(raw),
                            share_pct: share,
                            hover: self.hover(&col.name, rec.year, raw, share)?,
                            aria_label: self.cell_label(&col.name, rec.year, raw)?,
                            opacity: selection.opacity(col.key, idx),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(ChartSeries {
                    key: col.key.to_string(),
                    visible: view.is_visible(col.key),
                    name: col.name,
                    color: col.color,
                    points,
                })
            })
            .collect()
    }

    /// Only the series the chart actually draws.
    pub fn visible_series(&self, series: &Series, view: &ViewState) -> Result<Vec<ChartSeries>> {
        Ok(self
            .chart_series(series, view)?
            .into_iter()
            .filter(|s| s.visible)
            .collect())
    }

    /// Year the donut shows: the view's selected year when present, else the latest.
    pub fn donut_year(series: &Series, view: &ViewState) -> Option<i32> {
        view.selected_year()
            .filter(|y| series.get(*y).is_some())
            .or_else(|| series.records().last().map(|r| r.year))
    }

    /// Category slices for the donut year; empty for pages without categories.
    pub fn donut(&self, series: &Series, view: &ViewState) -> Result<Vec<DonutSlice>> {
        let Some(year) = Self::donut_year(series, view) else {
            return Ok(Vec::new());
        };
        let (Some(idx), Some(rec)) = (series.position(year), series.get(year)) else {
            return Ok(Vec::new());
        };
        let selection = view.selection();
        self.category_columns()
            .into_iter()
            .map(|col| -> Result<DonutSlice> {
                let raw = rec.value(col.key)?;
                let share = share_pct(raw, rec.total);
                Ok(DonutSlice {
                    key: col.key.to_string(),
                    year,
                    value: raw,
                    share_pct: share,
                    hover: self.hover(&col.name, year, raw, share)?,
                    visible: view.is_visible(col.key),
                    opacity: selection.opacity(col.key, idx),
                    name: col.name,
                    color: col.color,
                })
            })
            .collect()
    }

    /// Accessible table; hidden categories stay in it.
    pub fn table(&self, series: &Series) -> Result<AccessibleTable> {
        let cols = self.table_columns()?;
        let mut headers = vec![self.text.text("year", self.locale)?.to_string()];
        headers.extend(cols.iter().map(|c| self.format.header(&c.name, self.locale)));

        let rows = series
            .iter()
            .map(|rec| -> Result<AccessibleRow> {
                let cells = cols
                    .iter()
                    .map(|col| -> Result<AccessibleCell> {
                        let raw = Self::raw(rec, col.key)?;
                        Ok(AccessibleCell {
                            display: self.format.number(raw, self.locale),
                            aria_label: self.cell_label(&col.name, rec.year, raw)?,
                            value: self.format.shown(raw),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(AccessibleRow {
                    year: rec.year,
                    header: format_year(rec.year),
                    cells,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(AccessibleTable {
            caption: self.title.to_string(),
            headers,
            rows,
        })
    }

    /// Flat export matrix copied from the table's display strings.
    pub fn export_table(&self, table: &AccessibleTable) -> ExportTable {
        ExportTable {
            title: table.caption.clone(),
            locale: self.locale,
            headers: table.headers.clone(),
            rows: table
                .rows
                .iter()
                .map(|row| {
                    std::iter::once(row.header.clone())
                        .chain(row.cells.iter().map(|c| c.display.clone()))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn project(&self, series: &Series, view: &ViewState) -> Result<Projection> {
        let table = self.table(series)?;
        let export = self.export_table(&table);
        Ok(Projection {
            chart: self.chart_series(series, view)?,
            donut: self.donut(series, view)?,
            table,
            export,
        })
    }
}
