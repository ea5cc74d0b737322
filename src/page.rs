//! One report page: load once, then derive, narrate, project and export on
//! demand for either locale.

use crate::config::PageConfig;
use crate::error::{ReportError, Result};
use crate::export::{ExportFile, ExportKind, encode_csv, encode_docx};
use crate::format::Locale;
use crate::loader::DatasetLoader;
use crate::metrics::{self, CategoryShare, DeriveOptions, DerivedMetrics};
use crate::models::Series;
use crate::narrative::{Slot, TextCatalog, TextLookup, render_template};
use crate::projection::{AccessibleTable, Projection, Projector};
use crate::rankings::{RankingTable, ranking_table};
use crate::view_state::ViewState;
use crate::viz::{self, ChartKind, ChartRequest};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Lifecycle of a page's data. A failed load is terminal; there is no retry.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Loading,
    Ready(Series),
    NoData,
    Failed(String),
}

/// Serializable snapshot for the `summary` command.
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub id: String,
    pub locale: Locale,
    pub title: String,
    pub metrics: DerivedMetrics,
    /// Largest categories of the selected year, cut to the page's top-K.
    pub top_shares: Vec<CategoryShare>,
    pub narrative: Vec<String>,
    pub table: AccessibleTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rankings: Option<RankingTable>,
}

pub struct Page {
    config: PageConfig,
    text: TextCatalog,
    state: PageState,
    view: ViewState,
    font: Option<PathBuf>,
}

impl Page {
    pub fn new(config: PageConfig) -> Self {
        let text = TextCatalog::builtin().with_overrides(&config.text);
        Self {
            config,
            text,
            state: PageState::Loading,
            view: ViewState::new(),
            font: None,
        }
    }

    /// Create the page and load its dataset.
    pub fn open(config: PageConfig, loader: &dyn DatasetLoader) -> Self {
        let mut page = Self::new(config);
        page.load(loader);
        page
    }

    pub fn with_font(mut self, font: Option<PathBuf>) -> Self {
        self.font = font;
        self
    }

    pub fn load(&mut self, loader: &dyn DatasetLoader) -> &PageState {
        log::info!("page `{}`: loading {}", self.config.id, loader.describe());
        self.state = match loader.load() {
            Ok(series) if series.is_empty() => {
                log::warn!("page `{}`: dataset has no usable years", self.config.id);
                PageState::NoData
            }
            Ok(series) => PageState::Ready(series),
            Err(e) => {
                log::error!("page `{}`: load failed: {e}", self.config.id);
                PageState::Failed(e.to_string())
            }
        };
        &self.state
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn text(&self) -> &TextCatalog {
        &self.text
    }

    pub fn series(&self) -> Result<&Series> {
        match &self.state {
            PageState::Ready(series) => Ok(series),
            PageState::Loading | PageState::NoData => Err(ReportError::NoDataAvailable),
            PageState::Failed(msg) => Err(ReportError::Load(msg.clone())),
        }
    }

    /// Text shown in place of the chart when there is nothing to chart.
    pub fn status_message(&self, locale: Locale) -> Result<Option<&str>> {
        let key = match self.state {
            PageState::Ready(_) | PageState::Loading => return Ok(None),
            PageState::NoData => "no_data",
            PageState::Failed(_) => "load_error",
        };
        self.text.text(key, locale).map(Some)
    }

    /// Select the year driving shares and the donut; unknown years are ignored.
    pub fn select_year(&mut self, year: i32) -> Result<bool> {
        let PageState::Ready(series) = &self.state else {
            return Err(ReportError::NoDataAvailable);
        };
        Ok(self.view.select_year(year, series))
    }

    pub fn metrics(&self) -> Result<DerivedMetrics> {
        let series = self.series()?;
        let opts = DeriveOptions {
            reference_year: self.config.reference_year,
            selected_year: self.view.selected_year(),
            display: Some(self.config.unit.precision()),
        };
        metrics::derive(series, &self.config.category_keys(), &opts)
    }

    pub fn title(&self, locale: Locale) -> &str {
        self.config.title.get(locale)
    }

    fn money(&self, raw: f64, locale: Locale) -> Slot {
        Slot::Text(self.config.unit.headline(raw, locale))
    }

    /// Shares of the selected year, largest first, cut to `top_k`.
    pub fn top_shares(&self) -> Result<Vec<CategoryShare>> {
        let m = self.metrics()?;
        metrics::top_shares(&m.selected, &self.config.category_keys(), self.config.top_k)
    }

    /// Narrative sentences: peak/decline, rebound, growth and the top share.
    pub fn narrative(&self, locale: Locale) -> Result<Vec<String>> {
        let series = self.series()?;
        let m = self.metrics()?;
        let title = Slot::Text(self.title(locale).to_string());
        let mut out = Vec::new();

        if m.peak.year == m.latest.year {
            let first = series.records().first().map_or(m.latest.year, |r| r.year);
            out.push(render_template(
                &self.text,
                "narrative.at_peak",
                locale,
                &[
                    ("title", title),
                    ("latest_value", self.money(m.latest.total, locale)),
                    ("latest_year", Slot::Year(m.latest.year)),
                    ("first_year", Slot::Year(first)),
                ],
            )?);
        } else {
            out.push(render_template(
                &self.text,
                "narrative.decline",
                locale,
                &[
                    ("title", title),
                    ("peak_value", self.money(m.peak.total, locale)),
                    ("peak_year", Slot::Year(m.peak.year)),
                    ("latest_year", Slot::Year(m.latest.year)),
                    ("decline_pct", Slot::Percent(m.decline_pct)),
                    ("latest_value", self.money(m.latest.total, locale)),
                ],
            )?);
        }

        if self.config.reference_year.is_some() && m.reference.year != m.latest.year {
            out.push(render_template(
                &self.text,
                "narrative.rebound",
                locale,
                &[
                    ("reference_year", Slot::Year(m.reference.year)),
                    ("rebound_pct", Slot::Percent(m.rebound_pct)),
                ],
            )?);
        }

        if let Some(base) = self.config.base_year {
            match metrics::growth_since(series, base) {
                Ok(growth) => {
                    if let Some((year, pct)) = growth.last() {
                        out.push(render_template(
                            &self.text,
                            "narrative.growth",
                            locale,
                            &[
                                ("base_year", Slot::Year(base)),
                                ("latest_year", Slot::Year(*year)),
                                ("growth_pct", Slot::Percent(Some(*pct))),
                            ],
                        )?);
                    }
                }
                Err(ReportError::DivisionUndefined) => out.push(render_template(
                    &self.text,
                    "narrative.growth",
                    locale,
                    &[
                        ("base_year", Slot::Year(base)),
                        ("latest_year", Slot::Year(m.latest.year)),
                        ("growth_pct", Slot::Percent(None)),
                    ],
                )?),
                Err(e) => log::warn!("page `{}`: growth sentence skipped: {e}", self.config.id),
            }
        }

        if let Some(top) = self.top_shares()?.first() {
            let name = self
                .config
                .categories
                .iter()
                .find(|c| c.key == top.key)
                .map_or(top.key.as_str(), |c| c.name.get(locale));
            out.push(render_template(
                &self.text,
                "narrative.top_share",
                locale,
                &[
                    ("year", Slot::Year(m.selected.year)),
                    ("category", Slot::Text(name.to_string())),
                    ("share", Slot::Percent(Some(top.share_pct))),
                ],
            )?);
        }
        Ok(out)
    }

    pub fn projector(&self, locale: Locale) -> Projector<'_> {
        Projector {
            title: self.title(locale),
            categories: &self.config.categories,
            format: &self.config.unit,
            include_total: self.config.include_total,
            text: &self.text,
            locale,
        }
    }

    pub fn project(&self, locale: Locale) -> Result<Projection> {
        self.projector(locale).project(self.series()?, &self.view)
    }

    pub fn rankings(&self, locale: Locale) -> Result<Option<RankingTable>> {
        if self.config.rankings.is_empty() {
            return Ok(None);
        }
        ranking_table(&self.config.rankings, &self.text, locale).map(Some)
    }

    /// Long description of the chart for assistive technology.
    pub fn chart_description(&self, locale: Locale) -> Result<String> {
        let series = self.series()?;
        let title = Slot::Text(self.title(locale).to_string());
        match self.config.chart.kind {
            ChartKind::StackedBar => {
                let (Some(first), Some(last)) = (series.records().first(), series.records().last())
                else {
                    return Err(ReportError::NoDataAvailable);
                };
                render_template(
                    &self.text,
                    "chart.description",
                    locale,
                    &[
                        ("title", title),
                        ("first_year", Slot::Year(first.year)),
                        ("last_year", Slot::Year(last.year)),
                    ],
                )
            }
            ChartKind::Donut => {
                let year = Projector::donut_year(series, &self.view)
                    .ok_or(ReportError::NoDataAvailable)?;
                render_template(
                    &self.text,
                    "chart.donut_description",
                    locale,
                    &[("title", title), ("year", Slot::Year(year))],
                )
            }
        }
    }

    pub fn summary(&self, locale: Locale) -> Result<PageSummary> {
        Ok(PageSummary {
            id: self.config.id.clone(),
            locale,
            title: self.title(locale).to_string(),
            metrics: self.metrics()?,
            top_shares: self.top_shares()?,
            narrative: self.narrative(locale)?,
            table: self.projector(locale).table(self.series()?)?,
            rankings: self.rankings(locale)?,
        })
    }

    /// Encode one download in memory.
    pub fn export(&self, kind: ExportKind, locale: Locale) -> Result<ExportFile> {
        let projection = self.project(locale)?;
        let stem = self.config.dataset.get(locale);
        let bytes = match kind {
            ExportKind::Csv => encode_csv(&projection.export)?.into_bytes(),
            ExportKind::Docx => encode_docx(&projection.export)?,
            kind @ (ExportKind::Png | ExportKind::Svg) => {
                let chart = self.config.chart;
                let req = ChartRequest {
                    kind: chart.kind,
                    title: self.title(locale),
                    series: &projection.chart,
                    donut: &projection.donut,
                    width: chart.width,
                    height: chart.height,
                    locale,
                    font: self.font.as_deref(),
                };
                if kind == ExportKind::Png {
                    viz::render_png(&req)?
                } else {
                    let svg = viz::render_svg(&req)?;
                    let id = format!("{}-chart", self.config.id);
                    viz::decorate_svg(&svg, &id, self.title(locale), &self.chart_description(locale)?)?
                        .into_bytes()
                }
            }
        };
        log::info!("page `{}`: encoded {kind} for {locale}", self.config.id);
        Ok(ExportFile::new(kind, stem, bytes))
    }

    /// Encode the ranking table as `<dataset>_<suffix>.csv` or `.docx`.
    /// `None` when the page has no rankings or `kind` is a chart image.
    pub fn export_rankings(&self, kind: ExportKind, locale: Locale) -> Result<Option<ExportFile>> {
        if kind.is_chart() {
            return Ok(None);
        }
        let Some(ranks) = self.rankings(locale)? else {
            return Ok(None);
        };
        let table = ranks.to_export(self.text.text("rank.title", locale)?, locale);
        let bytes = match kind {
            ExportKind::Docx => encode_docx(&table)?,
            _ => encode_csv(&table)?.into_bytes(),
        };
        let stem = format!(
            "{}_{}",
            self.config.dataset.get(locale),
            self.text.text("rank.file_suffix", locale)?
        );
        log::info!("page `{}`: encoded rankings {kind} for {locale}", self.config.id);
        Ok(Some(ExportFile::new(kind, &stem, bytes)))
    }

    /// Encode every requested download (plus the ranking table for CSV and
    /// DOCX), then write them all to `dir`.
    /// Nothing is written unless every encoder succeeded.
    pub fn export_to(&self, kinds: &[ExportKind], locale: Locale, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for kind in kinds {
            files.push(self.export(*kind, locale)?);
            files.extend(self.export_rankings(*kind, locale)?);
        }
        files.iter().map(|f| f.save_to(dir)).collect()
    }
}
