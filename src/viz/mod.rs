//! Chart images: render projected series to **PNG** or **SVG**.
//!
//! Fixed layout: a title band, the chart (stacked bar or donut), then a legend
//! swatch band. Colors come from the series (Microsoft Office palette by
//! default) and tick labels are locale-aware (`30,000` vs `30 000`).

pub mod decorate;
pub mod fonts;
pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use decorate::decorate_svg;
pub use types::{ChartKind, DEFAULT_HEIGHT, DEFAULT_WIDTH, LEGEND_BAND_PX, TITLE_BAND_PX};

use crate::error::{ReportError, Result};
use crate::format::Locale;
use crate::projection::{ChartSeries, DonutSlice};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::Path;

use legend::{LegendItem, draw_legend_band};
use text::truncate_to_width;
use util::{compute_left_label_area_px, series_color, y_tick_label};

const MARGIN: u32 = 16;
const TITLE_FONT_PX: u32 = 20;
const TICK_FONT_PX: u32 = 12;
const BAR_WIDTH: f64 = 0.7;
const DONUT_HOLE: f64 = 0.55;

pub(crate) fn draw_err<E: std::fmt::Debug>(e: E) -> ReportError {
    ReportError::Export(format!("chart drawing failed: {e:?}"))
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    pub kind: ChartKind,
    pub title: &'a str,
    /// All category series; hidden ones only appear faded in the legend.
    pub series: &'a [ChartSeries],
    pub donut: &'a [DonutSlice],
    pub width: u32,
    pub height: u32,
    pub locale: Locale,
    /// TTF to register for chart text (system fonts are tried otherwise).
    pub font: Option<&'a Path>,
}

impl ChartRequest<'_> {
    fn validate(&self) -> Result<()> {
        let min_h = TITLE_BAND_PX + LEGEND_BAND_PX + 2 * MARGIN + 8;
        if self.width < 2 * MARGIN + 8 || self.height < min_h {
            return Err(ReportError::Export(format!(
                "chart size {}x{} is too small (minimum height {min_h})",
                self.width, self.height
            )));
        }
        Ok(())
    }

    fn legend_items(&self) -> Vec<LegendItem> {
        match self.kind {
            ChartKind::StackedBar => self
                .series
                .iter()
                .enumerate()
                .map(|(i, s)| LegendItem {
                    label: s.name.clone(),
                    color: series_color(&s.color, i),
                    visible: s.visible,
                })
                .collect(),
            ChartKind::Donut => self
                .donut
                .iter()
                .enumerate()
                .map(|(i, s)| LegendItem {
                    label: s.name.clone(),
                    color: series_color(&s.color, i),
                    visible: s.visible,
                })
                .collect(),
        }
    }
}

/// Render to PNG bytes.
pub fn render_png(req: &ChartRequest<'_>) -> Result<Vec<u8>> {
    req.validate()?;
    let with_text = fonts::ensure_fonts(req.font);
    // The bitmap backend encodes on present(), so draw into a scratch file.
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("chart.png");
    {
        let root = BitMapBackend::new(&path, (req.width, req.height)).into_drawing_area();
        draw_chart(&root, req, with_text)?;
        root.present().map_err(draw_err)?;
    }
    let bytes = std::fs::read(&path)?;
    log::debug!("rendered {} byte PNG chart", bytes.len());
    Ok(bytes)
}

/// Render to an SVG document string (undecorated; see [`decorate_svg`]).
pub fn render_svg(req: &ChartRequest<'_>) -> Result<String> {
    req.validate()?;
    let with_text = fonts::ensure_fonts(req.font);
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (req.width, req.height)).into_drawing_area();
        draw_chart(&root, req, with_text)?;
        root.present().map_err(draw_err)?;
    }
    Ok(buf)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    req: &ChartRequest<'_>,
    with_text: bool,
) -> Result<()> {
    root.fill(&WHITE).map_err(draw_err)?;

    let plot_h = req.height - TITLE_BAND_PX - LEGEND_BAND_PX;
    let (title_area, rest) = root.split_vertically(TITLE_BAND_PX);
    let (plot_area, legend_area) = rest.split_vertically(plot_h);

    if with_text {
        let max_w = req.width.saturating_sub(2 * MARGIN);
        let title = truncate_to_width(req.title.trim(), TITLE_FONT_PX, max_w);
        let style = TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX))
            .pos(Pos::new(HPos::Center, VPos::Center))
            .color(&BLACK);
        title_area
            .draw(&Text::new(
                title,
                (req.width as i32 / 2, TITLE_BAND_PX as i32 / 2),
                style,
            ))
            .map_err(draw_err)?;
    }

    match req.kind {
        ChartKind::StackedBar => draw_stacked_bars(&plot_area, req, with_text)?,
        ChartKind::Donut => draw_donut(&plot_area, req, with_text)?,
    }

    draw_legend_band(&legend_area, &req.legend_items(), with_text)
}

/// Stacked bars of the visible series, in series order from the baseline up.
fn draw_stacked_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    req: &ChartRequest<'_>,
    with_text: bool,
) -> Result<()> {
    let visible: Vec<(usize, &ChartSeries)> = req
        .series
        .iter()
        .enumerate()
        .filter(|(_, s)| s.visible)
        .collect();
    let Some(years) = req
        .series
        .first()
        .map(|s| s.points.iter().map(|p| p.year).collect::<Vec<_>>())
    else {
        return Ok(());
    };
    let (Some(&min_year), Some(&max_year)) = (years.first(), years.last()) else {
        return Ok(());
    };

    let stack_max = (0..years.len())
        .map(|i| {
            visible
                .iter()
                .filter_map(|(_, s)| s.points.get(i))
                .map(|p| p.y)
                .sum::<f64>()
        })
        .fold(0.0f64, f64::max);
    let y_max = if stack_max > 0.0 { stack_max * 1.05 } else { 1.0 };
    let x_range = (min_year as f64 - 0.5)..(max_year as f64 + 0.5);

    let mut builder = ChartBuilder::on(area);
    builder.margin(MARGIN);
    if with_text {
        let left = compute_left_label_area_px(0.0, y_max, 8, TICK_FONT_PX, req.locale);
        builder
            .set_label_area_size(LabelAreaPosition::Left, left)
            .set_label_area_size(LabelAreaPosition::Bottom, 32);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range, 0.0..y_max)
        .map_err(draw_err)?;

    if with_text {
        let locale = req.locale;
        let x_fmt = |x: &f64| {
            if (x - x.round()).abs() < 1e-6 {
                format!("{}", x.round() as i32)
            } else {
                String::new()
            }
        };
        let y_fmt = move |v: &f64| y_tick_label(*v, locale);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(years.len().min(12))
            .y_labels(8)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .label_style((FontFamily::SansSerif, TICK_FONT_PX))
            .draw()
            .map_err(draw_err)?;
    }

    let half = BAR_WIDTH / 2.0;
    for (i, year) in years.iter().enumerate() {
        let x = *year as f64;
        let mut base = 0.0;
        for (idx, s) in &visible {
            let Some(p) = s.points.get(i) else { continue };
            let color = series_color(&s.color, *idx).mix(p.opacity);
            let rect = Rectangle::new([(x - half, base), (x + half, base + p.y)], color.filled());
            chart
                .draw_series(std::iter::once(rect))
                .map_err(draw_err)?;
            base += p.y;
        }
    }
    Ok(())
}

/// Ring polygon for the arc `a0..a1` (radians, clockwise from 12 o'clock).
pub fn ring_segment(
    center: (i32, i32),
    outer: f64,
    inner: f64,
    a0: f64,
    a1: f64,
) -> Vec<(i32, i32)> {
    let steps = (((a1 - a0) / TAU) * 180.0).ceil().max(2.0) as usize;
    let at = |r: f64, a: f64| {
        let theta = a - FRAC_PI_2;
        (
            center.0 + (r * theta.cos()).round() as i32,
            center.1 + (r * theta.sin()).round() as i32,
        )
    };
    let mut pts = Vec::with_capacity(2 * (steps + 1));
    for k in 0..=steps {
        pts.push(at(outer, a0 + (a1 - a0) * k as f64 / steps as f64));
    }
    for k in (0..=steps).rev() {
        pts.push(at(inner, a0 + (a1 - a0) * k as f64 / steps as f64));
    }
    pts
}

/// Donut of the visible slices; angles are shares of the visible total.
fn draw_donut<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    req: &ChartRequest<'_>,
    with_text: bool,
) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let outer = ((w.min(h) / 2).saturating_sub(MARGIN) as f64).max(8.0);
    let inner = outer * DONUT_HOLE;

    let total: f64 = req
        .donut
        .iter()
        .filter(|s| s.visible)
        .map(|s| s.value)
        .sum();
    if total > 0.0 {
        let mut angle = 0.0;
        for (idx, slice) in req.donut.iter().enumerate() {
            if !slice.visible || slice.value <= 0.0 {
                continue;
            }
            let sweep = slice.value / total * TAU;
            let color = series_color(&slice.color, idx).mix(slice.opacity);
            area.draw(&Polygon::new(
                ring_segment(center, outer, inner, angle, angle + sweep),
                color.filled(),
            ))
            .map_err(draw_err)?;
            angle += sweep;
        }
    }

    if with_text {
        if let Some(first) = req.donut.first() {
            let style = TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX))
                .pos(Pos::new(HPos::Center, VPos::Center))
                .color(&BLACK);
            area.draw(&Text::new(first.year.to_string(), center, style))
                .map_err(draw_err)?;
        }
    }
    Ok(())
}
