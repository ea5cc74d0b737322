//! Legend swatch band drawn below the chart.

use crate::error::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::draw_err;
use super::text::{estimate_text_width_px, truncate_to_width};

/// One legend entry. Hidden entries are drawn faded so the reader can still
/// see which categories exist.
#[derive(Debug, Clone)]
pub struct LegendItem {
    pub label: String,
    pub color: RGBColor,
    pub visible: bool,
}

// Layout constants
const FONT_PX: u32 = 13;
const SWATCH_PX: i32 = 12;
const SWATCH_TO_TEXT: i32 = 6;
const TRAILING_GAP: i32 = 16;
const PAD_X: i32 = 12;

/// Width of one entry before any truncation.
fn natural_width(label: &str) -> i32 {
    SWATCH_PX + SWATCH_TO_TEXT + estimate_text_width_px(label, FONT_PX) as i32 + TRAILING_GAP
}

/// Lay the items out on one row: natural widths when they fit, otherwise
/// equal slots with truncated labels. Returns `(x, label)` per item.
pub fn layout_row(items: &[LegendItem], band_w: i32, with_text: bool) -> Vec<(i32, String)> {
    if items.is_empty() {
        return Vec::new();
    }
    let usable = (band_w - 2 * PAD_X).max(1);
    if !with_text {
        let slot = SWATCH_PX + TRAILING_GAP;
        return items
            .iter()
            .enumerate()
            .map(|(i, _)| (PAD_X + i as i32 * slot, String::new()))
            .collect();
    }

    let total: i32 = items.iter().map(|it| natural_width(&it.label)).sum();
    let mut out = Vec::with_capacity(items.len());
    if total <= usable {
        let mut x = PAD_X + (usable - total) / 2;
        for it in items {
            out.push((x, it.label.clone()));
            x += natural_width(&it.label);
        }
    } else {
        let slot = usable / items.len() as i32;
        let text_cap = (slot - SWATCH_PX - SWATCH_TO_TEXT - TRAILING_GAP).max(0) as u32;
        for (i, it) in items.iter().enumerate() {
            out.push((
                PAD_X + i as i32 * slot,
                truncate_to_width(&it.label, FONT_PX, text_cap),
            ));
        }
    }
    out
}

pub fn draw_legend_band<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    items: &[LegendItem],
    with_text: bool,
) -> Result<()> {
    area.fill(&WHITE).map_err(draw_err)?;
    let (w, h) = area.dim_in_pixel();
    let mid_y = h as i32 / 2;
    let label_style = TextStyle::from((FontFamily::SansSerif, FONT_PX))
        .pos(Pos::new(HPos::Left, VPos::Center))
        .color(&BLACK);

    for (item, (x, label)) in items.iter().zip(layout_row(items, w as i32, with_text)) {
        let alpha = if item.visible { 1.0 } else { 0.3 };
        let top = mid_y - SWATCH_PX / 2;
        area.draw(&Rectangle::new(
            [(x, top), (x + SWATCH_PX, top + SWATCH_PX)],
            item.color.mix(alpha).filled(),
        ))
        .map_err(draw_err)?;
        if with_text && !label.is_empty() {
            area.draw(&Text::new(
                label,
                (x + SWATCH_PX + SWATCH_TO_TEXT, mid_y),
                label_style.clone(),
            ))
            .map_err(draw_err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str) -> LegendItem {
        LegendItem {
            label: label.to_string(),
            color: RGBColor(0, 0, 0),
            visible: true,
        }
    }

    #[test]
    fn narrow_band_truncates_labels() {
        let items: Vec<_> = (0..6)
            .map(|i| item(&format!("A rather long category label {i}")))
            .collect();
        let row = layout_row(&items, 400, true);
        assert_eq!(row.len(), 6);
        assert!(row.iter().all(|(_, l)| l.is_empty() || l.ends_with('…')));
        assert!(row.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn wide_band_keeps_full_labels() {
        let items = vec![item("Oil"), item("Gas")];
        let row = layout_row(&items, 960, true);
        assert_eq!(row[0].1, "Oil");
        assert_eq!(row[1].1, "Gas");
    }
}
