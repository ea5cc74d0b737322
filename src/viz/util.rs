//! Utility functions for visualization: palette colors, hex parsing, axis ticks.

use crate::format::{Locale, format_grouped};
use plotters::prelude::*;

use super::text::estimate_text_width_px;

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBColor {
    OFFICE10[idx % OFFICE10.len()]
}

/// Palette color as `#RRGGBB`.
pub fn palette_hex(idx: usize) -> String {
    let RGBColor(r, g, b) = office_color(idx);
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Parse `#RRGGBB` (or `RRGGBB`). Anything else is `None`.
pub fn parse_hex(hex: &str) -> Option<RGBColor> {
    let h = hex.trim().trim_start_matches('#');
    if h.len() != 6 || !h.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Series color with the palette as fallback for malformed hex.
pub fn series_color(hex: &str, idx: usize) -> RGBColor {
    parse_hex(hex).unwrap_or_else(|| {
        log::warn!("invalid color `{hex}`, using palette color {idx}");
        office_color(idx)
    })
}

/// Fraction digits for a Y tick label, by magnitude.
fn tick_precision(v: f64) -> usize {
    let a = v.abs();
    if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    }
}

/// Locale-aware Y tick label.
pub fn y_tick_label(v: f64, locale: Locale) -> String {
    format_grouped(v, tick_precision(v), locale)
}

/// Compute a tight left label area width for the Y axis (in pixels),
/// based on the formatted tick labels that will appear.
///
/// Returns a width clamped to a sensible range to avoid extremes.
pub fn compute_left_label_area_px(
    ymin: f64,
    ymax: f64,
    ticks: usize,
    font_px: u32,
    locale: Locale,
) -> u32 {
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = ymin + (ymax - ymin) * t;
        max_px = max_px.max(estimate_text_width_px(&y_tick_label(v, locale), font_px));
    }
    max_px.saturating_add(18).clamp(48, 140)
}
