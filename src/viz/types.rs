//! Public types and layout constants for chart images.

use serde::{Deserialize, Serialize};

/// Chart types a page can draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// One bar per year, categories stacked upward (default).
    #[default]
    StackedBar,
    /// Category shares of one year as a ring.
    Donut,
}

/// Height of the title band above the chart.
pub const TITLE_BAND_PX: u32 = 56;
/// Height of the legend swatch band below the chart.
pub const LEGEND_BAND_PX: u32 = 48;

pub const DEFAULT_WIDTH: u32 = 960;
pub const DEFAULT_HEIGHT: u32 = 540;
