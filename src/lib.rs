//! factbook
//!
//! Data layer of a bilingual (English/French) statistical report. Pairs with
//! the `factbook` CLI.
//!
//! ### Pipeline
//! - Load a yearly series from the site's tidy `vector,ref_date,value` CSV
//! - Derive metrics: latest, peak, trough, decline/rebound/growth, shares, ranks
//! - Format numbers, currency, percentages and narrative templates per locale
//! - Project into chart series, donut slices and an accessible table
//! - Export CSV, DOCX and PNG/SVG chart images
//!
//! ### Example
//! ```
//! use factbook::{Locale, Series, YearRecord};
//! use factbook::metrics::{self, DeriveOptions};
//!
//! let series = Series::new(vec![
//!     YearRecord::total_only(2020, 100.0),
//!     YearRecord::total_only(2021, 150.0),
//!     YearRecord::total_only(2022, 120.0),
//! ])?;
//! let m = metrics::derive::<&str>(&series, &[], &DeriveOptions::default())?;
//! assert_eq!(m.peak.year, 2021);
//! assert_eq!(m.decline_pct, Some(20.0));
//! # let _ = Locale::Fr;
//! # Ok::<(), factbook::ReportError>(())
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod narrative;
pub mod page;
pub mod projection;
pub mod rankings;
pub mod view_state;
pub mod viz;

pub use config::{PageConfig, Settings};
pub use error::{ReportError, Result};
pub use format::Locale;
pub use models::{Category, Localized, Rank, RankingEntry, Series, YearRecord};
pub use page::{Page, PageState};
pub use view_state::ViewState;
