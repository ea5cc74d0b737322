//! Font registration for the `ab_glyph` text path.
//!
//! `ab_glyph` does not discover OS fonts, so a TTF is registered once as
//! "sans-serif": the configured file if given, else the first well-known
//! system font found. Without one, charts are drawn without text.

use plotters::style::{FontStyle, register_font};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

fn candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
        .collect()
}

fn try_register(path: &Path) -> bool {
    let Ok(bytes) = std::fs::read(path) else {
        return false;
    };
    // The registry keeps a `'static` reference; this runs once per process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match register_font("sans-serif", FontStyle::Normal, bytes) {
        Ok(()) => {
            log::debug!("registered chart font {}", path.display());
            true
        }
        Err(_) => {
            log::warn!("{} is not a usable font", path.display());
            false
        }
    }
}

/// Register a font on first call; returns whether chart text can be drawn.
/// Later calls return the first outcome, whatever path they pass.
pub fn ensure_fonts(configured: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let found = candidates(configured).iter().any(|p| try_register(p));
        if !found {
            log::warn!("no TTF font found; chart images will be drawn without text");
        }
        found
    })
}
