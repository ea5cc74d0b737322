//! Export encoders: CSV, DOCX and chart images, all returned as in-memory
//! [`ExportFile`]s. Writing to disk is atomic (temp file + rename).

pub mod csv;
pub mod docx;

pub use crate::projection::ExportTable;
pub use self::csv::encode_csv;
pub use self::docx::encode_docx;

use crate::error::{ReportError, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Csv,
    Docx,
    Png,
    Svg,
}

impl ExportKind {
    pub const ALL: [ExportKind; 4] = [
        ExportKind::Csv,
        ExportKind::Docx,
        ExportKind::Png,
        ExportKind::Svg,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::Docx => "docx",
            ExportKind::Png => "png",
            ExportKind::Svg => "svg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportKind::Csv => "text/csv; charset=utf-8",
            ExportKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportKind::Png => "image/png",
            ExportKind::Svg => "image/svg+xml",
        }
    }

    /// `<stem>.csv`, `<stem>.docx`, `<stem>_chart.png`, `<stem>_chart.svg`.
    pub fn filename(self, stem: &str) -> String {
        match self {
            ExportKind::Csv | ExportKind::Docx => format!("{stem}.{}", self.extension()),
            ExportKind::Png | ExportKind::Svg => format!("{stem}_chart.{}", self.extension()),
        }
    }

    pub fn is_chart(self) -> bool {
        matches!(self, ExportKind::Png | ExportKind::Svg)
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportKind::Csv),
            "docx" | "word" => Ok(ExportKind::Docx),
            "png" => Ok(ExportKind::Png),
            "svg" => Ok(ExportKind::Svg),
            other => Err(ReportError::Export(format!("unknown export format `{other}`"))),
        }
    }
}

/// A download: file name, MIME type and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn new(kind: ExportKind, stem: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: kind.filename(stem),
            mime: kind.mime(),
            bytes,
        }
    }

    /// Write into `dir` atomically; a failure leaves no partial file behind.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let target = dir.join(&self.filename);
        let mut tmp = NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, &self.bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| ReportError::Io(e.error))?;
        log::info!("wrote {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}
