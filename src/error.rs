//! Error type shared by every stage of the report pipeline.

use crate::format::Locale;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    /// The series is empty; callers render a "no data" state instead.
    #[error("no data available")]
    NoDataAvailable,

    /// A percentage was requested against a zero denominator.
    #[error("percentage undefined: denominator is zero")]
    DivisionUndefined,

    #[error("year {year} has no value for category `{key}`")]
    MissingCategory { year: i32, key: String },

    #[error("year {0} is not present in the series")]
    MissingYear(i32),

    #[error("duplicate year {0} in series")]
    DuplicateYear(i32),

    #[error("series is not chronological: {next} follows {prev}")]
    UnorderedYears { prev: i32, next: i32 },

    #[error("invalid value {value} for `{key}` in {year}: must be finite and non-negative")]
    InvalidValue { year: i32, key: String, value: f64 },

    #[error("no text for key `{key}` in locale {locale}")]
    MissingText { key: String, locale: Locale },

    #[error("template `{template}` uses unknown placeholder `{{{placeholder}}}`")]
    UnknownPlaceholder { template: String, placeholder: String },

    #[error("unsupported locale tag `{0}`")]
    UnsupportedLocale(String),

    #[error("dataset load failed: {0}")]
    Load(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
