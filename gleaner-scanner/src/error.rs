use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a crawl. Per-page problems never surface here; they are
/// reported as [`crate::fetcher::FetchFailure`] or [`crate::parser::ParseError`]
/// and skipped by the session.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("No seed URLs provided")]
    NoSeeds,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot use output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index write failed: {0}")]
    Index(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
