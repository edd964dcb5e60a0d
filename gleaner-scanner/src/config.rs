use crate::error::{CrawlError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "autism",
    "employment",
    "program",
    "effectiveness",
    "outcome",
    "evaluation",
];

/// Tunables for one crawl run.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides. Durations are expressed in (fractional) seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    /// No frontier entry deeper than this is ever enqueued. Seeds are depth 0.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Hard cap on accepted pages.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Relevance vocabulary, matched case-insensitively.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Minimum interval between two outbound requests.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,

    /// Newly enqueued links accepted from a single page.
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Overall wall-clock bound. Reaching it ends the run like a shutdown.
    #[serde(default)]
    pub max_duration_secs: Option<f64>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            keywords: default_keywords(),
            timeout_secs: default_timeout_secs(),
            delay_secs: default_delay_secs(),
            max_links_per_page: default_max_links_per_page(),
            user_agent: default_user_agent(),
            max_duration_secs: None,
        }
    }
}

fn default_max_depth() -> usize {
    5
}

fn default_max_pages() -> usize {
    3000
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_timeout_secs() -> f64 {
    8.0
}

fn default_delay_secs() -> f64 {
    1.5
}

fn default_max_links_per_page() -> usize {
    100
}

fn default_user_agent() -> String {
    format!("gleaner/{}", env!("CARGO_PKG_VERSION"))
}

impl CrawlConfig {
    /// Reads a JSON config file. Missing keys fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| CrawlError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| CrawlError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(CrawlError::Config("max_pages must be at least 1".into()));
        }
        if self.max_links_per_page == 0 {
            return Err(CrawlError::Config(
                "max_links_per_page must be at least 1".into(),
            ));
        }
        if !self.keywords.iter().any(|k| !k.trim().is_empty()) {
            return Err(CrawlError::Config(
                "at least one non-blank keyword is required".into(),
            ));
        }
        checked_duration("timeout", self.timeout_secs, false)?;
        checked_duration("delay", self.delay_secs, true)?;
        if let Some(limit) = self.max_duration_secs {
            checked_duration("deadline", limit, false)?;
        }
        Ok(())
    }

    // The accessors saturate instead of panicking; `validate` is what rejects
    // values the clock cannot represent.

    pub fn timeout(&self) -> Duration {
        saturating_duration(self.timeout_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        saturating_duration(self.delay_secs)
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(saturating_duration)
    }
}

/// Seconds as a `Duration` that can also be added to the current instant.
fn checked_duration(name: &str, secs: f64, allow_zero: bool) -> Result<Duration> {
    let in_range = secs.is_finite() && (secs > 0.0 || (allow_zero && secs == 0.0));
    let duration = Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| in_range && Instant::now().checked_add(*d).is_some());
    duration.ok_or_else(|| {
        let expected = if allow_zero {
            "zero or a positive number of seconds"
        } else {
            "a positive number of seconds"
        };
        CrawlError::Config(format!(
            "{} must be {} the clock can represent, got {}",
            name, expected, secs
        ))
    })
}

fn saturating_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(if secs > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}
