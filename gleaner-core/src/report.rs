// Run reports: the summary manifest written next to the index, and the
// human-readable digest printed at the end of a crawl.

use crate::crawl::extract_url_path;
use chrono::{DateTime, Utc};
use colored::Colorize;
use gleaner_scanner::{CrawlConfig, CrawlStats, PageRecord, Termination};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Index row plus the bits of the record worth keeping in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: String,
    pub url: String,
    pub title: String,
    pub depth: usize,
    pub txt_file: String,
    pub text_chars: usize,
}

impl From<&PageRecord> for PageSummary {
    fn from(record: &PageRecord) -> Self {
        Self {
            id: record.id.clone(),
            url: record.url.clone(),
            title: record.title.clone(),
            depth: record.depth,
            txt_file: record.txt_file.clone(),
            text_chars: record.text.chars().count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub seeds: Vec<String>,
    pub output_dir: PathBuf,
    pub index_path: PathBuf,
    pub config: CrawlConfig,
    pub termination: Termination,
    pub stats: CrawlStats,
    pub pages: Vec<PageSummary>,
}

impl CrawlReport {
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Writes `summary.json` into `dir` and returns its path.
pub fn write_summary(report: &CrawlReport, dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn render_report(report: &CrawlReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_crawl_report(report)),
        ReportFormat::Json => serde_json::to_string_pretty(report),
    }
}

pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Plain-text digest of a run, pages grouped by host.
pub fn generate_crawl_report(report: &CrawlReport) -> String {
    let stats = &report.stats;
    let rule = "━".repeat(52);

    let mut out = String::new();
    out.push_str(&format!("{}\n\n", rule));
    out.push_str(&format!("{}\n", "# Summary:".bold()));
    out.push_str(&format!("  Stopped: {}\n", report.termination.as_str()));
    out.push_str(&format!("  Duration: {:.1}s\n", report.duration_secs()));
    out.push_str(&format!("  Pages visited: {}\n", stats.dequeued));
    out.push_str(&format!(
        "  Pages accepted: {}\n",
        stats.accepted.to_string().green()
    ));
    out.push_str(&format!("  Rejected by filter: {}\n", stats.rejected));
    out.push_str(&format!(
        "  Failed: {} fetch, {} parse, {} write\n",
        stats.fetch_failures, stats.parse_failures, stats.store_failures
    ));
    out.push_str(&format!(
        "  Links queued: {} ({} over the per-page cap)\n",
        stats.links_enqueued, stats.links_dropped_by_cap
    ));
    out.push_str(&format!("  Left in frontier: {}\n", stats.frontier_remaining));
    out.push_str(&format!("  Index: {}\n", report.index_path.display()));
    out.push_str(&format!("\n{}\n\n", rule));

    if report.pages.is_empty() {
        out.push_str("No pages matched the keyword filter.\n");
        return out;
    }

    let mut by_host: BTreeMap<String, Vec<&PageSummary>> = BTreeMap::new();
    for page in &report.pages {
        by_host.entry(host_of(&page.url)).or_default().push(page);
    }

    for (host, pages) in &by_host {
        out.push_str(&format!("## {}\n", host.bold()));
        out.push_str(&format!("  {} page(s)\n\n", pages.len()));
        for page in pages {
            let title = if page.title.is_empty() {
                "(untitled)".dimmed().to_string()
            } else {
                page.title.clone()
            };
            out.push_str(&format!(
                "  {} {} {} {}\n",
                page.id.cyan(),
                format!("d{}", page.depth).dimmed(),
                extract_url_path(&page.url),
                title
            ));
        }
        out.push('\n');
    }

    out
}
