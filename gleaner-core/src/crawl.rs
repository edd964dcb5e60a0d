use crate::report::{self, CrawlReport, PageSummary};
use chrono::Utc;
use gleaner_scanner::{CrawlConfig, CrawlError, CrawlProgress, CrawlSession, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub seeds: Vec<String>,
    pub output_dir: PathBuf,
    pub config: CrawlConfig,
    pub show_progress_bars: bool,
    /// Set by the caller (e.g. on Ctrl-C) to stop after the current page.
    pub shutdown: Option<Arc<AtomicBool>>,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Short `host/path` label for progress output.
pub fn progress_label(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) => format!(
            "{}{}",
            u.host_str().unwrap_or("unknown"),
            extract_url_path(url)
        ),
        Err(_) => url.to_string(),
    }
}

/// Execute a crawl with the given options.
///
/// Setup problems (bad seeds, bad config, unusable output directory) are
/// returned as errors before any request is made. Everything after that ends
/// in a report, however few pages were accepted.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlReport, CrawlError> {
    let CrawlOptions {
        seeds,
        output_dir,
        config,
        show_progress_bars,
        shutdown,
    } = options;

    let mut session = CrawlSession::new(config.clone(), &seeds, &output_dir)?;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let max_pages = config.max_pages;
    let pb_clone = progress_bar.clone();
    let session_callback: ProgressCallback = Arc::new(move |progress: &CrawlProgress| {
        match progress {
            CrawlProgress::Visiting { url, depth, queued } => {
                if let Some(ref pb) = pb_clone {
                    pb.set_message(format!(
                        "depth {} · {} queued · {}",
                        depth,
                        queued,
                        progress_label(url)
                    ));
                }
            }
            CrawlProgress::Accepted { id, url, accepted } => {
                if let Some(ref callback) = progress_callback {
                    let line = format!("[{}/{}] {} {}", accepted, max_pages, id, url);
                    match pb_clone {
                        Some(ref pb) => pb.suspend(|| callback(line)),
                        None => callback(line),
                    }
                }
            }
        }
    });
    session = session.with_progress_callback(session_callback);
    if let Some(flag) = shutdown {
        session = session.with_shutdown(flag);
    }

    let started_at = Utc::now();
    let outcome = session.run().await;
    let finished_at = Utc::now();

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }
    let outcome = outcome?;

    let report = CrawlReport {
        started_at,
        finished_at,
        seeds,
        output_dir: output_dir.clone(),
        index_path: outcome.index_path,
        config,
        termination: outcome.termination,
        stats: outcome.stats,
        pages: outcome.records.iter().map(PageSummary::from).collect(),
    };

    if let Err(e) = report::write_summary(&report, &output_dir) {
        warn!(
            "Could not write {} in {}: {}",
            report::SUMMARY_FILE,
            output_dir.display(),
            e
        );
    }

    Ok(report)
}
