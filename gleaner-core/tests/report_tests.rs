// Tests for run reports and the summary manifest

use chrono::{Duration, TimeZone, Utc};
use gleaner_core::report::{
    CrawlReport, PageSummary, ReportFormat, SUMMARY_FILE, generate_crawl_report, host_of,
    render_report, write_summary,
};
use gleaner_scanner::{CrawlConfig, CrawlStats, PageRecord, Termination};
use std::path::PathBuf;
use tempfile::tempdir;

fn page(n: usize, url: &str, title: &str, depth: usize) -> PageSummary {
    PageSummary {
        id: format!("page{}", n),
        url: url.to_string(),
        title: title.to_string(),
        depth,
        txt_file: format!("page{}.txt", n),
        text_chars: 42,
    }
}

fn sample_report() -> CrawlReport {
    let started_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    CrawlReport {
        started_at,
        finished_at: started_at + Duration::milliseconds(12_500),
        seeds: vec!["https://autism.example.org/".to_string()],
        output_dir: PathBuf::from("/tmp/corpus"),
        index_path: PathBuf::from("/tmp/corpus/index.csv"),
        config: CrawlConfig::default(),
        termination: Termination::BudgetReached,
        stats: CrawlStats {
            dequeued: 5,
            fetch_failures: 1,
            rejected: 1,
            accepted: 3,
            links_enqueued: 9,
            links_dropped_by_cap: 2,
            frontier_remaining: 4,
            ..CrawlStats::default()
        },
        pages: vec![
            page(1, "https://autism.example.org/", "Autism Resources", 0),
            page(2, "https://jobs.example.com/supported", "", 1),
            page(3, "https://autism.example.org/evaluation", "Evaluation", 1),
        ],
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("TXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("html"), None);
}

// ============================================================================
// Report Content Tests
// ============================================================================

#[test]
fn test_duration_secs() {
    assert_eq!(sample_report().duration_secs(), 12.5);
}

#[test]
fn test_host_of() {
    assert_eq!(host_of("https://jobs.example.com/a"), "jobs.example.com");
    assert_eq!(host_of("garbage"), "unknown");
}

#[test]
fn test_page_summary_from_record() {
    let record = PageRecord {
        id: "page7".to_string(),
        url: "https://example.org/x".to_string(),
        title: "X".to_string(),
        text: "naïve outcome".to_string(),
        depth: 2,
        txt_file: "page7.txt".to_string(),
    };
    let summary = PageSummary::from(&record);
    assert_eq!(summary.id, "page7");
    assert_eq!(summary.depth, 2);
    assert_eq!(summary.text_chars, 13);
}

#[test]
fn test_text_report_groups_pages_by_host() {
    colored::control::set_override(false);
    let text = generate_crawl_report(&sample_report());

    assert!(text.contains("Stopped: page budget reached"));
    assert!(text.contains("Pages accepted: 3"));
    assert!(text.contains("Failed: 1 fetch, 0 parse, 0 write"));
    assert!(text.contains("Links queued: 9 (2 over the per-page cap)"));
    assert!(text.contains("## autism.example.org"));
    assert!(text.contains("## jobs.example.com"));
    assert!(text.contains("page3 d1 /evaluation Evaluation"));
    assert!(text.contains("(untitled)"));

    // BTreeMap ordering puts hosts alphabetically.
    let autism = text.find("## autism.example.org").unwrap();
    let jobs = text.find("## jobs.example.com").unwrap();
    assert!(autism < jobs);
}

#[test]
fn test_text_report_without_pages() {
    colored::control::set_override(false);
    let mut report = sample_report();
    report.pages.clear();
    let text = generate_crawl_report(&report);
    assert!(text.contains("No pages matched the keyword filter."));
}

#[test]
fn test_json_report_round_trips() {
    let report = sample_report();
    let json = render_report(&report, ReportFormat::Json).unwrap();
    let back: CrawlReport = serde_json::from_str(&json).unwrap();

    assert_eq!(back.pages, report.pages);
    assert_eq!(back.stats, report.stats);
    assert_eq!(back.termination, Termination::BudgetReached);
    assert!(json.contains("\"termination\": \"budget_reached\""));
}

#[test]
fn test_write_summary() {
    let dir = tempdir().unwrap();
    let path = write_summary(&sample_report(), dir.path()).unwrap();

    assert_eq!(path, dir.path().join(SUMMARY_FILE));
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["seeds"][0], "https://autism.example.org/");
    assert_eq!(value["stats"]["frontier_remaining"], 4);
    assert_eq!(value["started_at"], "2024-03-01T12:00:00Z");
}

#[test]
fn test_write_summary_into_missing_dir_fails() {
    let dir = tempdir().unwrap();
    assert!(write_summary(&sample_report(), &dir.path().join("absent")).is_err());
}
