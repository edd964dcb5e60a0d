// Tests for crawl orchestration

use gleaner_core::crawl::{CrawlOptions, execute_crawl, extract_url_path, progress_label};
use gleaner_core::report::SUMMARY_FILE;
use gleaner_scanner::{CrawlConfig, CrawlError, Termination};
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path_root() {
    assert_eq!(extract_url_path("http://example.com/"), "/");
}

#[test]
fn test_extract_url_path_empty_path() {
    assert_eq!(extract_url_path("http://example.com"), "/");
}

#[test]
fn test_extract_url_path_nested() {
    assert_eq!(
        extract_url_path("http://example.com/research/autism/employment"),
        "/research/autism/employment"
    );
}

#[test]
fn test_extract_url_path_drops_query_and_fragment() {
    assert_eq!(
        extract_url_path("http://example.com/programs?page=2#results"),
        "/programs"
    );
}

#[test]
fn test_extract_url_path_invalid_url() {
    assert_eq!(extract_url_path("not a url"), "not a url");
}

#[test]
fn test_progress_label() {
    assert_eq!(
        progress_label("https://www.example.org/outcomes/2023"),
        "www.example.org/outcomes/2023"
    );
    assert_eq!(progress_label("https://example.org"), "example.org/");
}

// ============================================================================
// execute_crawl Tests
// ============================================================================

fn html(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

async fn serve(server: &MockServer, route: &str, page: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(server)
        .await;
}

fn fast_config() -> CrawlConfig {
    CrawlConfig {
        delay_secs: 0.0,
        timeout_secs: 2.0,
        ..CrawlConfig::default()
    }
}

fn options(seeds: Vec<String>, dir: &std::path::Path, config: CrawlConfig) -> CrawlOptions {
    CrawlOptions {
        seeds,
        output_dir: dir.to_path_buf(),
        config,
        show_progress_bars: false,
        shutdown: None,
    }
}

#[tokio::test]
async fn test_execute_crawl_builds_report_and_summary() {
    let server = MockServer::start().await;
    let base = server.uri();
    serve(
        &server,
        "/",
        html(
            "Home",
            &format!(
                "<p>Autism employment resources</p><a href=\"{0}/study\">s</a><a href=\"{0}/garden\">g</a>",
                base
            ),
        ),
    )
    .await;
    serve(
        &server,
        "/study",
        html("Study", "<p>Program evaluation outcomes</p>"),
    )
    .await;
    serve(&server, "/garden", html("Garden", "<p>Tomatoes and roses</p>")).await;

    let dir = tempdir().unwrap();
    let report = execute_crawl(options(vec![format!("{}/", base)], dir.path(), fast_config()), None)
        .await
        .unwrap();

    assert_eq!(report.termination, Termination::FrontierExhausted);
    assert_eq!(report.stats.accepted, 2);
    assert_eq!(report.stats.rejected, 1);
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.pages[0].id, "page1");
    assert_eq!(report.pages[0].title, "Home");
    assert_eq!(report.pages[1].url, format!("{}/study", base));
    assert_eq!(report.pages[1].depth, 1);
    assert!(report.finished_at >= report.started_at);
    assert_eq!(report.index_path, dir.path().join("index.csv"));

    let summary = fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(value["termination"], "frontier_exhausted");
    assert_eq!(value["stats"]["accepted"], 2);
    assert_eq!(value["pages"][1]["txt_file"], "page2.txt");
    assert_eq!(value["config"]["max_pages"], 3000);
}

#[tokio::test]
async fn test_execute_crawl_reports_accepted_pages_through_callback() {
    let server = MockServer::start().await;
    serve(&server, "/", html("A", "<p>autism</p>")).await;

    let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let callback: gleaner_core::CrawlProgressCallback = Arc::new(move |line: String| {
        sink.lock().unwrap().push(line);
    });

    let dir = tempdir().unwrap();
    let config = CrawlConfig {
        max_pages: 10,
        ..fast_config()
    };
    execute_crawl(
        options(vec![format!("{}/", server.uri())], dir.path(), config),
        Some(callback),
    )
    .await
    .unwrap();

    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("[1/10] page1 "));
}

#[tokio::test]
async fn test_execute_crawl_rejects_invalid_seed_before_fetching() {
    let dir = tempdir().unwrap();
    let result = execute_crawl(
        options(vec!["ftp://example.com/".to_string()], dir.path(), fast_config()),
        None,
    )
    .await;

    assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
    assert!(!dir.path().join(SUMMARY_FILE).exists());
}

#[tokio::test]
async fn test_execute_crawl_rejects_empty_keyword_set() {
    let dir = tempdir().unwrap();
    let config = CrawlConfig {
        keywords: vec!["  ".to_string()],
        ..fast_config()
    };
    let result = execute_crawl(
        options(vec!["http://example.com/".to_string()], dir.path(), config),
        None,
    )
    .await;

    assert!(matches!(result, Err(CrawlError::Config(_))));
}

#[tokio::test]
async fn test_execute_crawl_honours_preset_shutdown() {
    let server = MockServer::start().await;
    serve(&server, "/", html("A", "<p>autism</p>")).await;

    let dir = tempdir().unwrap();
    let mut opts = options(vec![format!("{}/", server.uri())], dir.path(), fast_config());
    opts.shutdown = Some(Arc::new(AtomicBool::new(true)));

    let report = execute_crawl(opts, None).await.unwrap();
    assert_eq!(report.termination, Termination::Interrupted);
    assert_eq!(report.stats.dequeued, 0);
    assert_eq!(report.stats.frontier_remaining, 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("index.csv")).unwrap(),
        "id,url,title,txt_file\n"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_execute_crawl_with_nothing_relevant_still_succeeds() {
    let server = MockServer::start().await;
    serve(&server, "/", html("Weather", "<p>Sunny with light wind</p>")).await;

    let dir = tempdir().unwrap();
    let report = execute_crawl(
        options(vec![format!("{}/", server.uri())], dir.path(), fast_config()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.stats.accepted, 0);
    assert_eq!(report.stats.rejected, 1);
    assert!(report.pages.is_empty());
    assert!(dir.path().join(SUMMARY_FILE).exists());
}
