use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use gleaner_core::report::{ReportFormat, render_report};
use gleaner_core::{CrawlOptions, CrawlProgressCallback, execute_crawl, load_corpus};
use gleaner_scanner::CrawlConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use tracing::level_filters::LevelFilter;
use url::Url;

/// Collect seeds from `--url` values followed by the lines of `--hosts-file`.
pub fn load_urls_from_source(urls: &[Url], hosts_file: Option<&PathBuf>) -> Result<Vec<String>> {
    let mut seeds: Vec<String> = urls.iter().map(|url| url.as_str().to_string()).collect();
    if let Some(hosts_file_path) = hosts_file {
        seeds.extend(load_urls_from_file(hosts_file_path)?);
    }
    if seeds.is_empty() {
        bail!("Either --url or --hosts-file must be provided");
    }
    Ok(seeds)
}

/// Load and parse URLs from a file. Blank lines and `#` comments are ignored.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        bail!("No valid URLs found in {}", path.display());
    }

    Ok(urls)
}

/// Parse a single line as an http(s) URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if is_web_url(line) {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if is_web_url(&with_scheme) {
        return Some(with_scheme);
    }

    warn!("Skipping invalid URL '{}'", line);
    None
}

fn is_web_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Defaults, then the `--config` file if given, then individual flags.
pub fn build_config(args: &ArgMatches) -> Result<CrawlConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => CrawlConfig::from_json_file(path)?,
        None => CrawlConfig::default(),
    };

    if let Some(keywords) = args.get_many::<String>("keyword") {
        config.keywords = keywords.cloned().collect();
    }
    if let Some(&max_depth) = args.get_one::<usize>("max-depth") {
        config.max_depth = max_depth;
    }
    if let Some(&max_pages) = args.get_one::<usize>("max-pages") {
        config.max_pages = max_pages;
    }
    if let Some(&max_links) = args.get_one::<usize>("max-links") {
        config.max_links_per_page = max_links;
    }
    if let Some(&timeout) = args.get_one::<f64>("timeout") {
        config.timeout_secs = timeout;
    }
    if let Some(&delay) = args.get_one::<f64>("delay") {
        config.delay_secs = delay;
    }
    if let Some(&deadline) = args.get_one::<f64>("deadline") {
        config.max_duration_secs = Some(deadline);
    }

    config.validate().context("Invalid crawl configuration")?;
    Ok(config)
}

pub fn log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Logs go to stderr; stdout is reserved for the report.
pub fn init_logging(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// True when stdout carries a machine-readable report, so status lines and
/// the banner must stay off it.
pub fn report_owns_stdout(matches: &ArgMatches) -> bool {
    match matches.subcommand() {
        Some(("crawl", sub)) => sub
            .get_one::<String>("format")
            .and_then(|f| ReportFormat::from_str(f))
            == Some(ReportFormat::Json),
        _ => false,
    }
}

fn status_line(line: &str, to_stderr: bool) {
    if to_stderr {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

pub fn expand_output_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let urls: Vec<Url> = sub_matches
        .get_many::<Url>("url")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let seeds = load_urls_from_source(&urls, sub_matches.get_one::<PathBuf>("hosts-file"))?;
    let config = build_config(sub_matches)?;

    let output = sub_matches
        .get_one::<String>("output")
        .ok_or_else(|| anyhow!("--output has no value"))?;
    let output_dir = expand_output_dir(output);

    let format_str = sub_matches
        .get_one::<String>("format")
        .map(|s| s.as_str())
        .unwrap_or("text");
    let format = ReportFormat::from_str(format_str)
        .ok_or_else(|| anyhow!("Unknown report format '{}'", format_str))?;
    let show_progress = !quiet && !sub_matches.get_flag("no-progress");
    let to_stderr = format == ReportFormat::Json;

    if !quiet {
        status_line(
            &format!(
                "{} Crawling {} seed(s) into {}",
                "→".blue(),
                seeds.len(),
                output_dir.display().to_string().bright_white()
            ),
            to_stderr,
        );
        status_line(
            &format!(
                "  max depth {}, max pages {}, delay {}s, keywords: {}\n",
                config.max_depth,
                config.max_pages,
                config.delay_secs,
                config.keywords.join(", ")
            ),
            to_stderr,
        );
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "\n{} Interrupted, finishing the current page and writing the index...",
                "⚠".yellow().bold()
            );
            shutdown_flag.store(true, Ordering::SeqCst);
        }
    });

    let progress_callback: Option<CrawlProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(move |line: String| {
            status_line(&format!("  {} {}", "✓".green(), line), to_stderr);
        }))
    };

    let options = CrawlOptions {
        seeds,
        output_dir,
        config,
        show_progress_bars: show_progress,
        shutdown: Some(shutdown),
    };

    let report = execute_crawl(options, progress_callback)
        .await
        .context("Crawl could not start")?;
    info!(
        "Run finished ({}), {} page(s) accepted",
        report.termination.as_str(),
        report.stats.accepted
    );

    let rendered = render_report(&report, format).context("Failed to render report")?;
    print!("{}", rendered);
    if format == ReportFormat::Json {
        println!();
    }
    Ok(())
}

pub fn handle_verify(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let raw = sub_matches
        .get_one::<String>("DIR")
        .ok_or_else(|| anyhow!("DIR is required"))?;
    let dir = expand_output_dir(raw);

    let documents = load_corpus(&dir)
        .with_context(|| format!("{} is not a consistent corpus", dir.display()))?;

    if !quiet {
        let chars: usize = documents.iter().map(|d| d.text.chars().count()).sum();
        println!(
            "{} {} document(s), {} characters of text in {}",
            "✓".green().bold(),
            documents.len(),
            chars,
            dir.display()
        );
    }
    Ok(())
}
