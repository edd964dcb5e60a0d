use colored::Colorize;

pub mod corpus;
pub mod crawl;
pub mod report;

pub use corpus::{CorpusDocument, CorpusError, load_corpus};
pub use crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path};
pub use report::{CrawlReport, PageSummary, ReportFormat, render_report};

pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "{} {}",
        "gleaner".bold().green(),
        format!("v{}", version).dimmed()
    );
    println!("{}\n", "keyword-filtered web corpus crawler".dimmed());
}
