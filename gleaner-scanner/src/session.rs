use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use crate::fetcher::{Fetch, FetchOutcome, HttpFetcher};
use crate::filter::RelevanceFilter;
use crate::frontier::{Frontier, FrontierEntry, normalize_url};
use crate::parser::{self, ParsedPage};
use crate::result::{CrawlStats, PageRecord, Termination};
use crate::store::ResultStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlProgress {
    /// An entry was dequeued and is about to be fetched.
    Visiting {
        url: String,
        depth: usize,
        queued: usize,
    },
    Accepted {
        id: String,
        url: String,
        accepted: usize,
    },
}

pub type ProgressCallback = Arc<dyn Fn(&CrawlProgress) + Send + Sync>;

/// Everything a finished run leaves behind besides the files on disk.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub records: Vec<PageRecord>,
    pub stats: CrawlStats,
    pub termination: Termination,
    pub index_path: PathBuf,
    pub elapsed: Duration,
}

/// One crawl run: owns the frontier, the result store and the fetcher.
///
/// Construction performs all setup validation; once [`CrawlSession::run`] is
/// called, individual pages can only be skipped, never abort the run.
pub struct CrawlSession<F = HttpFetcher> {
    config: CrawlConfig,
    frontier: Frontier,
    store: ResultStore,
    filter: RelevanceFilter,
    fetcher: F,
    stats: CrawlStats,
    seed_count: usize,
    shutdown: Option<Arc<AtomicBool>>,
    progress_callback: Option<ProgressCallback>,
}

impl CrawlSession<HttpFetcher> {
    pub fn new<S: AsRef<str>>(
        config: CrawlConfig,
        seeds: &[S],
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, seeds, output_dir, fetcher)
    }
}

impl<F: Fetch> CrawlSession<F> {
    pub fn with_fetcher<S: AsRef<str>>(
        config: CrawlConfig,
        seeds: &[S],
        output_dir: impl Into<PathBuf>,
        fetcher: F,
    ) -> Result<Self> {
        config.validate()?;
        let frontier = seed_frontier(seeds)?;
        let seed_count = frontier.len();
        let store = ResultStore::create(output_dir)?;
        let filter = RelevanceFilter::new(&config.keywords);

        Ok(Self {
            config,
            frontier,
            store,
            filter,
            fetcher,
            stats: CrawlStats::default(),
            seed_count,
            shutdown: None,
            progress_callback: None,
        })
    }

    /// Stops the run at the next iteration boundary once `flag` is set.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub async fn run(mut self) -> Result<CrawlOutcome> {
        let started = Instant::now();
        let deadline = self
            .config
            .max_duration()
            .and_then(|limit| started.checked_add(limit));

        info!(
            "Starting crawl of {} seed(s): max depth {}, max pages {}, delay {:?}",
            self.seed_count,
            self.config.max_depth,
            self.config.max_pages,
            self.config.politeness_delay()
        );

        let termination = loop {
            if self.store.len() >= self.config.max_pages {
                break Termination::BudgetReached;
            }
            if self
                .shutdown
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::SeqCst))
            {
                break Termination::Interrupted;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break Termination::DeadlineReached;
            }
            let Some(entry) = self.frontier.dequeue() else {
                break Termination::FrontierExhausted;
            };
            self.stats.dequeued += 1;
            self.process(entry).await;
        };

        self.stats.frontier_remaining = self.frontier.len();
        let index_path = self.store.write_index()?;
        let elapsed = started.elapsed();

        info!(
            "Crawl finished ({}): {} accepted, {} skipped, {} still queued, index at {}",
            termination.as_str(),
            self.stats.accepted,
            self.stats.skipped(),
            self.stats.frontier_remaining,
            index_path.display()
        );

        Ok(CrawlOutcome {
            records: self.store.into_records(),
            stats: self.stats,
            termination,
            index_path,
            elapsed,
        })
    }

    async fn process(&mut self, entry: FrontierEntry) {
        let FrontierEntry { url, depth } = entry;
        self.report(CrawlProgress::Visiting {
            url: url.clone(),
            depth,
            queued: self.frontier.len(),
        });

        let html = match self.fetcher.fetch(&url).await {
            FetchOutcome::Success(html) => html,
            FetchOutcome::Failure(reason) => {
                warn!("Skipping {}: {}", url, reason);
                self.stats.fetch_failures += 1;
                return;
            }
        };

        let ParsedPage { title, text, links } = match parser::parse(&html) {
            Ok(page) => page,
            Err(e) => {
                warn!("Skipping {}: parse failed: {}", url, e);
                self.stats.parse_failures += 1;
                return;
            }
        };

        if !self.filter.is_relevant(&text) {
            debug!("Rejected {} [depth {}]: no keyword match", url, depth);
            self.stats.rejected += 1;
            return;
        }

        let id = match self.store.accept(&url, title, text, depth) {
            Ok(record) => record.id.clone(),
            Err(e) => {
                warn!("Skipping {}: could not persist text: {}", url, e);
                self.stats.store_failures += 1;
                return;
            }
        };
        self.stats.accepted += 1;
        info!(
            "Accepted {} as {} [depth {}] ({}/{})",
            url, id, depth, self.stats.accepted, self.config.max_pages
        );
        self.report(CrawlProgress::Accepted {
            id,
            url: url.clone(),
            accepted: self.stats.accepted,
        });

        if depth < self.config.max_depth {
            self.enqueue_children(&url, links, depth + 1);
        }
    }

    fn enqueue_children(&mut self, parent: &str, links: Vec<String>, depth: usize) {
        let cap = self.config.max_links_per_page;
        let total = links.len();
        let mut added = 0;

        for (position, link) in links.into_iter().enumerate() {
            if added == cap {
                let dropped = total - position;
                self.stats.links_dropped_by_cap += dropped;
                debug!(
                    "Link cap of {} reached on {}, ignoring {} more link(s)",
                    cap, parent, dropped
                );
                break;
            }
            if self.frontier.enqueue(&link, depth) {
                added += 1;
            }
        }

        self.stats.links_enqueued += added;
        debug!("Queued {} new link(s) from {} at depth {}", added, parent, depth);
    }

    fn report(&self, progress: CrawlProgress) {
        if let Some(ref callback) = self.progress_callback {
            callback(&progress);
        }
    }
}

fn seed_frontier<S: AsRef<str>>(seeds: &[S]) -> Result<Frontier> {
    if seeds.is_empty() {
        return Err(CrawlError::NoSeeds);
    }
    let mut frontier = Frontier::new();
    for seed in seeds {
        let seed = seed.as_ref();
        if normalize_url(seed).is_none() {
            return Err(CrawlError::InvalidSeed {
                url: seed.to_string(),
                reason: "not an absolute http(s) URL".to_string(),
            });
        }
        if !frontier.enqueue(seed, 0) {
            debug!("Ignoring duplicate seed {}", seed);
        }
    }
    Ok(frontier)
}
