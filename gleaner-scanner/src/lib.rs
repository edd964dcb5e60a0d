pub mod config;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod frontier;
pub mod pacer;
pub mod parser;
pub mod result;
pub mod session;
pub mod store;

pub use config::CrawlConfig;
pub use error::CrawlError;
pub use fetcher::{Fetch, FetchFailure, FetchOutcome, HttpFetcher};
pub use filter::{RelevanceFilter, is_relevant};
pub use frontier::{Frontier, FrontierEntry};
pub use result::{CrawlStats, IndexRow, PageRecord, Termination};
pub use session::{CrawlOutcome, CrawlProgress, CrawlSession, ProgressCallback};
pub use store::ResultStore;
