use crate::config::CrawlConfig;
use crate::error::Result;
use crate::pacer::{FixedDelay, Pacer};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

/// Why a page could not be retrieved. Always a per-page skip, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("not an HTML document ({0})")]
    NotHtml(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read body: {0}")]
    Body(String),
}

impl FetchFailure {
    fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout
        } else if err.is_connect() {
            FetchFailure::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            FetchFailure::Body(err.to_string())
        } else {
            FetchFailure::Request(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(String),
    Failure(FetchFailure),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// Source of raw page bodies for the crawl session.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

/// Paced HTTP GET with a per-request timeout.
pub struct HttpFetcher<P = FixedDelay> {
    client: Client,
    pacer: P,
}

impl HttpFetcher<FixedDelay> {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            pacer: FixedDelay::new(config.politeness_delay()),
        })
    }
}

impl<P: Pacer> HttpFetcher<P> {
    pub fn with_pacer<Q: Pacer>(self, pacer: Q) -> HttpFetcher<Q> {
        HttpFetcher {
            client: self.client,
            pacer,
        }
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }
}

impl<P: Pacer + Sync> Fetch for HttpFetcher<P> {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.pacer.wait().await;
        debug!("Fetching {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failure(FetchFailure::from_reqwest(&e)),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failure(FetchFailure::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        if let Some(content_type) = content_type
            && !is_html_content_type(&content_type)
        {
            return FetchOutcome::Failure(FetchFailure::NotHtml(content_type));
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Success(body),
            Err(e) => FetchOutcome::Failure(FetchFailure::from_reqwest(&e)),
        }
    }
}

/// A missing header is not routed here: servers that omit it are given the
/// benefit of the doubt.
fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
