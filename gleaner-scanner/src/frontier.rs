use std::collections::{HashSet, VecDeque};
use url::Url;

/// A unit of pending work. Seeds sit at depth 0; discovered links at parent + 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
}

/// Canonical form used for every visited/queued comparison.
///
/// Returns `None` for anything that is not an absolute http(s) URL.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;
    url.set_fragment(None);
    Some(url.to_string())
}

/// FIFO work queue with visit-once bookkeeping.
///
/// An entry becomes visited the moment it is dequeued, before any network I/O,
/// so a URL that later fails is never handed out again.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `url` unless it is malformed, already visited, or already queued.
    /// Returns whether the entry was added.
    pub fn enqueue(&mut self, url: &str, depth: usize) -> bool {
        let Some(url) = normalize_url(url) else {
            return false;
        };
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Pops the oldest entry and marks it visited in the same step.
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(&entry.url);
        self.visited.insert(entry.url.clone());
        Some(entry)
    }

    pub fn is_visited(&self, url: &str) -> bool {
        normalize_url(url).is_some_and(|url| self.visited.contains(&url))
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
