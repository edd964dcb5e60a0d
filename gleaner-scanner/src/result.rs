use serde::{Deserialize, Serialize};

/// One accepted page. Created only on relevance acceptance and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub text: String,
    /// Depth of the frontier entry that produced this page.
    pub depth: usize,
    /// Text artifact path, relative to the output directory.
    pub txt_file: String,
}

impl PageRecord {
    pub fn index_row(&self) -> IndexRow {
        IndexRow {
            id: self.id.clone(),
            url: self.url.clone(),
            title: self.title.clone(),
            txt_file: self.txt_file.clone(),
        }
    }
}

/// Row of `index.csv`. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    pub id: String,
    pub url: String,
    pub title: String,
    pub txt_file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    FrontierExhausted,
    BudgetReached,
    DeadlineReached,
    Interrupted,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::FrontierExhausted => "frontier exhausted",
            Termination::BudgetReached => "page budget reached",
            Termination::DeadlineReached => "deadline reached",
            Termination::Interrupted => "interrupted",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub dequeued: usize,
    pub fetch_failures: usize,
    pub parse_failures: usize,
    pub rejected: usize,
    pub accepted: usize,
    pub store_failures: usize,
    pub links_enqueued: usize,
    pub links_dropped_by_cap: usize,
    pub frontier_remaining: usize,
}

impl CrawlStats {
    pub fn skipped(&self) -> usize {
        self.fetch_failures + self.parse_failures + self.rejected + self.store_failures
    }
}
