use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a source's crawl. `Crawled` is terminal until re-triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    NotStarted,
    Idle,
    Crawling,
    Crawled,
}

impl CrawlState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlState::NotStarted => "not_started",
            CrawlState::Idle => "idle",
            CrawlState::Crawling => "crawling",
            CrawlState::Crawled => "crawled",
        }
    }
}

impl std::str::FromStr for CrawlState {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(CrawlState::NotStarted),
            "idle" => Ok(CrawlState::Idle),
            "crawling" => Ok(CrawlState::Crawling),
            "crawled" => Ok(CrawlState::Crawled),
            other => Err(crate::Error::Storage(format!(
                "Unknown crawl state: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for CrawlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured news origin. Created by the registrar; only the crawl
/// state machine mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub base_url: String,
    pub language: String,
    pub crawling_strategy: String,
    pub crawl_state: CrawlState,
    pub last_crawled: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSource {
    pub name: String,
    pub base_url: String,
    pub language: String,
    pub crawling_strategy: String,
}

impl NewSource {
    pub fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            language: "en".to_string(),
            crawling_strategy: "default".to_string(),
        }
    }
}

/// One ingested, classified document. The pipeline never mutates an
/// article after insertion; moderation fields are flipped elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub source_id: i64,
    pub url: String,
    pub title: String,
    pub author: Option<String>,
    pub content: String,
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
    pub category: String,
    pub sentiment: String,
    pub negative_score: i32,
    pub neutral_score: i32,
    pub positive_score: i32,
    pub owner: String,
    pub thumbnail_url: Option<String>,
    pub tags: Option<String>,
    pub is_featured: bool,
    pub is_reported: bool,
    pub reported_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArticle {
    pub source_id: i64,
    pub url: String,
    pub title: String,
    pub author: Option<String>,
    pub content: String,
    pub summary: Option<String>,
    pub category: String,
    pub sentiment: String,
    pub negative_score: i32,
    pub neutral_score: i32,
    pub positive_score: i32,
    pub owner: String,
}
