use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use nw_core::{Error, Result};

/// Page fetch timeout. Only the initial fetch is bounded; model calls
/// are not.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (compatible; newswatch/0.1)";

/// Page retrieval seam. One implementation talks HTTP; tests substitute
/// a canned page set.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Returns the response body for a 2xx response, an error otherwise.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Shared `reqwest` client with a bounded timeout, one per pipeline run.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Scraping(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }
        Ok(response.text().await?)
    }
}
