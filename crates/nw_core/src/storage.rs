use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{Article, CrawlState, NewArticle, NewSource, Source};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Inserts exactly one article. A second insert for the same URL
    /// fails with `Error::DuplicateUrl`.
    async fn insert_article(&self, article: &NewArticle) -> Result<Article>;

    /// Looks up an article by its canonical URL.
    async fn get_article_by_url(&self, url: &str) -> Result<Option<Article>>;

    /// All articles belonging to one source, newest first.
    async fn get_articles_by_source(&self, source_id: i64) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait SourceStore: Send + Sync {
    async fn insert_source(&self, source: &NewSource) -> Result<Source>;

    async fn get_source(&self, id: i64) -> Result<Option<Source>>;

    async fn get_source_by_name(&self, name: &str) -> Result<Option<Source>>;

    /// Sources in registry order.
    async fn list_sources(&self) -> Result<Vec<Source>>;

    /// State-machine write. `last_crawled` is stamped only on completion.
    async fn set_crawl_state(
        &self,
        id: i64,
        state: CrawlState,
        last_crawled: Option<DateTime<Utc>>,
    ) -> Result<()>;
}

pub trait Storage: ArticleStore + SourceStore {}

impl<T: ArticleStore + SourceStore> Storage for T {}
