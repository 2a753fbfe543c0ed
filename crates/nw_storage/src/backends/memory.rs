use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use nw_core::{
    Article, ArticleStore, CrawlState, Error, NewArticle, NewSource, Result, Source, SourceStore,
};

use crate::StorageBackend;

#[derive(Default)]
struct MemoryStore {
    sources: Vec<Source>,
    articles: Vec<Article>,
    next_source_id: i64,
    next_article_id: i64,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            sources: Vec::new(),
            articles: Vec::new(),
            next_source_id: 1,
            next_article_id: 1,
        }
    }
}

/// In-memory backend. Default for tests and for running the pipeline
/// without a database.
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        })
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new() -> Result<Self> {
        Self::new().await
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn insert_article(&self, article: &NewArticle) -> Result<Article> {
        let mut store = self.store.write().await;
        if store.articles.iter().any(|a| a.url == article.url) {
            return Err(Error::DuplicateUrl(article.url.clone()));
        }

        let id = store.next_article_id;
        store.next_article_id += 1;

        let stored = Article {
            id,
            source_id: article.source_id,
            url: article.url.clone(),
            title: article.title.clone(),
            author: article.author.clone(),
            content: article.content.clone(),
            summary: article.summary.clone(),
            published_at: Utc::now(),
            category: article.category.clone(),
            sentiment: article.sentiment.clone(),
            negative_score: article.negative_score,
            neutral_score: article.neutral_score,
            positive_score: article.positive_score,
            owner: article.owner.clone(),
            thumbnail_url: None,
            tags: None,
            is_featured: false,
            is_reported: false,
            reported_reason: None,
        };
        store.articles.push(stored.clone());
        Ok(stored)
    }

    async fn get_article_by_url(&self, url: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.articles.iter().find(|a| a.url == url).cloned())
    }

    async fn get_articles_by_source(&self, source_id: i64) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        let mut articles: Vec<Article> = store
            .articles
            .iter()
            .filter(|a| a.source_id == source_id)
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(articles)
    }
}

#[async_trait]
impl SourceStore for MemoryStorage {
    async fn insert_source(&self, source: &NewSource) -> Result<Source> {
        let mut store = self.store.write().await;
        if store.sources.iter().any(|s| s.name == source.name) {
            return Err(Error::Storage(format!(
                "Source already exists: {}",
                source.name
            )));
        }

        let id = store.next_source_id;
        store.next_source_id += 1;

        let stored = Source {
            id,
            name: source.name.clone(),
            base_url: source.base_url.clone(),
            language: source.language.clone(),
            crawling_strategy: source.crawling_strategy.clone(),
            crawl_state: CrawlState::NotStarted,
            last_crawled: None,
            is_active: true,
        };
        store.sources.push(stored.clone());
        Ok(stored)
    }

    async fn get_source(&self, id: i64) -> Result<Option<Source>> {
        let store = self.store.read().await;
        Ok(store.sources.iter().find(|s| s.id == id).cloned())
    }

    async fn get_source_by_name(&self, name: &str) -> Result<Option<Source>> {
        let store = self.store.read().await;
        Ok(store.sources.iter().find(|s| s.name == name).cloned())
    }

    async fn list_sources(&self) -> Result<Vec<Source>> {
        let store = self.store.read().await;
        Ok(store.sources.clone())
    }

    async fn set_crawl_state(
        &self,
        id: i64,
        state: CrawlState,
        last_crawled: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut store = self.store.write().await;
        let source = store
            .sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::SourceNotFound(id.to_string()))?;
        source.crawl_state = state;
        if last_crawled.is_some() {
            source.last_crawled = last_crawled;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_article(url: &str) -> NewArticle {
        NewArticle {
            source_id: 1,
            url: url.to_string(),
            title: "A headline with enough words in it".to_string(),
            author: None,
            content: "Body text".to_string(),
            summary: None,
            category: "Politics".to_string(),
            sentiment: "neutral".to_string(),
            negative_score: 10,
            neutral_score: 80,
            positive_score: 9,
            owner: "Ministry of Parliamentary Affairs".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let storage = MemoryStorage::new().await.unwrap();
        let article = storage
            .insert_article(&new_article("http://example.com/story"))
            .await
            .unwrap();
        assert_eq!(article.id, 1);

        let found = storage
            .get_article_by_url("http://example.com/story")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, article.id);
    }

    #[tokio::test]
    async fn test_duplicate_url_rejected() {
        let storage = MemoryStorage::new().await.unwrap();
        storage
            .insert_article(&new_article("http://example.com/story"))
            .await
            .unwrap();
        let err = storage
            .insert_article(&new_article("http://example.com/story"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateUrl(_)));
    }

    #[tokio::test]
    async fn test_source_state_machine_writes() {
        let storage = MemoryStorage::new().await.unwrap();
        let source = storage
            .insert_source(&NewSource::new("example", "http://example.com"))
            .await
            .unwrap();
        assert_eq!(source.crawl_state, CrawlState::NotStarted);

        storage
            .set_crawl_state(source.id, CrawlState::Crawling, None)
            .await
            .unwrap();
        let source = storage.get_source(source.id).await.unwrap().unwrap();
        assert_eq!(source.crawl_state, CrawlState::Crawling);
        assert!(source.last_crawled.is_none());

        let now = Utc::now();
        storage
            .set_crawl_state(source.id, CrawlState::Crawled, Some(now))
            .await
            .unwrap();
        let source = storage.get_source(source.id).await.unwrap().unwrap();
        assert_eq!(source.crawl_state, CrawlState::Crawled);
        assert_eq!(source.last_crawled, Some(now));
    }
}
