use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use nw_core::{
    Article, ArticleStore, CrawlState, Error, NewArticle, NewSource, Result, Source, SourceStore,
};

use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sources (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        base_url TEXT NOT NULL,
        language TEXT NOT NULL,
        crawling_strategy TEXT NOT NULL,
        crawl_state TEXT NOT NULL DEFAULT 'not_started',
        last_crawled TEXT,
        is_active INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source_id INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
        url TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        author TEXT,
        content TEXT NOT NULL,
        summary TEXT,
        published_at TEXT NOT NULL,
        category TEXT NOT NULL,
        sentiment TEXT NOT NULL,
        negative_score INTEGER NOT NULL,
        neutral_score INTEGER NOT NULL,
        positive_score INTEGER NOT NULL,
        owner TEXT NOT NULL,
        thumbnail_url TEXT,
        tags TEXT,
        is_featured INTEGER NOT NULL DEFAULT 0,
        is_reported INTEGER NOT NULL DEFAULT 0,
        reported_reason TEXT
    )
    "#,
    // Add future migrations here
];

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./articles.db"
    }

    async fn new() -> Result<Self> {
        Self::new_with_path(Path::new("articles.db")).await
    }
}

impl SqliteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePool::connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
            .await
            .map_err(|e| Error::Storage(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse timestamp: {}", e)))
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    Ok(Article {
        id: row.get("id"),
        source_id: row.get("source_id"),
        url: row.get("url"),
        title: row.get("title"),
        author: row.get("author"),
        content: row.get("content"),
        summary: row.get("summary"),
        published_at: parse_timestamp(&row.get::<String, _>("published_at"))?,
        category: row.get("category"),
        sentiment: row.get("sentiment"),
        negative_score: row.get("negative_score"),
        neutral_score: row.get("neutral_score"),
        positive_score: row.get("positive_score"),
        owner: row.get("owner"),
        thumbnail_url: row.get("thumbnail_url"),
        tags: row.get("tags"),
        is_featured: row.get("is_featured"),
        is_reported: row.get("is_reported"),
        reported_reason: row.get("reported_reason"),
    })
}

fn row_to_source(row: &SqliteRow) -> Result<Source> {
    let last_crawled: Option<String> = row.get("last_crawled");
    Ok(Source {
        id: row.get("id"),
        name: row.get("name"),
        base_url: row.get("base_url"),
        language: row.get("language"),
        crawling_strategy: row.get("crawling_strategy"),
        crawl_state: CrawlState::from_str(&row.get::<String, _>("crawl_state"))?,
        last_crawled: last_crawled.as_deref().map(parse_timestamp).transpose()?,
        is_active: row.get("is_active"),
    })
}

fn map_insert_error(url: &str, e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return Error::DuplicateUrl(url.to_string());
        }
    }
    Error::Storage(format!("Failed to insert article: {}", e))
}

#[async_trait]
impl ArticleStore for SqliteStorage {
    async fn insert_article(&self, article: &NewArticle) -> Result<Article> {
        let published_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (source_id, url, title, author, content, summary, published_at,
             category, sentiment, negative_score, neutral_score, positive_score, owner)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.source_id)
        .bind(&article.url)
        .bind(&article.title)
        .bind(article.author.as_deref())
        .bind(&article.content)
        .bind(article.summary.as_deref())
        .bind(published_at.to_rfc3339())
        .bind(&article.category)
        .bind(&article.sentiment)
        .bind(article.negative_score)
        .bind(article.neutral_score)
        .bind(article.positive_score)
        .bind(&article.owner)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_insert_error(&article.url, e))?;

        Ok(Article {
            id: result.last_insert_rowid(),
            source_id: article.source_id,
            url: article.url.clone(),
            title: article.title.clone(),
            author: article.author.clone(),
            content: article.content.clone(),
            summary: article.summary.clone(),
            published_at,
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
        })
    }

    async fn get_article_by_url(&self, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE url = ?")
            .bind(url)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to query article: {}", e)))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn get_articles_by_source(&self, source_id: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            "SELECT * FROM articles WHERE source_id = ? ORDER BY published_at DESC",
        )
        .bind(source_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to query articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }
}

#[async_trait]
impl SourceStore for SqliteStorage {
    async fn insert_source(&self, source: &NewSource) -> Result<Source> {
        let result = sqlx::query(
            r#"
            INSERT INTO sources (name, base_url, language, crawling_strategy)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&source.name)
        .bind(&source.base_url)
        .bind(&source.language)
        .bind(&source.crawling_strategy)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to insert source: {}", e)))?;

        Ok(Source {
            id: result.last_insert_rowid(),
            name: source.name.clone(),
            base_url: source.base_url.clone(),
            language: source.language.clone(),
            crawling_strategy: source.crawling_strategy.clone(),
            crawl_state: CrawlState::NotStarted,
            last_crawled: None,
            is_active: true,
        })
    }

    async fn get_source(&self, id: i64) -> Result<Option<Source>> {
        let row = sqlx::query("SELECT * FROM sources WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to query source: {}", e)))?;

        row.as_ref().map(row_to_source).transpose()
    }

    async fn get_source_by_name(&self, name: &str) -> Result<Option<Source>> {
        let row = sqlx::query("SELECT * FROM sources WHERE name = ?")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to query source: {}", e)))?;

        row.as_ref().map(row_to_source).transpose()
    }

    async fn list_sources(&self) -> Result<Vec<Source>> {
        let rows = sqlx::query("SELECT * FROM sources ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to list sources: {}", e)))?;

        rows.iter().map(row_to_source).collect()
    }

    async fn set_crawl_state(
        &self,
        id: i64,
        state: CrawlState,
        last_crawled: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE sources
            SET crawl_state = ?,
                last_crawled = COALESCE(?, last_crawled)
            WHERE id = ?
            "#,
        )
        .bind(state.as_str())
        .bind(last_crawled.map(|t| t.to_rfc3339()))
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to update crawl state: {}", e)))?;

        if updated.rows_affected() == 0 {
            return Err(Error::SourceNotFound(id.to_string()));
        }
        Ok(())
    }
}
