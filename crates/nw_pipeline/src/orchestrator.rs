use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use url::Url;

use nw_core::taxonomy::owner_for_label;
use nw_core::{
    Article, ClassifierService, CrawlState, Error, LanguageService, NewArticle, NewSource, Result,
    SentimentScores, Source, Storage,
};

use crate::discovery::discover_links;
use crate::extract::{batch_filter, extract_article, fast_path_filter, MIN_LINK_LEN};
use crate::fetch::Fetch;
use crate::normalize::normalize_language;
use crate::outcome::{CrawlReport, LinkOutcome, SkipReason};

pub const DEFAULT_MAX_LINKS_PER_SOURCE: usize = 10;

const DEFAULT_WORKING_LANGUAGE: &str = "en";

/// Reserved source owning articles ingested through the single-URL
/// path, which have no registered origin. Registered on first use.
pub const DETACHED_SOURCE_NAME: &str = "detached";

/// Placeholder persisted when a model is unavailable. Extracted,
/// well-formed content is never dropped over a classification failure.
const UNCLASSIFIED: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStatus {
    /// Crawl launched in the background; poll the source state for
    /// completion.
    Accepted,
    /// Source was already crawling; its state was flipped to idle.
    Throttled,
    AlreadyCrawled,
    NotFound,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TriggerOutcome {
    pub status: TriggerStatus,
    pub message: String,
}

struct Classified {
    category: String,
    sentiment: String,
    scores: SentimentScores,
}

/// Composes discovery, extraction, normalization, classification and
/// persistence per source, and owns the per-source crawl-state machine.
/// One bad link or source never aborts the surrounding loop.
pub struct Pipeline {
    storage: Arc<dyn Storage>,
    classifier: Arc<dyn ClassifierService>,
    language: Option<Arc<dyn LanguageService>>,
    fetcher: Arc<dyn Fetch>,
    max_links_per_source: usize,
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl Pipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        classifier: Arc<dyn ClassifierService>,
        fetcher: Arc<dyn Fetch>,
    ) -> Self {
        Self {
            storage,
            classifier,
            language: None,
            fetcher,
            max_links_per_source: DEFAULT_MAX_LINKS_PER_SOURCE,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_language(mut self, language: Arc<dyn LanguageService>) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links_per_source = max_links;
        self
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// The per-source lease. Concurrent crawls of the same source
    /// serialize here; the `crawl_state` column alone is racy.
    async fn source_lock(&self, source_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(source_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn classify(&self, text: &str) -> Classified {
        let category = match self.classifier.classify_category(text).await {
            Ok(label) => label,
            Err(e) => {
                warn!("Category classification failed, persisting with placeholder: {}", e);
                UNCLASSIFIED.to_string()
            }
        };
        let (sentiment, scores) = match self.classifier.classify_sentiment(text).await {
            Ok(prediction) => (prediction.label, prediction.scores),
            Err(e) => {
                warn!("Sentiment classification failed, persisting with placeholder: {}", e);
                (UNCLASSIFIED.to_string(), SentimentScores::default())
            }
        };
        Classified {
            category,
            sentiment,
            scores,
        }
    }

    async fn process_link(&self, source: &Source, url: &str) -> LinkOutcome {
        // Dedup before any expensive work
        match self.storage.get_article_by_url(url).await {
            Ok(Some(_)) => {
                return LinkOutcome::Skipped {
                    url: url.to_string(),
                    reason: SkipReason::AlreadyExists,
                }
            }
            Ok(None) => {}
            Err(e) => {
                return LinkOutcome::Failed {
                    url: url.to_string(),
                    reason: format!("Dedup lookup failed: {}", e),
                }
            }
        }

        if url.len() < MIN_LINK_LEN {
            return LinkOutcome::Skipped {
                url: url.to_string(),
                reason: SkipReason::UrlTooShort,
            };
        }

        let extracted = match extract_article(self.fetcher.as_ref(), url).await {
            Some(extracted) => extracted,
            None => {
                return LinkOutcome::Skipped {
                    url: url.to_string(),
                    reason: SkipReason::ExtractionFailed,
                }
            }
        };

        if let Err(reason) = batch_filter(&extracted) {
            info!("Skipping {}: {}", url, reason);
            return LinkOutcome::Skipped {
                url: url.to_string(),
                reason,
            };
        }

        let content =
            normalize_language(self.language.as_deref(), &extracted.content, &source.language)
                .await;
        let classified = self.classify(&content).await;
        let (negative, neutral, positive) = classified.scores.as_percentages();

        let article = NewArticle {
            source_id: source.id,
            url: url.to_string(),
            title: extracted.title,
            author: None,
            content,
            summary: None,
            owner: owner_for_label(&classified.category).to_string(),
            category: classified.category,
            sentiment: classified.sentiment,
            negative_score: negative,
            neutral_score: neutral,
            positive_score: positive,
        };

        match self.storage.insert_article(&article).await {
            Ok(stored) => {
                info!("Saved article: {} from {}", stored.title, url);
                LinkOutcome::Persisted {
                    url: url.to_string(),
                    article_id: stored.id,
                }
            }
            // Lost an insert race; the record exists, which is what matters
            Err(Error::DuplicateUrl(_)) => LinkOutcome::Skipped {
                url: url.to_string(),
                reason: SkipReason::AlreadyExists,
            },
            Err(e) => {
                error!("Failed to persist {}: {}", url, e);
                LinkOutcome::Failed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Runs the full link loop for one source and marks it crawled.
    /// Callers set the `Crawling` state before invoking this.
    pub async fn run_source(&self, source: &Source) -> Result<CrawlReport> {
        let lock = self.source_lock(source.id).await;
        let _guard = lock.lock().await;

        info!("Crawling source: {} ({})", source.name, source.base_url);
        let mut report = CrawlReport::new(&source.name);

        let links = discover_links(self.fetcher.as_ref(), &source.base_url).await;
        report.discovered = links.len();
        if links.is_empty() {
            info!("No links found for source {}", source.name);
        }

        for link in links.into_iter().take(self.max_links_per_source) {
            let outcome = self.process_link(source, &link.url).await;
            report.outcomes.push(outcome);
        }

        self.storage
            .set_crawl_state(source.id, CrawlState::Crawled, Some(Utc::now()))
            .await?;
        info!(
            "Finished crawling {}: {} persisted, {} skipped, {} failed",
            source.name,
            report.persisted(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// Crawls every active source in registry order. A source-level
    /// failure is logged and the batch continues.
    pub async fn crawl_all(&self) -> Result<Vec<CrawlReport>> {
        let sources = self.storage.list_sources().await?;
        if sources.is_empty() {
            info!("No sources found to crawl");
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for source in sources.into_iter().filter(|s| s.is_active) {
            if let Err(e) = self
                .storage
                .set_crawl_state(source.id, CrawlState::Crawling, None)
                .await
            {
                error!("Failed to mark {} as crawling: {}", source.name, e);
                continue;
            }
            match self.run_source(&source).await {
                Ok(report) => reports.push(report),
                Err(e) => error!("Error processing source {}: {}", source.name, e),
            }
        }
        Ok(reports)
    }

    /// Launches a crawl for one source in the background and reports a
    /// real status instead of an unconditional acknowledgement.
    pub async fn trigger_crawl(self: Arc<Self>, source_name: &str) -> Result<TriggerOutcome> {
        let source = match self.storage.get_source_by_name(source_name).await? {
            Some(source) => source,
            None => {
                return Ok(TriggerOutcome {
                    status: TriggerStatus::NotFound,
                    message: format!("Source '{}' not found", source_name),
                })
            }
        };

        // The verdict is decided under the source lease so two
        // simultaneous triggers cannot both read a stale state. A held
        // lease means a crawl is running right now.
        let lock = self.source_lock(source.id).await;
        let _guard = match lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                self.storage
                    .set_crawl_state(source.id, CrawlState::Idle, None)
                    .await?;
                return Ok(TriggerOutcome {
                    status: TriggerStatus::Throttled,
                    message: format!(
                        "Source '{}' was already crawling; state moved to idle",
                        source_name
                    ),
                });
            }
        };
        let source = self
            .storage
            .get_source(source.id)
            .await?
            .ok_or_else(|| Error::SourceNotFound(source_name.to_string()))?;

        match source.crawl_state {
            CrawlState::Crawled => Ok(TriggerOutcome {
                status: TriggerStatus::AlreadyCrawled,
                message: format!("Source '{}' is already crawled", source_name),
            }),
            CrawlState::Crawling => {
                // Current contract: a second trigger throttles the source
                // back to idle instead of queueing
                self.storage
                    .set_crawl_state(source.id, CrawlState::Idle, None)
                    .await?;
                Ok(TriggerOutcome {
                    status: TriggerStatus::Throttled,
                    message: format!(
                        "Source '{}' was already crawling; state moved to idle",
                        source_name
                    ),
                })
            }
            CrawlState::NotStarted | CrawlState::Idle => {
                self.storage
                    .set_crawl_state(source.id, CrawlState::Crawling, None)
                    .await?;
                let pipeline = Arc::clone(&self);
                tokio::spawn(async move {
                    match pipeline.run_source(&source).await {
                        Ok(report) => info!(
                            "Background crawl of {} finished: {} persisted, {} skipped, {} failed",
                            report.source,
                            report.persisted(),
                            report.skipped(),
                            report.failed()
                        ),
                        Err(e) => error!("Background crawl of {} failed: {}", source.name, e),
                    }
                });
                Ok(TriggerOutcome {
                    status: TriggerStatus::Accepted,
                    message: format!("Crawl accepted for source '{}'", source_name),
                })
            }
        }
    }

    /// Id of the reserved source for detached articles, registering it
    /// if this store has never seen one. An insert race falls back to
    /// the row the other writer created.
    async fn detached_source_id(&self) -> Result<i64> {
        if let Some(source) = self.storage.get_source_by_name(DETACHED_SOURCE_NAME).await? {
            return Ok(source.id);
        }
        let mut reserved = NewSource::new(DETACHED_SOURCE_NAME, "");
        reserved.crawling_strategy = "manual".to_string();
        match self.storage.insert_source(&reserved).await {
            Ok(created) => Ok(created.id),
            Err(_) => self
                .storage
                .get_source_by_name(DETACHED_SOURCE_NAME)
                .await?
                .map(|source| source.id)
                .ok_or_else(|| {
                    Error::Storage("Failed to register the detached source".to_string())
                }),
        }
    }

    /// Single-URL fast path. Idempotent: an existing record is returned
    /// without re-extracting or re-classifying.
    pub async fn process_url(&self, url: &str) -> Result<Article> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::InvalidUrl(format!(
                "Unsupported scheme '{}' in {}",
                parsed.scheme(),
                url
            )));
        }

        if let Some(existing) = self.storage.get_article_by_url(url).await? {
            info!("Article already exists: {}", existing.title);
            return Ok(existing);
        }

        let mut extracted = extract_article(self.fetcher.as_ref(), url)
            .await
            .ok_or_else(|| Error::Scraping(format!("Failed to extract article from {}", url)))?;

        fast_path_filter(&mut extracted)
            .map_err(|reason| Error::Scraping(format!("{} for {}", reason, url)))?;

        let content = normalize_language(
            self.language.as_deref(),
            &extracted.content,
            DEFAULT_WORKING_LANGUAGE,
        )
        .await;
        let classified = self.classify(&content).await;
        let (negative, neutral, positive) = classified.scores.as_percentages();

        let article = NewArticle {
            source_id: self.detached_source_id().await?,
            url: url.to_string(),
            title: extracted.title,
            author: None,
            content,
            summary: None,
            owner: owner_for_label(&classified.category).to_string(),
            category: classified.category,
            sentiment: classified.sentiment,
            negative_score: negative,
            neutral_score: neutral,
            positive_score: positive,
        };

        match self.storage.insert_article(&article).await {
            Ok(stored) => Ok(stored),
            Err(Error::DuplicateUrl(_)) => self
                .storage
                .get_article_by_url(url)
                .await?
                .ok_or_else(|| Error::Storage(format!("Lost insert race for {}", url))),
            Err(e) => Err(e),
        }
    }
}
