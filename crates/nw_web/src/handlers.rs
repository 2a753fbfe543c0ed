use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use nw_core::{Article, ArticleStore, Error, NewSource, Source, SourceStore};
use nw_pipeline::{TriggerOutcome, TriggerStatus};

use crate::error::ApiError;
use crate::AppState;

pub async fn list_sources(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Source>>, ApiError> {
    let sources = state.pipeline.storage().list_sources().await?;
    Ok(Json(sources))
}

pub async fn create_source(
    State(state): State<Arc<AppState>>,
    Json(source): Json<NewSource>,
) -> Result<(StatusCode, Json<Source>), ApiError> {
    let created = state.pipeline.storage().insert_source(&source).await?;
    info!("Registered source: {} ({})", created.name, created.base_url);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_source(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Source>, ApiError> {
    let source = state
        .pipeline
        .storage()
        .get_source_by_name(&name)
        .await?
        .ok_or(Error::SourceNotFound(name))?;
    Ok(Json(source))
}

/// Kicks off a background crawl for one source. The response carries
/// the state-machine verdict rather than a blanket acknowledgement.
pub async fn trigger_crawl(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<TriggerOutcome>), ApiError> {
    let outcome = state.pipeline.clone().trigger_crawl(&name).await?;
    let status = match outcome.status {
        TriggerStatus::Accepted => StatusCode::ACCEPTED,
        TriggerStatus::Throttled | TriggerStatus::AlreadyCrawled => StatusCode::OK,
        TriggerStatus::NotFound => StatusCode::NOT_FOUND,
    };
    Ok((status, Json(outcome)))
}

pub async fn crawl_all(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<Value>) {
    let pipeline = Arc::clone(&state.pipeline);
    tokio::spawn(async move {
        if let Err(e) = pipeline.crawl_all().await {
            error!("Background crawl of all sources failed: {}", e);
        }
    });
    (
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Crawl started for all sources" })),
    )
}

#[derive(Debug, Deserialize)]
pub struct ArticleQuery {
    pub source_id: i64,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticleQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let articles = state
        .pipeline
        .storage()
        .get_articles_by_source(query.source_id)
        .await?;
    Ok(Json(articles))
}

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub url: String,
}

/// Single-URL ingestion. Returns the stored article, existing or new.
pub async fn detect(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DetectRequest>,
) -> Result<Json<Article>, ApiError> {
    let article = state.pipeline.process_url(&request.url).await?;
    Ok(Json(article))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nw_core::{ClassifierService, Result, SentimentPrediction};
    use nw_pipeline::{Fetch, Pipeline};
    use nw_storage::MemoryStorage;

    struct StubClassifier;

    #[async_trait]
    impl ClassifierService for StubClassifier {
        fn name(&self) -> &str {
            "stub"
        }

        async fn classify_category(&self, _text: &str) -> Result<String> {
            Ok("Politics".to_string())
        }

        async fn classify_sentiment(&self, _text: &str) -> Result<SentimentPrediction> {
            Ok(SentimentPrediction::from_probs([0.1, 0.8, 0.1]))
        }
    }

    struct OfflineFetcher;

    #[async_trait]
    impl Fetch for OfflineFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            Err(Error::Scraping(format!("offline: {}", url)))
        }
    }

    async fn test_state() -> Arc<AppState> {
        let storage = Arc::new(MemoryStorage::new().await.unwrap());
        let pipeline = Arc::new(Pipeline::new(
            storage,
            Arc::new(StubClassifier),
            Arc::new(OfflineFetcher),
        ));
        Arc::new(AppState::new(pipeline))
    }

    #[tokio::test]
    async fn test_source_registration_roundtrip() {
        let state = test_state().await;

        let (status, Json(created)) = create_source(
            State(state.clone()),
            Json(NewSource::new("example", "http://news.example.com/")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.name, "example");

        let Json(sources) = list_sources(State(state.clone())).await.unwrap();
        assert_eq!(sources.len(), 1);

        let Json(found) = get_source(State(state), Path("example".to_string()))
            .await
            .unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_get_source_missing_is_404() {
        let state = test_state().await;
        let err = get_source(State(state), Path("nope".to_string()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err.0, Error::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_trigger_unknown_source_is_404() {
        let state = test_state().await;
        let (status, Json(outcome)) = trigger_crawl(State(state), Path("nope".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(outcome.status, TriggerStatus::NotFound);
    }

    #[tokio::test]
    async fn test_trigger_known_source_is_accepted() {
        let state = test_state().await;
        create_source(
            State(state.clone()),
            Json(NewSource::new("example", "http://news.example.com/")),
        )
        .await
        .unwrap();

        let (status, Json(outcome)) = trigger_crawl(State(state), Path("example".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(outcome.status, TriggerStatus::Accepted);
    }

    #[tokio::test]
    async fn test_detect_rejects_invalid_url() {
        let state = test_state().await;
        let err = detect(
            State(state),
            Json(DetectRequest {
                url: "not a url".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err.0, Error::InvalidUrl(_)));
    }
}
