use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/sources", get(handlers::list_sources))
        .route("/api/sources", post(handlers::create_source))
        .route("/api/sources/:name", get(handlers::get_source))
        .route("/api/sources/:name/crawl", post(handlers::trigger_crawl))
        .route("/api/crawl", post(handlers::crawl_all))
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/detect", post(handlers::detect))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, ApiError, AppState};
    pub use nw_core::{Article, Error, Result, Source};
}
