use nw_core::{ClassifierService, Result};
use std::sync::Arc;

pub mod language;
pub mod models;

pub use models::create_model;

/// Settings for inference backends. Remote models need an endpoint;
/// the heuristic model ignores everything here.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub endpoint_url: Option<String>,
    pub api_key: Option<String>,
}

/// Builds the classifier named by `model`, constructed once at startup
/// and shared by reference with the pipeline.
pub async fn build_classifier(model: &str, config: &Config) -> Result<Arc<dyn ClassifierService>> {
    create_model(model, config).await
}

pub mod prelude {
    pub use super::models::{HeuristicModel, RemoteModel};
    pub use super::{build_classifier, Config};
    pub use nw_core::{ClassifierService, Result, SentimentPrediction};
}
