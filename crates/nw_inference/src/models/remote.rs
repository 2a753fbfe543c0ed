use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use nw_core::taxonomy::{argmax, label_for_index};
use nw_core::{ClassifierService, Error, Result, SentimentPrediction};

use super::{truncate_tokens, MAX_TOKENS};

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
}

#[derive(Deserialize)]
struct InferenceResponse {
    probs: Vec<f32>,
}

/// Client for a hosted inference endpoint serving the pre-trained topic
/// and sentiment models. The endpoint exposes `/category` and
/// `/sentiment`, each returning a probability vector.
pub struct RemoteModel {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl RemoteModel {
    pub fn new(endpoint_url: Option<String>, api_key: Option<String>) -> Result<Self> {
        let base_url = endpoint_url
            .ok_or_else(|| Error::Inference("Remote model requires an endpoint URL".to_string()))?;
        Ok(Self {
            client: Arc::new(Client::new()),
            base_url,
            api_key,
        })
    }

    async fn infer(&self, path: &str, text: &str) -> Result<Vec<f32>> {
        let request = InferenceRequest {
            inputs: truncate_tokens(text, MAX_TOKENS),
        };

        let mut builder = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(Error::Inference(format!(
                "Inference endpoint returned {} for {}",
                response.status(),
                path
            )));
        }

        let body = response.json::<InferenceResponse>().await?;
        if body.probs.is_empty() {
            return Err(Error::Inference(format!(
                "Inference endpoint returned an empty probability vector for {}",
                path
            )));
        }
        Ok(body.probs)
    }
}

impl fmt::Debug for RemoteModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteModel")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl ClassifierService for RemoteModel {
    fn name(&self) -> &str {
        "remote"
    }

    async fn classify_category(&self, text: &str) -> Result<String> {
        let probs = self.infer("category", text).await?;
        Ok(label_for_index(argmax(&probs)))
    }

    async fn classify_sentiment(&self, text: &str) -> Result<SentimentPrediction> {
        let probs = self.infer("sentiment", text).await?;
        if probs.len() != 3 {
            return Err(Error::Inference(format!(
                "Expected 3 sentiment classes, got {}",
                probs.len()
            )));
        }
        Ok(SentimentPrediction::from_probs([probs[0], probs[1], probs[2]]))
    }
}
