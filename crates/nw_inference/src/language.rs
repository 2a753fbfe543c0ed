use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use nw_core::{Error, LanguageService, Result};

#[derive(Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct DetectResponse {
    source_lang_code: String,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    trans: String,
}

/// Client for a hosted translation API exposing `/detect-language` and
/// `/translator/text` endpoints.
pub struct RemoteLanguageService {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl RemoteLanguageService {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url,
            api_key,
        }
    }
}

impl fmt::Debug for RemoteLanguageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteLanguageService")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl LanguageService for RemoteLanguageService {
    async fn detect(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/detect-language", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&DetectRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Translation(format!(
                "Language detection failed: {}",
                response.status()
            )));
        }

        Ok(response.json::<DetectResponse>().await?.source_lang_code)
    }

    async fn translate(&self, text: &str, target: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/translator/text", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&TranslateRequest {
                from: "auto",
                to: target,
                text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Translation(format!(
                "Translation failed: {}",
                response.status()
            )));
        }

        Ok(response.json::<TranslateResponse>().await?.trans)
    }
}
