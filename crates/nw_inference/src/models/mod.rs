use std::sync::Arc;

use nw_core::{ClassifierService, Error, Result};

use crate::Config;

pub mod heuristic;
pub mod remote;

pub use heuristic::HeuristicModel;
pub use remote::RemoteModel;

/// Maximum token count fed to either model. Longer inputs are truncated.
pub const MAX_TOKENS: usize = 512;

/// Truncates text to at most `max_tokens` whitespace tokens, mirroring
/// the tokenizer-side truncation the models were trained with.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    let mut tokens = text.split_whitespace();
    let truncated: Vec<&str> = tokens.by_ref().take(max_tokens).collect();
    if tokens.next().is_none() {
        text.to_string()
    } else {
        truncated.join(" ")
    }
}

pub async fn create_model(name: &str, config: &Config) -> Result<Arc<dyn ClassifierService>> {
    match name {
        "heuristic" => Ok(Arc::new(HeuristicModel::new())),
        "remote" => Ok(Arc::new(RemoteModel::new(
            config.endpoint_url.clone(),
            config.api_key.clone(),
        )?)),
        other => Err(Error::Inference(format!("Unknown model: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_tokens() {
        assert_eq!(truncate_tokens("one two three", 2), "one two");
        assert_eq!(truncate_tokens("one two", 5), "one two");
        assert_eq!(truncate_tokens("keeps   original\nspacing", 10), "keeps   original\nspacing");
    }

    #[tokio::test]
    async fn test_create_model() {
        let config = Config::default();
        assert!(create_model("heuristic", &config).await.is_ok());
        assert!(create_model("nope", &config).await.is_err());
        // Remote model requires an endpoint
        assert!(create_model("remote", &config).await.is_err());
    }
}
