use async_trait::async_trait;

use crate::Result;

/// External language detection and translation capability. The pipeline
/// treats every failure here as non-fatal and keeps the original text.
#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Detects the language of `text`, returning an ISO 639-1 code.
    async fn detect(&self, text: &str) -> Result<String>;

    /// Translates `text` into the `target` language.
    async fn translate(&self, text: &str, target: &str) -> Result<String>;
}
