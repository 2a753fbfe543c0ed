use tracing::{debug, warn};

use nw_core::LanguageService;

/// Brings content into the pipeline's working language. Detection or
/// translation failures degrade to the original text with a logged
/// warning; the article is never dropped here.
pub async fn normalize_language(
    service: Option<&dyn LanguageService>,
    text: &str,
    working_language: &str,
) -> String {
    let service = match service {
        Some(service) => service,
        None => return text.to_string(),
    };

    let detected = match service.detect(text).await {
        Ok(lang) => lang,
        Err(e) => {
            warn!("Language detection failed, keeping original text: {}", e);
            return text.to_string();
        }
    };

    if detected == working_language {
        debug!("Content already in working language '{}'", working_language);
        return text.to_string();
    }

    match service.translate(text, working_language).await {
        Ok(translated) => {
            debug!("Translated content from '{}' to '{}'", detected, working_language);
            translated
        }
        Err(e) => {
            warn!("Translation failed, keeping original text: {}", e);
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nw_core::{Error, Result};

    struct FakeLanguage {
        detect: Result<String>,
        translate: Result<String>,
    }

    impl FakeLanguage {
        fn new(detect: Result<String>, translate: Result<String>) -> Self {
            Self { detect, translate }
        }
    }

    #[async_trait]
    impl LanguageService for FakeLanguage {
        async fn detect(&self, _text: &str) -> Result<String> {
            match &self.detect {
                Ok(lang) => Ok(lang.clone()),
                Err(_) => Err(Error::Translation("detection unavailable".to_string())),
            }
        }

        async fn translate(&self, _text: &str, _target: &str) -> Result<String> {
            match &self.translate {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(Error::Translation("translation unavailable".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_disabled_service_keeps_text() {
        assert_eq!(normalize_language(None, "hola", "en").await, "hola");
    }

    #[tokio::test]
    async fn test_same_language_skips_translation() {
        let service = FakeLanguage::new(Ok("en".to_string()), Ok("unused".to_string()));
        assert_eq!(normalize_language(Some(&service), "hello", "en").await, "hello");
    }

    #[tokio::test]
    async fn test_translates_foreign_text() {
        let service = FakeLanguage::new(Ok("es".to_string()), Ok("hello".to_string()));
        assert_eq!(normalize_language(Some(&service), "hola", "en").await, "hello");
    }

    #[tokio::test]
    async fn test_detection_failure_keeps_original() {
        let service = FakeLanguage::new(
            Err(Error::Translation("down".to_string())),
            Ok("unused".to_string()),
        );
        assert_eq!(normalize_language(Some(&service), "hola", "en").await, "hola");
    }

    #[tokio::test]
    async fn test_translation_failure_keeps_original() {
        let service = FakeLanguage::new(
            Ok("es".to_string()),
            Err(Error::Translation("down".to_string())),
        );
        assert_eq!(normalize_language(Some(&service), "hola", "en").await, "hola");
    }
}
