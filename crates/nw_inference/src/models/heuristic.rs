use async_trait::async_trait;
use std::fmt;

use nw_core::taxonomy::{argmax, label_for_index, CATEGORIES};
use nw_core::{ClassifierService, Result, SentimentPrediction};

use super::{truncate_tokens, MAX_TOKENS};

/// Keyword-frequency classifier. Deterministic and dependency-free, used
/// as the default model and as a stand-in when no inference endpoint is
/// configured.
pub struct HeuristicModel;

const CATEGORY_KEYWORDS: [&[&str]; 10] = [
    &["film", "movie", "music", "celebrity", "show", "actor"],
    &["market", "economy", "bank", "trade", "company", "profit"],
    &["election", "government", "parliament", "minister", "party", "vote"],
    &["court", "judge", "ruling", "verdict", "appeal", "tribunal"],
    &["police", "arrest", "murder", "theft", "fraud", "investigation"],
    &["heritage", "festival", "art", "museum", "tradition", "literature"],
    &["match", "tournament", "player", "goal", "championship", "team"],
    &["research", "study", "scientists", "experiment", "discovery", "space"],
    &["diplomatic", "embassy", "treaty", "foreign", "summit", "border"],
    &["software", "startup", "internet", "device", "digital", "platform"],
];

const POSITIVE_WORDS: &[&str] = &["good", "great", "win", "success", "growth", "improve", "record"];
const NEGATIVE_WORDS: &[&str] = &["bad", "crisis", "loss", "death", "fail", "decline", "attack"];

impl fmt::Debug for HeuristicModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeuristicModel").finish()
    }
}

impl HeuristicModel {
    pub fn new() -> Self {
        Self
    }

    fn keyword_hits(text: &str, keywords: &[&str]) -> usize {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|w| keywords.contains(&w.as_str()))
            .count()
    }
}

impl Default for HeuristicModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClassifierService for HeuristicModel {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn classify_category(&self, text: &str) -> Result<String> {
        let text = truncate_tokens(text, MAX_TOKENS);
        let hits: Vec<f32> = CATEGORY_KEYWORDS
            .iter()
            .map(|keywords| Self::keyword_hits(&text, keywords) as f32)
            .collect();

        let total: f32 = hits.iter().sum();
        let probs: Vec<f32> = if total == 0.0 {
            // No signal at all: everything collapses onto International
            let mut flat = vec![0.0; CATEGORIES.len()];
            flat[8] = 1.0;
            flat
        } else {
            hits.iter().map(|h| h / total).collect()
        };

        Ok(label_for_index(argmax(&probs)))
    }

    async fn classify_sentiment(&self, text: &str) -> Result<SentimentPrediction> {
        let text = truncate_tokens(text, MAX_TOKENS);
        let positive = Self::keyword_hits(&text, POSITIVE_WORDS) as f32;
        let negative = Self::keyword_hits(&text, NEGATIVE_WORDS) as f32;
        // Neutral mass shrinks as polar evidence accumulates
        let neutral = 1.0;

        let total = positive + negative + neutral;
        Ok(SentimentPrediction::from_probs([
            negative / total,
            neutral / total,
            positive / total,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_category_keywords() {
        let model = HeuristicModel::new();
        let label = model
            .classify_category("The parliament passed the bill after the election as the minister promised")
            .await
            .unwrap();
        assert_eq!(label, "Politics");

        let label = model
            .classify_category("The team won the championship match with a late goal")
            .await
            .unwrap();
        assert_eq!(label, "Sports");
    }

    #[tokio::test]
    async fn test_no_signal_defaults_to_international() {
        let model = HeuristicModel::new();
        let label = model.classify_category("lorem ipsum dolor").await.unwrap();
        assert_eq!(label, "International");
    }

    #[tokio::test]
    async fn test_sentiment_scores_bounded() {
        let model = HeuristicModel::new();
        let prediction = model
            .classify_sentiment("A great win and record growth, a real success")
            .await
            .unwrap();
        assert_eq!(prediction.label, "positive");
        let (neg, neu, pos) = prediction.scores.as_percentages();
        for score in [neg, neu, pos] {
            assert!((0..=100).contains(&score));
        }
    }

    #[tokio::test]
    async fn test_sentiment_neutral_without_signal() {
        let model = HeuristicModel::new();
        let prediction = model.classify_sentiment("The cat sat on the mat").await.unwrap();
        assert_eq!(prediction.label, "neutral");
    }
}
