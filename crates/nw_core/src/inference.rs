use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::taxonomy::{argmax, SENTIMENT_LABELS};
use crate::Result;

/// Calibrated per-class sentiment scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SentimentScores {
    pub negative: f32,
    pub neutral: f32,
    pub positive: f32,
}

impl SentimentScores {
    /// Integer percentages by truncation. The three values need not sum
    /// to 100.
    pub fn as_percentages(&self) -> (i32, i32, i32) {
        (
            (self.negative * 100.0) as i32,
            (self.neutral * 100.0) as i32,
            (self.positive * 100.0) as i32,
        )
    }
}

#[derive(Debug, Clone)]
pub struct SentimentPrediction {
    pub label: String,
    pub scores: SentimentScores,
}

impl SentimentPrediction {
    /// Builds a prediction from a probability vector in the fixed
    /// negative/neutral/positive order.
    pub fn from_probs(probs: [f32; 3]) -> Self {
        Self {
            label: SENTIMENT_LABELS[argmax(&probs)].to_string(),
            scores: SentimentScores {
                negative: probs[0],
                neutral: probs[1],
                positive: probs[2],
            },
        }
    }
}

/// Two independent inference capabilities over pre-trained models.
/// Implementations must not panic on inference failure; they return
/// `Error::Inference` and the caller decides the persistence policy.
#[async_trait]
pub trait ClassifierService: Send + Sync {
    fn name(&self) -> &str;

    /// Argmax label over the 10-class taxonomy, `label_<index>` for
    /// out-of-range indices.
    async fn classify_category(&self, text: &str) -> Result<String>;

    async fn classify_sentiment(&self, text: &str) -> Result<SentimentPrediction>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_from_probs() {
        let prediction = SentimentPrediction::from_probs([0.1, 0.2, 0.7]);
        assert_eq!(prediction.label, "positive");
        assert_eq!(prediction.scores.as_percentages(), (10, 20, 70));
    }

    #[test]
    fn test_percentages_truncate() {
        let scores = SentimentScores {
            negative: 0.333,
            neutral: 0.333,
            positive: 0.334,
        };
        let (neg, neu, pos) = scores.as_percentages();
        assert_eq!((neg, neu, pos), (33, 33, 33));
        assert_ne!(neg + neu + pos, 100);
    }
}
