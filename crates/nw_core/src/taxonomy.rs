use serde::{Deserialize, Serialize};

/// The fixed topic taxonomy. Order matters: the classifier's probability
/// vector is indexed by this declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Entertainment,
    Business,
    Politics,
    Judiciary,
    Crime,
    Culture,
    Sports,
    Science,
    International,
    Technology,
}

pub const CATEGORIES: [Category; 10] = [
    Category::Entertainment,
    Category::Business,
    Category::Politics,
    Category::Judiciary,
    Category::Crime,
    Category::Culture,
    Category::Sports,
    Category::Science,
    Category::International,
    Category::Technology,
];

pub const SENTIMENT_LABELS: [&str; 3] = ["negative", "neutral", "positive"];

impl Category {
    pub fn from_index(index: usize) -> Option<Category> {
        CATEGORIES.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "Entertainment",
            Category::Business => "Business",
            Category::Politics => "Politics",
            Category::Judiciary => "Judiciary",
            Category::Crime => "Crime",
            Category::Culture => "Culture",
            Category::Sports => "Sports",
            Category::Science => "Science",
            Category::International => "International",
            Category::Technology => "Technology",
        }
    }

    /// The oversight entity responsible for articles in this category.
    pub fn owner(&self) -> &'static str {
        match self {
            Category::Entertainment => "Ministry of Information and Broadcasting",
            Category::Business => "Ministry of Finance",
            Category::Politics => "Ministry of Parliamentary Affairs",
            Category::Judiciary => "Ministry of Law and Justice",
            Category::Crime => "Ministry of Home Affairs",
            Category::Culture => "Ministry of Culture",
            Category::Sports => "Ministry of Youth Affairs and Sports",
            Category::Science => "Ministry of Science and Technology",
            Category::International => "Ministry of External Affairs",
            Category::Technology => "Ministry of Electronics and Information Technology",
        }
    }

    pub fn from_label(label: &str) -> Option<Category> {
        CATEGORIES.iter().copied().find(|c| c.as_str() == label)
    }
}

/// Maps a model output index to a category label. Indices outside the
/// taxonomy fall back to a literal placeholder instead of failing.
pub fn label_for_index(index: usize) -> String {
    match Category::from_index(index) {
        Some(category) => category.as_str().to_string(),
        None => format!("label_{}", index),
    }
}

/// Routes a category label to its responsible entity, `"Unknown"` for
/// anything outside the taxonomy (including `label_<n>` fallbacks).
pub fn owner_for_label(label: &str) -> &'static str {
    Category::from_label(label)
        .map(|c| c.owner())
        .unwrap_or("Unknown")
}

/// Index of the largest probability. Ties resolve to the first maximum.
pub fn argmax(probs: &[f32]) -> usize {
    let mut best = 0;
    for (i, p) in probs.iter().enumerate() {
        if *p > probs[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_order() {
        assert_eq!(label_for_index(0), "Entertainment");
        assert_eq!(label_for_index(2), "Politics");
        assert_eq!(label_for_index(9), "Technology");
    }

    #[test]
    fn test_unknown_index_falls_back() {
        assert_eq!(label_for_index(10), "label_10");
        assert_eq!(label_for_index(42), "label_42");
    }

    #[test]
    fn test_owner_mapping() {
        assert_eq!(owner_for_label("Crime"), "Ministry of Home Affairs");
        assert_eq!(owner_for_label("Sports"), "Ministry of Youth Affairs and Sports");
        assert_eq!(owner_for_label("label_11"), "Unknown");
        assert_eq!(owner_for_label("Unknown"), "Unknown");
    }

    #[test]
    fn test_every_category_has_an_owner() {
        for category in CATEGORIES {
            assert_ne!(category.owner(), "Unknown");
        }
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.9]), 0);
    }
}
