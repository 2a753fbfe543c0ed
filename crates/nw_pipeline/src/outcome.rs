use serde::Serialize;

/// Why a discovered link was skipped. Skips are expected filtering
/// outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyExists,
    UrlTooShort,
    ExtractionFailed,
    MissingTitle,
    MissingContent,
    TitleTooShort,
    ContentTooShort,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::AlreadyExists => "article already exists",
            SkipReason::UrlTooShort => "URL too short",
            SkipReason::ExtractionFailed => "extraction failed",
            SkipReason::MissingTitle => "no title extracted",
            SkipReason::MissingContent => "no content extracted",
            SkipReason::TitleTooShort => "title below word threshold",
            SkipReason::ContentTooShort => "content below length threshold",
        };
        f.write_str(text)
    }
}

/// Per-link outcome collected by the orchestrator instead of
/// catch-and-continue exception flow.
#[derive(Debug, Clone)]
pub enum LinkOutcome {
    Persisted { url: String, article_id: i64 },
    Skipped { url: String, reason: SkipReason },
    Failed { url: String, reason: String },
}

impl LinkOutcome {
    pub fn url(&self) -> &str {
        match self {
            LinkOutcome::Persisted { url, .. }
            | LinkOutcome::Skipped { url, .. }
            | LinkOutcome::Failed { url, .. } => url,
        }
    }
}

/// Summary of one source's crawl loop.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub source: String,
    pub discovered: usize,
    pub outcomes: Vec<LinkOutcome>,
}

impl CrawlReport {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    pub fn persisted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LinkOutcome::Persisted { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LinkOutcome::Skipped { .. }))
            .count()
    }

    pub fn skipped_with(&self, reason: SkipReason) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LinkOutcome::Skipped { reason: r, .. } if *r == reason))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LinkOutcome::Failed { .. }))
            .count()
    }
}
