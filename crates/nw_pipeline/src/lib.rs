//! Ingestion pipeline: link discovery, content extraction, language
//! normalization, classification and persistence, plus the per-source
//! crawl-state machine.

pub mod discovery;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod orchestrator;
pub mod outcome;

pub use discovery::{discover_links, Link, LinkScope};
pub use extract::{Extracted, FALLBACK_TITLE};
pub use fetch::{Fetch, HttpFetcher};
pub use orchestrator::{Pipeline, TriggerOutcome, TriggerStatus, DEFAULT_MAX_LINKS_PER_SOURCE};
pub use outcome::{CrawlReport, LinkOutcome, SkipReason};

pub mod prelude {
    pub use super::{CrawlReport, Fetch, HttpFetcher, LinkOutcome, Pipeline, SkipReason};
    pub use super::{TriggerOutcome, TriggerStatus};
}
