pub mod error;
pub mod inference;
pub mod language;
pub mod storage;
pub mod taxonomy;
pub mod types;

pub use error::Error;
pub use inference::{ClassifierService, SentimentPrediction, SentimentScores};
pub use language::LanguageService;
pub use storage::{ArticleStore, SourceStore, Storage};
pub use taxonomy::{Category, SENTIMENT_LABELS};
pub use types::{Article, CrawlState, NewArticle, NewSource, Source};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{Article, CrawlState, Error, NewArticle, NewSource, Result, Source};
    pub use super::{ArticleStore, ClassifierService, LanguageService, SourceStore, Storage};
}
