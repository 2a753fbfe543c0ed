use async_trait::async_trait;
use std::sync::Arc;

use nw_core::{Result, Storage};

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn new() -> Result<Self>
    where
        Self: Sized;
}

/// Builds a storage backend by name. `sqlite:<path>` selects the SQLite
/// backend when the feature is enabled; everything else is in-memory.
pub async fn create_storage(kind: &str) -> Result<Arc<dyn Storage>> {
    match kind.split(':').next().unwrap_or("memory") {
        "memory" => Ok(Arc::new(backends::memory::MemoryStorage::new().await?)),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = kind.strip_prefix("sqlite:").unwrap_or("articles.db");
            Ok(Arc::new(
                backends::sqlite::SqliteStorage::new_with_path(std::path::Path::new(path)).await?,
            ))
        }
        other => Err(nw_core::Error::Storage(format!(
            "Unknown storage backend: {}",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
