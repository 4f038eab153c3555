use async_trait::async_trait;
use aurora_core::{ArticleStore, Error, Result};
use std::sync::Arc;
use tracing::info;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn new() -> Result<Self> where Self: Sized;
}

/// Attach the backend's setup hint to a construction failure.
fn backend_error<B: StorageBackend>(e: Error) -> Error {
    Error::Persistence(format!("{} ({})", e, B::get_error_message()))
}

/// Build the store named by `kind` ("memory" or "sqlite"). For SQLite,
/// `location` is the database file path.
pub async fn create_storage(kind: &str, location: Option<&str>) -> Result<Arc<dyn ArticleStore>> {
    match kind.to_lowercase().as_str() {
        "memory" => {
            info!("💾 Using in-memory article store");
            let storage = <InMemoryStorage as StorageBackend>::new()
                .await
                .map_err(backend_error::<InMemoryStorage>)?;
            Ok(Arc::new(storage))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let storage = match location {
                Some(path) => SQLiteStorage::new_with_path(&std::path::PathBuf::from(path)).await,
                None => <SQLiteStorage as StorageBackend>::new().await,
            }
            .map_err(backend_error::<SQLiteStorage>)?;
            info!("💾 Using SQLite article store at {}", storage.get_db_path().display());
            Ok(Arc::new(storage))
        }
        other => {
            let _ = location;
            Err(Error::Config(format!("Unsupported storage backend: {}", other)))
        }
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
