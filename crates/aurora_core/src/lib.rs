pub mod constants;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use error::{Error, ProviderError};
pub use models::Summarizer;
pub use storage::{ArticleStore, InsertOutcome};
pub use types::{Article, Facets, NewsPage, QueryFilter, RefreshFilter};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{Article, ArticleStore, Error, QueryFilter, RefreshFilter, Result};
}
