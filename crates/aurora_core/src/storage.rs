use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{Article, Facets, QueryFilter};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored under the returned surrogate id.
    Inserted(i64),
    /// Another record already owns this URL.
    Duplicate,
}

/// Persisted article store. URLs are unique across the store.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Look up an article by its URL
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>>;

    /// Insert a new article; never overwrites an existing URL
    async fn insert(&self, article: &Article) -> Result<InsertOutcome>;

    /// Articles matching the filter, newest first, sliced by the filter's
    /// page and size. Also returns the total number of matches.
    async fn find_page(&self, filter: &QueryFilter) -> Result<(Vec<Article>, u64)>;

    /// Articles fetched at or after `since`, newest first
    async fn fetched_since(&self, since: DateTime<Utc>) -> Result<Vec<Article>>;

    /// Distinct countries, languages, categories and sources
    async fn facets(&self) -> Result<Facets>;

    /// Atomically delete every article fetched before `cutoff`
    async fn delete_fetched_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn count(&self) -> Result<u64>;
}
