use aurora_core::constants::MIN_KEYWORD_LENGTH;
use aurora_core::{Article, ArticleStore, Error, NewsPage, QueryFilter, Result};
use chrono::{DateTime, Duration, Local, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::ResponseCache;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub retention_days: u32,
    pub cutoff: DateTime<Utc>,
    pub before: u64,
    pub deleted: u64,
    pub after: u64,
}

/// Read side of the store, fronted by a TTL cache.
pub struct QueryService {
    store: Arc<dyn ArticleStore>,
    cache: ResponseCache<QueryFilter, NewsPage>,
}

/// Start of the current local day, in UTC.
fn local_midnight() -> DateTime<Utc> {
    Local::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or_else(|| Utc::now() - Duration::hours(24))
}

impl QueryService {
    pub fn new(store: Arc<dyn ArticleStore>, cache_ttl: std::time::Duration) -> Self {
        Self {
            store,
            cache: ResponseCache::new(cache_ttl),
        }
    }

    pub fn store(&self) -> &Arc<dyn ArticleStore> {
        &self.store
    }

    pub async fn query(&self, filter: &QueryFilter) -> Result<NewsPage> {
        filter.validate()?;

        if let Some(page) = self.cache.get(filter) {
            debug!("Cache hit for {:?}", filter);
            return Ok(page);
        }

        let generation = self.cache.generation();
        let (articles, total) = self.store.find_page(filter).await?;
        let facets = self.store.facets().await?;
        let page = NewsPage::new(articles, total, filter, facets);
        info!(
            "Fetched news page {} ({} of {} articles) for {:?}",
            filter.page,
            page.articles.len(),
            total,
            filter
        );

        if !self.cache.insert_if_current(filter.clone(), page.clone(), generation) {
            debug!("Cache invalidated while loading; not caching page");
        }
        Ok(page)
    }

    /// Articles fetched since local midnight, newest first.
    pub async fn today(&self) -> Result<Vec<Article>> {
        let articles = self.store.fetched_since(local_midnight()).await?;
        info!("Retrieved {} articles for today", articles.len());
        Ok(articles)
    }

    pub async fn search(&self, keyword: &str, page: i64, size: i64) -> Result<NewsPage> {
        let keyword = keyword.trim();
        if keyword.chars().count() < MIN_KEYWORD_LENGTH {
            return Err(Error::Validation(format!(
                "Search query must be at least {} characters long",
                MIN_KEYWORD_LENGTH
            )));
        }
        let filter = QueryFilter::new(None, None, None, Some(keyword.to_string()), page, size);
        self.query(&filter).await
    }

    /// Delete everything fetched more than `retention_days` ago.
    pub async fn cleanup(&self, retention_days: u32) -> Result<CleanupReport> {
        info!("🧹 Starting cleanup of old news articles");
        let cutoff = Utc::now() - Duration::days(retention_days as i64);

        let before = self.store.count().await?;
        let deleted = self.store.delete_fetched_before(cutoff).await?;
        let after = self.store.count().await?;
        if deleted > 0 {
            self.invalidate();
        }

        info!(
            "Cleanup completed: deleted {} old articles (older than {} days). Articles before: {}, after: {}",
            deleted, retention_days, before, after
        );
        Ok(CleanupReport {
            retention_days,
            cutoff,
            before,
            deleted,
            after,
        })
    }

    pub fn invalidate(&self) -> usize {
        let dropped = self.cache.invalidate_all();
        debug!("News cache cleared ({} entries)", dropped);
        dropped
    }

    pub fn cache_entries(&self) -> usize {
        self.cache.len()
    }
}
