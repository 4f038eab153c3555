use aurora_core::constants::{DEFAULT_CACHE_TTL_SECS, DEFAULT_RETENTION_DAYS};
use aurora_core::{Article, ArticleStore, NewsPage, QueryFilter, RefreshFilter, Result, Summarizer};
use aurora_providers::{HealthSummary, ProviderRegistry};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::aggregator::{Aggregator, RefreshOutcome};
use crate::ingest::IngestionPipeline;
use crate::query::{CleanupReport, QueryService};

#[derive(Debug, Clone)]
pub struct NewsServiceConfig {
    pub cache_ttl: Duration,
    pub retention_days: u32,
}

impl Default for NewsServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    refreshes_completed: AtomicU64,
    refreshes_failed: AtomicU64,
    articles_saved: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub active_providers: usize,
    pub total_providers: usize,
    pub refreshes_completed: u64,
    pub refreshes_failed: u64,
    pub articles_saved: u64,
    pub cache_entries: usize,
    pub uptime_millis: u64,
}

/// Entry point for everything that reads or refreshes news.
pub struct NewsService {
    aggregator: Aggregator,
    query: QueryService,
    retention_days: u32,
    counters: Counters,
    started_at: Instant,
}

impl NewsService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        registry: Arc<ProviderRegistry>,
        summarizer: Arc<dyn Summarizer>,
        config: NewsServiceConfig,
    ) -> Self {
        let pipeline = IngestionPipeline::new(store.clone(), summarizer);
        Self {
            aggregator: Aggregator::new(registry, pipeline),
            query: QueryService::new(store, config.cache_ttl),
            retention_days: config.retention_days,
            counters: Counters::default(),
            started_at: Instant::now(),
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        self.aggregator.registry()
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Pull from the providers and store what is new. The read cache is
    /// cleared once the batch is persisted.
    pub async fn refresh(&self, filter: &RefreshFilter) -> Result<RefreshOutcome> {
        match self.aggregator.refresh(filter).await {
            Ok(outcome) => {
                self.query.invalidate();
                self.counters.refreshes_completed.fetch_add(1, Ordering::Relaxed);
                self.counters
                    .articles_saved
                    .fetch_add(outcome.report.saved as u64, Ordering::Relaxed);
                Ok(outcome)
            }
            Err(e) => {
                error!("News refresh failed for {}: {}", filter, e);
                self.counters.refreshes_failed.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    pub async fn news(&self, filter: &QueryFilter) -> Result<NewsPage> {
        self.query.query(filter).await
    }

    pub async fn today(&self) -> Result<Vec<Article>> {
        self.query.today().await
    }

    pub async fn search(&self, keyword: &str, page: i64, size: i64) -> Result<NewsPage> {
        self.query.search(keyword, page, size).await
    }

    /// Retention sweep; `None` uses the configured number of days.
    pub async fn cleanup(&self, retention_days: Option<u32>) -> Result<CleanupReport> {
        self.query.cleanup(retention_days.unwrap_or(self.retention_days)).await
    }

    pub fn clear_cache(&self) -> usize {
        let dropped = self.query.invalidate();
        info!("News cache cleared manually");
        dropped
    }

    pub fn active_providers(&self) -> Vec<String> {
        self.registry()
            .enabled_providers()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Every provider with a short status, e.g. `GNews (enabled (unhealthy))`.
    pub fn provider_descriptions(&self) -> Vec<String> {
        self.registry()
            .all_providers()
            .iter()
            .map(|p| {
                let status = match (p.is_enabled(), p.is_healthy()) {
                    (true, true) => "enabled",
                    (true, false) => "enabled (unhealthy)",
                    (false, _) => "disabled",
                };
                format!("{} ({})", p.name(), status)
            })
            .collect()
    }

    pub fn health_summary(&self) -> HealthSummary {
        self.registry().health_summary()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_providers: self.registry().enabled_providers().len(),
            total_providers: self.registry().all_providers().len(),
            refreshes_completed: self.counters.refreshes_completed.load(Ordering::Relaxed),
            refreshes_failed: self.counters.refreshes_failed.load(Ordering::Relaxed),
            articles_saved: self.counters.articles_saved.load(Ordering::Relaxed),
            cache_entries: self.query.cache_entries(),
            uptime_millis: self.started_at.elapsed().as_millis() as u64,
        }
    }
}
