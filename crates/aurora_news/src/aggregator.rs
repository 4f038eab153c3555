use aurora_core::{Article, ProviderError, RefreshFilter, Result};
use aurora_providers::{NewsProvider, ProviderRegistry};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::ingest::{IngestReport, IngestionPipeline};

pub const NO_PROVIDERS: &str = "no providers";

/// One provider that contributed nothing because it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFailure {
    pub provider: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub filter: RefreshFilter,
    /// Articles returned by all providers before ingestion
    pub fetched: usize,
    pub providers_total: usize,
    pub providers_contributed: usize,
    pub failures: Vec<ProviderFailure>,
    pub report: IngestReport,
    /// Set when the refresh had nothing to do
    pub reason: Option<String>,
}

impl RefreshOutcome {
    fn skipped(filter: &RefreshFilter, reason: &str) -> Self {
        Self {
            filter: filter.clone(),
            fetched: 0,
            providers_total: 0,
            providers_contributed: 0,
            failures: Vec::new(),
            report: IngestReport::default(),
            reason: Some(reason.to_string()),
        }
    }
}

/// Fans a refresh out to every usable provider and feeds the merged result
/// to the ingestion pipeline.
pub struct Aggregator {
    registry: Arc<ProviderRegistry>,
    pipeline: IngestionPipeline,
}

impl Aggregator {
    pub fn new(registry: Arc<ProviderRegistry>, pipeline: IngestionPipeline) -> Self {
        Self { registry, pipeline }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub async fn refresh(&self, filter: &RefreshFilter) -> Result<RefreshOutcome> {
        info!("🔄 Refreshing news from all providers with filters - {}", filter);

        let providers = self.registry.enabled_providers();
        if providers.is_empty() {
            warn!("No articles found - No enabled providers");
            return Ok(RefreshOutcome::skipped(filter, NO_PROVIDERS));
        }

        let results = fan_out(&providers, filter).await;

        let mut merged = Vec::new();
        let mut failures = Vec::new();
        let mut contributed = 0;
        for (provider, result) in providers.iter().zip(results) {
            match result {
                Ok(articles) if !articles.is_empty() => {
                    contributed += 1;
                    merged.extend(articles);
                }
                Ok(_) => {}
                Err(failure) => {
                    error!("Provider {} failed: {}", provider.name(), failure.message);
                    failures.push(failure);
                }
            }
        }

        info!(
            "Fetched {} articles from {} successful providers out of {} total",
            merged.len(),
            contributed,
            providers.len()
        );

        let fetched = merged.len();
        let report = if merged.is_empty() {
            warn!("No articles found for {}", filter);
            IngestReport::default()
        } else {
            self.pipeline.ingest(merged, filter).await?
        };

        Ok(RefreshOutcome {
            filter: filter.clone(),
            fetched,
            providers_total: providers.len(),
            providers_contributed: contributed,
            failures,
            report,
            reason: None,
        })
    }
}

/// Fetch from every provider concurrently. Results come back in the same
/// order as `providers`; a provider that errors, overruns its timeout or
/// panics yields a [`ProviderFailure`] and never affects its siblings.
async fn fan_out(
    providers: &[Arc<dyn NewsProvider>],
    filter: &RefreshFilter,
) -> Vec<std::result::Result<Vec<Article>, ProviderFailure>> {
    let handles: Vec<_> = providers
        .iter()
        .map(|provider| {
            let provider = Arc::clone(provider);
            let filter = filter.clone();
            info!("Fetching from provider: {} (priority: {})", provider.name(), provider.priority());
            tokio::spawn(async move {
                let timeout = provider.timeout();
                match tokio::time::timeout(timeout, provider.fetch_latest(&filter)).await {
                    Ok(result) => result,
                    Err(_) => {
                        provider.health().record_failure();
                        Err(ProviderError::Timeout(timeout))
                    }
                }
            })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .zip(providers)
        .map(|(joined, provider)| match joined {
            Ok(Ok(articles)) => Ok(articles),
            Ok(Err(e)) => Err(ProviderFailure {
                provider: provider.name().to_string(),
                code: e.code().to_string(),
                message: e.to_string(),
            }),
            Err(e) => Err(ProviderFailure {
                provider: provider.name().to_string(),
                code: "TASK_FAILED".to_string(),
                message: format!("Unexpected error from provider {}: {}", provider.name(), e),
            }),
        })
        .collect()
}
