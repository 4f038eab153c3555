use aurora_core::{Error, ProviderError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::ProviderSettings;
use crate::http;
use crate::providers::{GNewsProvider, NewsApiProvider, NewsProvider, Vocabulary};

/// Default wait before an unhealthy provider is tried again.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub name: String,
    pub enabled: bool,
    pub healthy: bool,
    pub priority: u32,
    pub last_successful_fetch: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub providers: Vec<ProviderStatus>,
    pub total: usize,
    pub enabled: usize,
    /// Enabled and healthy
    pub healthy: usize,
    pub disabled: usize,
    /// Enabled but unhealthy
    pub unhealthy: usize,
}

/// The set of configured providers, kept in priority order.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn NewsProvider>>,
    retry_interval: Duration,
}

impl ProviderRegistry {
    pub fn new(mut providers: Vec<Arc<dyn NewsProvider>>) -> Self {
        // stable: ties keep registration order
        providers.sort_by_key(|p| p.priority());
        Self {
            providers,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }

    /// NewsAPI and GNews over one shared HTTP client.
    pub fn from_settings(newsapi: ProviderSettings, gnews: ProviderSettings) -> std::result::Result<Self, ProviderError> {
        let client = http::build_client()?;
        Ok(Self::new(vec![
            Arc::new(NewsApiProvider::new(newsapi, client.clone())) as Arc<dyn NewsProvider>,
            Arc::new(GNewsProvider::new(gnews, client)) as Arc<dyn NewsProvider>,
        ]))
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn enabled_providers(&self) -> Vec<Arc<dyn NewsProvider>> {
        self.enabled_providers_at(Utc::now())
    }

    /// Enabled providers that are healthy, or unhealthy but due for another try.
    pub fn enabled_providers_at(&self, now: DateTime<Utc>) -> Vec<Arc<dyn NewsProvider>> {
        let retry_after =
            chrono::Duration::from_std(self.retry_interval).unwrap_or_else(|_| chrono::Duration::zero());
        self.providers
            .iter()
            .filter(|p| p.is_enabled())
            .filter(|p| p.health().is_healthy_at(now) || p.health().due_for_retry_at(now, retry_after))
            .cloned()
            .collect()
    }

    pub fn all_providers(&self) -> Vec<Arc<dyn NewsProvider>> {
        self.providers.clone()
    }

    pub fn by_name(&self, name: &str) -> Result<Arc<dyn NewsProvider>> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Provider not found: {}", name)))
    }

    pub fn has_healthy_providers(&self) -> bool {
        self.providers.iter().any(|p| p.is_enabled() && p.is_healthy())
    }

    pub fn health_summary(&self) -> HealthSummary {
        let providers: Vec<ProviderStatus> = self
            .providers
            .iter()
            .map(|p| ProviderStatus {
                name: p.name().to_string(),
                enabled: p.is_enabled(),
                healthy: p.is_healthy(),
                priority: p.priority(),
                last_successful_fetch: p.health().last_success_millis(),
            })
            .collect();

        let total = providers.len();
        let enabled = providers.iter().filter(|p| p.enabled).count();
        let healthy = providers.iter().filter(|p| p.enabled && p.healthy).count();
        HealthSummary {
            providers,
            total,
            enabled,
            healthy,
            disabled: total - enabled,
            unhealthy: enabled - healthy,
        }
    }

    fn union(&self, pick: impl Fn(&Vocabulary) -> &'static [&'static str]) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.is_enabled())
            .flat_map(|p| pick(p.vocabulary()).iter().map(|v| v.to_string()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn supported_countries(&self) -> Vec<String> {
        self.union(|v| v.countries)
    }

    pub fn supported_languages(&self) -> Vec<String> {
        self.union(|v| v.languages)
    }

    pub fn supported_categories(&self) -> Vec<String> {
        self.union(|v| v.categories)
    }

    pub fn log_status(&self) {
        info!("🦗 Provider status summary:");
        for provider in &self.providers {
            let status = match (provider.is_enabled(), provider.is_healthy()) {
                (true, true) => "ENABLED/HEALTHY",
                (true, false) => "ENABLED/UNHEALTHY",
                (false, _) => "DISABLED",
            };
            info!("  {} (priority {}) - {}", provider.name(), provider.priority(), status);
        }
    }
}
