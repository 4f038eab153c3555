use async_trait::async_trait;
use aurora_core::constants::{SUPPORTED_CATEGORIES, SUPPORTED_COUNTRIES, SUPPORTED_LANGUAGES};
use aurora_core::{Article, ProviderError, RefreshFilter};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::health::ProviderHealth;

pub mod gnews;
pub mod newsapi;

pub use gnews::GNewsProvider;
pub use newsapi::NewsApiProvider;

/// A source of news articles.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Display name, also used as the fallback article source
    fn name(&self) -> &str;

    /// Lower values are preferred when merging results
    fn priority(&self) -> u32;

    /// Configured on and holding a usable API key
    fn is_enabled(&self) -> bool;

    fn vocabulary(&self) -> &Vocabulary;

    fn health(&self) -> &ProviderHealth;

    fn timeout(&self) -> Duration;

    fn max_articles(&self) -> u32;

    /// Fetch one page of articles. A disabled provider returns an empty list
    /// without touching the network.
    async fn fetch(
        &self,
        filter: &RefreshFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Article>, ProviderError>;

    /// First page at the provider's configured article cap
    async fn fetch_latest(&self, filter: &RefreshFilter) -> Result<Vec<Article>, ProviderError> {
        self.fetch(filter, 1, self.max_articles()).await
    }

    fn is_healthy(&self) -> bool {
        self.health().is_healthy()
    }
}

/// Country, language and category codes a provider accepts.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub countries: &'static [&'static str],
    pub languages: &'static [&'static str],
    pub categories: &'static [&'static str],
}

pub const STANDARD_VOCABULARY: Vocabulary = Vocabulary {
    countries: SUPPORTED_COUNTRIES,
    languages: SUPPORTED_LANGUAGES,
    categories: SUPPORTED_CATEGORIES,
};

fn supported(values: &[&str], candidate: Option<&str>) -> Option<String> {
    let value = candidate?.trim().to_lowercase();
    values.contains(&value.as_str()).then_some(value)
}

impl Vocabulary {
    pub fn country(&self, value: Option<&str>) -> Option<String> {
        supported(self.countries, value)
    }

    pub fn language(&self, value: Option<&str>) -> Option<String> {
        supported(self.languages, value)
    }

    pub fn category(&self, value: Option<&str>) -> Option<String> {
        supported(self.categories, value)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourceRef {
    pub name: Option<String>,
}

/// Provider-neutral view of one response item.
pub(crate) struct RawItem {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<SourceRef>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Build an [`Article`] from a raw item, or `None` when the item lacks a
/// title or URL. Classification comes from the filter the fetch ran with.
pub(crate) fn normalize(
    provider: &str,
    filter: &RefreshFilter,
    item: RawItem,
    now: DateTime<Utc>,
) -> Option<Article> {
    let title = non_blank(item.title)?;
    let url = non_blank(item.url)?;
    let source = item
        .source
        .and_then(|s| non_blank(s.name))
        .unwrap_or_else(|| provider.to_string());

    let mut article = Article::new(title, url, source);
    article.description = non_blank(item.description);
    article.image_url = non_blank(item.image_url);
    article.published_at = Some(parse_published_at(item.published_at.as_deref(), now));
    article.country = filter.country.clone();
    article.language = filter.language.clone();
    article.category = filter.category.clone();
    article.fetched_at = now;
    Some(article)
}

/// ISO-8601 publish time. Offsets are honored; a bare local timestamp is
/// taken as UTC. Missing or unreadable values fall back to `now`.
pub fn parse_published_at(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return now;
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Utc.from_utc_datetime(&naive);
    }
    debug!("Could not parse published date: {}", raw);
    now
}

/// Decode each item on its own so one malformed entry does not sink the batch.
pub(crate) fn decode_items<T, F>(provider: &str, items: Vec<serde_json::Value>, mut keep: F) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
    F: FnMut(&T) -> bool,
{
    items
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("Skipping malformed {} article: {}", provider, e);
                None
            }
        })
        .filter(|item| keep(item))
        .collect()
}

/// Update health bookkeeping from a fetch outcome and log it.
pub(crate) fn record_outcome(
    provider: &str,
    health: &ProviderHealth,
    outcome: &Result<Vec<Article>, ProviderError>,
) {
    match outcome {
        Ok(articles) => {
            health.record_success();
            info!("✨ Successfully fetched {} articles from {}", articles.len(), provider);
        }
        Err(e) => {
            health.record_failure();
            error!(provider, code = e.code(), "Error fetching news from {}: {}", provider, e);
        }
    }
}
