use async_trait::async_trait;
use aurora_core::constants::{MAX_PAGE_SIZE, PROVIDER_GNEWS};
use aurora_core::{Article, ProviderError, RefreshFilter};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::{decode_items, normalize, record_outcome, NewsProvider, RawItem, SourceRef, Vocabulary, STANDARD_VOCABULARY};
use crate::config::ProviderSettings;
use crate::health::ProviderHealth;
use crate::http;

#[derive(Debug, Deserialize)]
struct Envelope {
    error: Option<Value>,
    errors: Option<Value>,
    articles: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    image: Option<String>,
    published_at: Option<String>,
    source: Option<SourceRef>,
}

impl From<Item> for RawItem {
    fn from(item: Item) -> Self {
        RawItem {
            title: item.title,
            url: item.url,
            description: item.description,
            image_url: item.image,
            published_at: item.published_at,
            source: item.source,
        }
    }
}

/// GNews has no `general` or `nation`; anything it does not know becomes `world`.
pub fn map_category(category: &str) -> String {
    match category.to_lowercase().as_str() {
        c @ ("business" | "entertainment" | "health" | "science" | "sports" | "technology") => c.to_string(),
        _ => "world".to_string(),
    }
}

/// GNews reports errors as a string, a list of strings or a map of field to message.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(describe).collect::<Vec<_>>().join("; "),
        Value::Object(map) => map.values().map(describe).collect::<Vec<_>>().join("; "),
        other => other.to_string(),
    }
}

/// Adapter for gnews.io `top-headlines`.
pub struct GNewsProvider {
    settings: ProviderSettings,
    client: Client,
    health: ProviderHealth,
}

impl GNewsProvider {
    pub const PRIORITY: u32 = 2;

    pub fn new(settings: ProviderSettings, client: Client) -> Self {
        Self {
            settings,
            client,
            health: ProviderHealth::new(),
        }
    }

    /// GNews has no paging parameter; `page` is accepted for the common contract only.
    pub fn build_url(&self, filter: &RefreshFilter, _page: u32, page_size: u32) -> Result<Url, ProviderError> {
        let vocabulary = self.vocabulary();
        let mut url = http::endpoint(&self.settings.base_url, "top-headlines")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("apikey", self.settings.usable_api_key().unwrap_or_default())
                .append_pair("max", &page_size.min(MAX_PAGE_SIZE).to_string());
            if let Some(country) = vocabulary.country(filter.country.as_deref()) {
                query.append_pair("country", &country);
            }
            if let Some(language) = vocabulary.language(filter.language.as_deref()) {
                query.append_pair("lang", &language);
            }
            if let Some(category) = vocabulary.category(filter.category.as_deref()) {
                query.append_pair("category", &map_category(&category));
            }
            if let Some(keyword) = filter.search_keyword() {
                query.append_pair("q", keyword);
            }
        }
        Ok(url)
    }

    fn api_error(envelope: &Envelope) -> Option<ProviderError> {
        envelope
            .error
            .as_ref()
            .or(envelope.errors.as_ref())
            .filter(|v| !v.is_null())
            .map(|v| ProviderError::Api {
                code: "API_ERROR".to_string(),
                message: describe(v),
            })
    }

    pub fn parse_response(&self, body: &str, filter: &RefreshFilter) -> Result<Vec<Article>, ProviderError> {
        let envelope: Envelope = serde_json::from_str(body)?;
        if let Some(e) = Self::api_error(&envelope) {
            return Err(e);
        }

        let now = Utc::now();
        let items = decode_items::<Item, _>(PROVIDER_GNEWS, envelope.articles.unwrap_or_default(), |_| true);
        Ok(items
            .into_iter()
            .filter_map(|item| normalize(PROVIDER_GNEWS, filter, item.into(), now))
            .collect())
    }

    async fn request(&self, filter: &RefreshFilter, page: u32, page_size: u32) -> Result<Vec<Article>, ProviderError> {
        let url = self.build_url(filter, page, page_size)?;
        info!("📡 Fetching news from {}: {}", PROVIDER_GNEWS, http::redacted(&url));

        let body = match http::get_text(&self.client, url, self.settings.timeout).await {
            Ok(body) => body,
            Err(ProviderError::Http { status, body }) => {
                return Err(serde_json::from_str::<Envelope>(&body)
                    .ok()
                    .and_then(|envelope| Self::api_error(&envelope))
                    .unwrap_or(ProviderError::Http { status, body }));
            }
            Err(e) => return Err(e),
        };
        self.parse_response(&body, filter)
    }
}

#[async_trait]
impl NewsProvider for GNewsProvider {
    fn name(&self) -> &str {
        PROVIDER_GNEWS
    }

    fn priority(&self) -> u32 {
        Self::PRIORITY
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_enabled()
    }

    fn vocabulary(&self) -> &Vocabulary {
        &STANDARD_VOCABULARY
    }

    fn health(&self) -> &ProviderHealth {
        &self.health
    }

    fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    fn max_articles(&self) -> u32 {
        self.settings.max_articles
    }

    async fn fetch(&self, filter: &RefreshFilter, page: u32, page_size: u32) -> Result<Vec<Article>, ProviderError> {
        if !self.is_enabled() {
            warn!("Provider {} is disabled", PROVIDER_GNEWS);
            return Ok(Vec::new());
        }
        let outcome = self.request(filter, page, page_size).await;
        record_outcome(PROVIDER_GNEWS, &self.health, &outcome);
        outcome
    }
}
