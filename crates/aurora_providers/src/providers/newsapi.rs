use async_trait::async_trait;
use aurora_core::constants::{MAX_PAGE_SIZE, PROVIDER_NEWSAPI};
use aurora_core::{Article, ProviderError, RefreshFilter};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::{decode_items, normalize, record_outcome, RawItem, SourceRef, Vocabulary, NewsProvider, STANDARD_VOCABULARY};
use crate::config::ProviderSettings;
use crate::health::ProviderHealth;
use crate::http;

const REMOVED_MARKER: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    code: Option<String>,
    message: Option<String>,
    articles: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    source: Option<SourceRef>,
}

impl Item {
    fn is_removed(&self) -> bool {
        let removed = |v: &Option<String>| v.as_deref().map_or(false, |s| s.contains(REMOVED_MARKER));
        removed(&self.title) || removed(&self.url)
    }
}

impl From<Item> for RawItem {
    fn from(item: Item) -> Self {
        RawItem {
            title: item.title,
            url: item.url,
            description: item.description,
            image_url: item.url_to_image,
            published_at: item.published_at,
            source: item.source,
        }
    }
}

/// NewsAPI folds `world` and `nation` into `general`.
pub fn map_category(category: &str) -> String {
    match category.to_lowercase().as_str() {
        "world" | "nation" => "general".to_string(),
        other => other.to_string(),
    }
}

/// Adapter for newsapi.org `top-headlines`.
pub struct NewsApiProvider {
    settings: ProviderSettings,
    client: Client,
    health: ProviderHealth,
}

impl NewsApiProvider {
    pub const PRIORITY: u32 = 1;

    pub fn new(settings: ProviderSettings, client: Client) -> Self {
        Self {
            settings,
            client,
            health: ProviderHealth::new(),
        }
    }

    pub fn build_url(&self, filter: &RefreshFilter, page: u32, page_size: u32) -> Result<Url, ProviderError> {
        let vocabulary = self.vocabulary();
        let mut url = http::endpoint(&self.settings.base_url, "top-headlines")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("apiKey", self.settings.usable_api_key().unwrap_or_default())
                .append_pair("pageSize", &page_size.min(MAX_PAGE_SIZE).to_string())
                .append_pair("page", &page.to_string());
            if let Some(country) = vocabulary.country(filter.country.as_deref()) {
                query.append_pair("country", &country);
            }
            if let Some(language) = vocabulary.language(filter.language.as_deref()) {
                query.append_pair("language", &language);
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

    /// Envelope-level error, if the body is one.
    fn api_error(envelope: &Envelope) -> Option<ProviderError> {
        if envelope.status.as_deref() == Some("ok") {
            return None;
        }
        Some(ProviderError::Api {
            code: envelope.code.clone().unwrap_or_else(|| "API_ERROR".to_string()),
            message: envelope
                .message
                .clone()
                .unwrap_or_else(|| format!("unexpected status {:?}", envelope.status)),
        })
    }

    pub fn parse_response(&self, body: &str, filter: &RefreshFilter) -> Result<Vec<Article>, ProviderError> {
        let envelope: Envelope = serde_json::from_str(body)?;
        if let Some(e) = Self::api_error(&envelope) {
            return Err(e);
        }

        let now = Utc::now();
        let items = decode_items::<Item, _>(PROVIDER_NEWSAPI, envelope.articles.unwrap_or_default(), |item| {
            !item.is_removed()
        });
        Ok(items
            .into_iter()
            .filter_map(|item| normalize(PROVIDER_NEWSAPI, filter, item.into(), now))
            .collect())
    }

    async fn request(&self, filter: &RefreshFilter, page: u32, page_size: u32) -> Result<Vec<Article>, ProviderError> {
        let url = self.build_url(filter, page, page_size)?;
        info!("📡 Fetching news from {}: {}", PROVIDER_NEWSAPI, http::redacted(&url));

        let body = match http::get_text(&self.client, url, self.settings.timeout).await {
            Ok(body) => body,
            // NewsAPI reports bad keys and rate limits with a JSON envelope on a 4xx
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
impl NewsProvider for NewsApiProvider {
    fn name(&self) -> &str {
        PROVIDER_NEWSAPI
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
            warn!("Provider {} is disabled", PROVIDER_NEWSAPI);
            return Ok(Vec::new());
        }
        let outcome = self.request(filter, page, page_size).await;
        record_outcome(PROVIDER_NEWSAPI, &self.health, &outcome);
        outcome
    }
}
