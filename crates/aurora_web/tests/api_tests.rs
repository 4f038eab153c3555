use async_trait::async_trait;
use aurora_core::{Article, ArticleStore, ProviderError, RefreshFilter};
use aurora_news::{NewsService, NewsServiceConfig, TruncatingSummarizer};
use aurora_providers::{NewsProvider, ProviderHealth, ProviderRegistry, Vocabulary, STANDARD_VOCABULARY};
use aurora_storage::InMemoryStorage;
use aurora_web::{create_app, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct StaticProvider {
    articles: Vec<Article>,
    health: ProviderHealth,
}

#[async_trait]
impl NewsProvider for StaticProvider {
    fn name(&self) -> &str {
        "Static"
    }

    fn priority(&self) -> u32 {
        1
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn vocabulary(&self) -> &Vocabulary {
        &STANDARD_VOCABULARY
    }

    fn health(&self) -> &ProviderHealth {
        &self.health
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn max_articles(&self) -> u32 {
        100
    }

    async fn fetch(
        &self,
        _filter: &RefreshFilter,
        _page: u32,
        _page_size: u32,
    ) -> Result<Vec<Article>, ProviderError> {
        self.health.record_success();
        Ok(self.articles.clone())
    }
}

async fn setup(provider_articles: Vec<Article>) -> (Router, Arc<InMemoryStorage>) {
    let (app, store, _) = setup_with_provider(provider_articles).await;
    (app, store)
}

async fn setup_with_provider(
    provider_articles: Vec<Article>,
) -> (Router, Arc<InMemoryStorage>, Arc<StaticProvider>) {
    let store = Arc::new(InMemoryStorage::new());
    let provider = Arc::new(StaticProvider {
        articles: provider_articles,
        health: ProviderHealth::new(),
    });
    let news = NewsService::new(
        store.clone(),
        Arc::new(ProviderRegistry::new(vec![provider.clone() as Arc<dyn NewsProvider>])),
        Arc::new(TruncatingSummarizer::default()),
        NewsServiceConfig::default(),
    );
    let app = create_app(AppState::new(Arc::new(news))).await;
    (app, store, provider)
}

async fn seed(store: &InMemoryStorage, count: usize) {
    for i in 0..count {
        let mut article = Article::new(format!("Rust news {}", i), format!("https://n.example/{}", i), "wire");
        article.country = Some("us".to_string());
        article.published_at = Some(Utc::now() - ChronoDuration::minutes(i as i64));
        store.insert(&article).await.unwrap();
    }
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_news_is_paginated() {
    let (app, store) = setup(Vec::new()).await;
    seed(&store, 45).await;

    let (status, body) = send(&app, "GET", "/api/news?page=2&size=20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 45);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["hasNext"], false);
    assert_eq!(body["hasPrevious"], true);
    assert_eq!(body["articles"].as_array().unwrap().len(), 5);
    assert_eq!(body["availableCountries"][0], "us");
}

#[tokio::test]
async fn test_search_with_short_keyword_is_bad_request() {
    let (app, _) = setup(Vec::new()).await;

    let (status, body) = send(&app, "GET", "/api/news/search?keyword=a").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_malformed_page_is_bad_request() {
    let (app, _) = setup(Vec::new()).await;

    let (status, body) = send(&app, "GET", "/api/news?page=first").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_search_matches_title() {
    let (app, store) = setup(Vec::new()).await;
    seed(&store, 3).await;
    store
        .insert(&Article::new("Market update", "https://n.example/market", "wire"))
        .await
        .unwrap();

    let (status, body) = send(&app, "GET", "/api/news/search?keyword=market").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 1);
    assert_eq!(body["articles"][0]["title"], "Market update");
}

#[tokio::test]
async fn test_refresh_acknowledges_and_runs_in_background() {
    let mut article = Article::new("Fresh story", "https://n.example/fresh", "Static");
    article.description = Some("Something happened".to_string());
    let (app, store) = setup(vec![article]).await;

    let (status, body) = send(&app, "POST", "/api/news/refresh?category=technology").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let mut stored = 0;
    for _ in 0..50 {
        stored = store.count().await.unwrap();
        if stored > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(stored, 1);

    let saved = store.find_by_url("https://n.example/fresh").await.unwrap().unwrap();
    assert_eq!(saved.category.as_deref(), Some("technology"));
}

#[tokio::test]
async fn test_cache_clear_acknowledges() {
    let (app, _) = setup(Vec::new()).await;
    send(&app, "GET", "/api/news").await;

    let (status, body) = send(&app, "POST", "/api/news/cache/clear").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cache cleared successfully");

    let (_, metrics) = send(&app, "GET", "/api/metrics").await;
    assert_eq!(metrics["cacheEntries"], 0);
}

#[tokio::test]
async fn test_health_reports_up() {
    let (app, _) = setup(Vec::new()).await;

    let (status, body) = send(&app, "GET", "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["service"], "Aurora News Service");
    assert_eq!(body["providers"], 1);
}

#[tokio::test]
async fn test_provider_endpoints() {
    let (app, _, provider) = setup_with_provider(Vec::new()).await;

    // offered for fetching, but not healthy until a fetch succeeds
    let (_, providers) = send(&app, "GET", "/api/providers").await;
    assert_eq!(providers["active"][0], "Static");
    assert_eq!(providers["all"][0], "Static (enabled (unhealthy))");

    provider.fetch_latest(&RefreshFilter::defaults()).await.unwrap();

    let (_, providers) = send(&app, "GET", "/api/providers").await;
    assert_eq!(providers["all"][0], "Static (enabled)");

    let (_, active) = send(&app, "GET", "/api/providers/active").await;
    assert_eq!(active, serde_json::json!(["Static"]));

    let (_, status) = send(&app, "GET", "/api/providers/status").await;
    assert_eq!(status["activeCount"], 1);
    assert_eq!(status["totalCount"], 1);
    assert_eq!(status["health"]["healthy"], 1);
    assert!(status["health"]["providers"][0]["lastSuccessfulFetch"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_metrics_snapshot() {
    let (app, _) = setup(Vec::new()).await;

    let (status, body) = send(&app, "GET", "/api/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activeProviders"], 1);
    assert_eq!(body["totalProviders"], 1);
    assert_eq!(body["refreshesCompleted"], 0);
    assert!(body["timestamp"].is_string());
}
