use aurora_core::constants::DEFAULT_PAGE_SIZE;
use aurora_core::{Article, NewsPage, QueryFilter, RefreshFilter};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::state::{AppState, SERVICE_NAME};

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    pub country: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshParams {
    pub country: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub keyword: Option<String>,
}

fn ack(message: &str) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": message,
        "timestamp": Utc::now(),
    }))
}

pub async fn get_news(
    State(state): State<Arc<AppState>>,
    params: Result<Query<NewsParams>, QueryRejection>,
) -> ApiResult<NewsPage> {
    let Query(params) = params?;
    info!("GET /api/news - {:?}", params);

    let filter = QueryFilter::new(
        params.country,
        params.language,
        params.category,
        params.keyword,
        params.page.unwrap_or(0),
        params.size.unwrap_or(DEFAULT_PAGE_SIZE as i64),
    );
    let page = state.news.news(&filter).await?;
    info!("News fetched successfully - {} articles returned", page.articles.len());
    Ok(Json(page))
}

pub async fn get_today(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Article>> {
    info!("GET /api/news/today");
    Ok(Json(state.news.today().await?))
}

pub async fn search_news(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<NewsPage> {
    let Query(params) = params?;
    info!("GET /api/news/search - {:?}", params);

    let keyword = params.keyword.unwrap_or_default();
    let page = state
        .news
        .search(
            &keyword,
            params.page.unwrap_or(0),
            params.size.unwrap_or(DEFAULT_PAGE_SIZE as i64),
        )
        .await?;
    info!("Search completed - {} articles found for keyword: {}", page.total_elements, keyword);
    Ok(Json(page))
}

/// Kick off a refresh in the background and acknowledge straight away.
pub async fn refresh_news(
    State(state): State<Arc<AppState>>,
    params: Result<Query<RefreshParams>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = params?;
    let filter = RefreshFilter::new(params.country, params.language, params.category, params.keyword);
    info!("POST /api/news/refresh - {}", filter);

    let news = state.news.clone();
    tokio::spawn(async move {
        match news.refresh(&filter).await {
            Ok(outcome) => info!(
                saved = outcome.report.saved,
                duplicates = outcome.report.duplicates,
                errors = outcome.report.errors,
                "Background refresh finished for {}",
                filter
            ),
            Err(e) => error!("Background refresh failed for {}: {}", filter, e),
        }
    });

    Ok(ack("News refresh initiated successfully"))
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    info!("POST /api/news/cache/clear");
    state.news.clear_cache();
    Ok(ack("Cache cleared successfully"))
}

pub async fn get_providers(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    info!("GET /api/providers");
    let active = state.news.active_providers();
    let all = state.news.provider_descriptions();
    info!("Providers loaded successfully - {} active, {} total", active.len(), all.len());

    Ok(Json(json!({
        "active": active,
        "all": all,
        "status": "success",
        "timestamp": Utc::now(),
    })))
}

pub async fn get_active_providers(State(state): State<Arc<AppState>>) -> ApiResult<Vec<String>> {
    info!("GET /api/providers/active");
    Ok(Json(state.news.active_providers()))
}

pub async fn get_providers_status(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    info!("GET /api/providers/status");
    let all = state.news.provider_descriptions();
    let active = state.news.active_providers();

    Ok(Json(json!({
        "providers": all,
        "activeCount": active.len(),
        "totalCount": all.len(),
        "health": state.news.health_summary(),
        "timestamp": Utc::now(),
    })))
}

pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    debug!("GET /api/health");
    Ok(Json(json!({
        "status": "UP",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
        "providers": state.news.active_providers().len(),
    })))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    info!("GET /api/metrics");
    let snapshot = state.news.metrics();
    let mut body = serde_json::to_value(&snapshot).map_err(aurora_core::Error::from)?;
    if let Value::Object(map) = &mut body {
        map.insert("timestamp".to_string(), json!(Utc::now()));
    }
    Ok(Json(body))
}
