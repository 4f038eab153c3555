use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/news", get(handlers::get_news))
        .route("/api/news/today", get(handlers::get_today))
        .route("/api/news/search", get(handlers::search_news))
        .route("/api/news/refresh", post(handlers::refresh_news))
        .route("/api/news/cache/clear", post(handlers::clear_cache))
        .route("/api/providers", get(handlers::get_providers))
        .route("/api/providers/active", get(handlers::get_active_providers))
        .route("/api/providers/status", get(handlers::get_providers_status))
        .route("/api/health", get(handlers::health))
        .route("/api/metrics", get(handlers::metrics))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::AppState;
    pub use aurora_core::{Article, Error, Result};
}
