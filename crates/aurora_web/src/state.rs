use aurora_news::NewsService;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "Aurora News Service";

pub struct AppState {
    pub news: Arc<NewsService>,
}

impl AppState {
    pub fn new(news: Arc<NewsService>) -> Self {
        Self { news }
    }
}
