use aurora_core::constants::{DEFAULT_MAX_ARTICLES, DEFAULT_PROVIDER_TIMEOUT_SECS};
use std::time::Duration;

pub const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
pub const GNEWS_BASE_URL: &str = "https://gnews.io/api/v4";

/// Connection settings for one provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub max_articles: u32,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            max_articles: DEFAULT_MAX_ARTICLES,
        }
    }

    pub fn newsapi() -> Self {
        Self::new(NEWSAPI_BASE_URL)
    }

    pub fn gnews() -> Self {
        Self::new(GNEWS_BASE_URL)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured key, unless it is missing, blank or a template
    /// placeholder such as `your_newsapi_key_here`.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !is_placeholder_key(key))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.usable_api_key().is_some()
    }
}

pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("your_") && key.ends_with("_here")
}
