pub mod config;
pub mod health;
pub mod http;
pub mod providers;
pub mod registry;

pub use config::ProviderSettings;
pub use health::ProviderHealth;
pub use providers::{GNewsProvider, NewsApiProvider, NewsProvider, Vocabulary, STANDARD_VOCABULARY};
pub use registry::{HealthSummary, ProviderRegistry, ProviderStatus};

pub mod prelude {
    pub use super::providers::NewsProvider;
    pub use super::registry::ProviderRegistry;
    pub use aurora_core::{Article, ProviderError, RefreshFilter};
}
