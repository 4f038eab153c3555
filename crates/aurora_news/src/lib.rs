pub mod aggregator;
pub mod cache;
pub mod ingest;
pub mod query;
pub mod scheduler;
pub mod service;
pub mod summarizer;

pub use aggregator::{Aggregator, ProviderFailure, RefreshOutcome};
pub use ingest::{IngestReport, IngestionPipeline};
pub use query::{CleanupReport, QueryService};
pub use scheduler::{JobSchedule, SchedulerConfig, SchedulerHandle};
pub use service::{MetricsSnapshot, NewsService, NewsServiceConfig};
pub use summarizer::TruncatingSummarizer;

pub mod prelude {
    pub use super::service::{NewsService, NewsServiceConfig};
    pub use aurora_core::{Article, NewsPage, QueryFilter, RefreshFilter, Result};
}
