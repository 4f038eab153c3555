use aurora_core::constants::{DEFAULT_RETENTION_DAYS, DEFAULT_PAGE_SIZE};
use aurora_core::{QueryFilter, RefreshFilter};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::service::NewsService;

const MIN_PERIOD: Duration = Duration::from_secs(1);

pub const POPULAR_CATEGORIES: &[&str] = &["technology", "business", "health", "sports"];

pub const TRENDING_KEYWORDS: &[&str] = &[
    "AI",
    "technology",
    "climate",
    "economy",
    "health",
    "politics",
    "innovation",
    "science",
    "energy",
    "finance",
];

pub const WARMUP_TARGETS: &[(&str, &str)] = &[
    ("us", "en"),
    ("gb", "en"),
    ("ca", "en"),
    ("au", "en"),
    ("de", "de"),
    ("fr", "fr"),
    ("it", "it"),
    ("es", "es"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSchedule {
    pub enabled: bool,
    pub every: Duration,
}

impl JobSchedule {
    pub fn every(every: Duration) -> Self {
        Self { enabled: true, every }
    }

    pub fn disabled(every: Duration) -> Self {
        Self { enabled: false, every }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub refresh: JobSchedule,
    pub cleanup: JobSchedule,
    pub health: JobSchedule,
    pub trending: JobSchedule,
    pub warmup: JobSchedule,
    pub retention_days: u32,
    pub popular_categories: Vec<String>,
    pub trending_keywords: Vec<String>,
    pub warmup_targets: Vec<(String, String)>,
    /// Pause between category refreshes
    pub category_pause: Duration,
    /// Pause between trending keyword refreshes
    pub keyword_pause: Duration,
    /// Pause between warmup queries
    pub warmup_pause: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh: JobSchedule::every(Duration::from_secs(30 * 60)),
            cleanup: JobSchedule::every(Duration::from_secs(24 * 60 * 60)),
            health: JobSchedule::every(Duration::from_secs(60 * 60)),
            trending: JobSchedule::disabled(Duration::from_secs(2 * 60 * 60)),
            warmup: JobSchedule::disabled(Duration::from_secs(4 * 60 * 60)),
            retention_days: DEFAULT_RETENTION_DAYS,
            popular_categories: POPULAR_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            trending_keywords: TRENDING_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            warmup_targets: WARMUP_TARGETS
                .iter()
                .map(|(c, l)| (c.to_string(), l.to_string()))
                .collect(),
            category_pause: Duration::from_secs(1),
            keyword_pause: Duration::from_secs(2),
            warmup_pause: Duration::from_millis(500),
        }
    }
}

/// Running scheduler jobs. Dropping the handle closes the cancel channel,
/// which also ends every job, but only [`SchedulerHandle::stop`] waits for them.
pub struct SchedulerHandle {
    cancel_tx: broadcast::Sender<()>,
    jobs: Vec<(&'static str, JoinHandle<()>)>,
}

impl SchedulerHandle {
    pub fn job_names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|(name, _)| *name).collect()
    }

    /// Cancel every job and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.cancel_tx.send(());
        for (name, join) in self.jobs {
            if let Err(e) = join.await {
                error!("Scheduler job {} ended abnormally: {}", name, e);
            }
        }
        info!("⏹️ Scheduler stopped");
    }
}

/// Spawn every enabled job. The first run of each job happens immediately.
pub fn start(service: Arc<NewsService>, config: SchedulerConfig) -> SchedulerHandle {
    let (cancel_tx, _) = broadcast::channel(1);
    let mut jobs = Vec::new();
    let config = Arc::new(config);

    if config.refresh.enabled {
        let (service, config) = (service.clone(), config.clone());
        jobs.push(spawn_job("refresh", config.refresh.every, cancel_tx.subscribe(), move || {
            refresh_popular(service.clone(), config.clone())
        }));
    }
    if config.cleanup.enabled {
        let (service, days) = (service.clone(), config.retention_days);
        jobs.push(spawn_job("cleanup", config.cleanup.every, cancel_tx.subscribe(), move || {
            cleanup_old(service.clone(), days)
        }));
    }
    if config.health.enabled {
        let service = service.clone();
        jobs.push(spawn_job("health", config.health.every, cancel_tx.subscribe(), move || {
            check_health(service.clone())
        }));
    }
    if config.trending.enabled {
        let (service, config) = (service.clone(), config.clone());
        jobs.push(spawn_job("trending", config.trending.every, cancel_tx.subscribe(), move || {
            refresh_trending(service.clone(), config.clone())
        }));
    }
    if config.warmup.enabled {
        let (service, config) = (service.clone(), config.clone());
        jobs.push(spawn_job("warmup", config.warmup.every, cancel_tx.subscribe(), move || {
            warm_cache(service.clone(), config.clone())
        }));
    }

    let names: Vec<_> = jobs.iter().map(|(name, _)| *name).collect();
    info!("⏰ Scheduler started with jobs: {:?}", names);
    SchedulerHandle { cancel_tx, jobs }
}

fn spawn_job<F, Fut>(
    name: &'static str,
    every: Duration,
    mut cancel_rx: broadcast::Receiver<()>,
    job: F,
) -> (&'static str, JoinHandle<()>)
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_rx.recv() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = cancel_rx.recv() => break,
                        _ = job() => {}
                    }
                }
            }
        }
        info!(job = name, "scheduler job shutdown requested");
    });
    (name, join)
}

async fn refresh_popular(service: Arc<NewsService>, config: Arc<SchedulerConfig>) {
    info!("Starting automatic news refresh");
    if let Err(e) = service.refresh(&RefreshFilter::defaults()).await {
        error!("Error during automatic news refresh: {}", e);
    }

    for category in &config.popular_categories {
        if let Err(e) = service.refresh(&RefreshFilter::defaults().with_category(category)).await {
            warn!("Failed to refresh news for category {}: {}", category, e);
        }
        tokio::time::sleep(config.category_pause).await;
    }
    info!("Automatic news refresh completed");
}

async fn cleanup_old(service: Arc<NewsService>, retention_days: u32) {
    if let Err(e) = service.cleanup(Some(retention_days)).await {
        error!("Error during news cleanup: {}", e);
    }
}

async fn check_health(service: Arc<NewsService>) {
    let registry = service.registry();
    registry.log_status();
    if !registry.has_healthy_providers() {
        warn!("No healthy news providers available!");
    }
    let summary = registry.health_summary();
    info!(
        total = summary.total,
        enabled = summary.enabled,
        healthy = summary.healthy,
        disabled = summary.disabled,
        unhealthy = summary.unhealthy,
        "Provider statistics"
    );
}

async fn refresh_trending(service: Arc<NewsService>, config: Arc<SchedulerConfig>) {
    info!("Refreshing trending news topics");
    for keyword in &config.trending_keywords {
        let filter = RefreshFilter::new(None, Some("en".to_string()), None, Some(keyword.clone()));
        if let Err(e) = service.refresh(&filter).await {
            warn!("Failed to refresh trending news for keyword {}: {}", keyword, e);
        }
        tokio::time::sleep(config.keyword_pause).await;
    }
    info!("Trending news refresh completed");
}

async fn warm_cache(service: Arc<NewsService>, config: Arc<SchedulerConfig>) {
    info!("Starting cache warmup");
    for (country, language) in &config.warmup_targets {
        let filter = QueryFilter::new(
            Some(country.clone()),
            Some(language.clone()),
            Some("general".to_string()),
            None,
            0,
            DEFAULT_PAGE_SIZE as i64,
        );
        if let Err(e) = service.news(&filter).await {
            warn!("Failed to warm cache for {}/{}: {}", country, language, e);
        }
        tokio::time::sleep(config.warmup_pause).await;
    }
    info!("Cache warmup completed");
}
