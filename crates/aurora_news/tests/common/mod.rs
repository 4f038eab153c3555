#![allow(dead_code)]

use async_trait::async_trait;
use aurora_core::{
    Article, ArticleStore, Facets, InsertOutcome, ProviderError, QueryFilter, RefreshFilter, Result,
};
use aurora_news::{NewsService, NewsServiceConfig, TruncatingSummarizer};
use aurora_providers::{NewsProvider, ProviderHealth, ProviderRegistry, Vocabulary, STANDARD_VOCABULARY};
use aurora_storage::InMemoryStorage;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub enum Behavior {
    Articles(Vec<Article>),
    /// Fails with an API error carrying this code
    Fail(&'static str),
    Hang,
    Panic,
}

pub struct FakeProvider {
    pub name: &'static str,
    pub priority: u32,
    pub behavior: Behavior,
    pub timeout: Duration,
    pub calls: AtomicUsize,
    pub health: ProviderHealth,
}

impl FakeProvider {
    pub fn new(name: &'static str, priority: u32, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            priority,
            behavior,
            timeout: Duration::from_millis(200),
            calls: AtomicUsize::new(0),
            health: ProviderHealth::new(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsProvider for FakeProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> u32 {
        self.priority
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
        self.timeout
    }

    fn max_articles(&self) -> u32 {
        100
    }

    async fn fetch(
        &self,
        _filter: &RefreshFilter,
        _page: u32,
        _page_size: u32,
    ) -> std::result::Result<Vec<Article>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Articles(articles) => {
                self.health.record_success();
                Ok(articles.clone())
            }
            Behavior::Fail(code) => {
                self.health.record_failure();
                Err(ProviderError::Api {
                    code: code.to_string(),
                    message: format!("{} rejected the request", self.name),
                })
            }
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            Behavior::Panic => panic!("provider exploded"),
        }
    }
}

pub fn article(title: &str, url: &str) -> Article {
    let mut article = Article::new(title, url, "fake");
    article.description = Some(format!("{} description", title));
    article
}

pub fn registry(providers: Vec<Arc<FakeProvider>>) -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::new(
        providers
            .into_iter()
            .map(|p| p as Arc<dyn NewsProvider>)
            .collect(),
    ))
}

/// Wraps the in-memory store and counts page reads.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryStorage,
    pub page_reads: AtomicUsize,
}

impl CountingStore {
    pub fn page_reads(&self) -> usize {
        self.page_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        self.inner.find_by_url(url).await
    }

    async fn insert(&self, article: &Article) -> Result<InsertOutcome> {
        self.inner.insert(article).await
    }

    async fn find_page(&self, filter: &QueryFilter) -> Result<(Vec<Article>, u64)> {
        self.page_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find_page(filter).await
    }

    async fn fetched_since(&self, since: DateTime<Utc>) -> Result<Vec<Article>> {
        self.inner.fetched_since(since).await
    }

    async fn facets(&self) -> Result<Facets> {
        self.inner.facets().await
    }

    async fn delete_fetched_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.inner.delete_fetched_before(cutoff).await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }
}

pub fn service(store: Arc<dyn ArticleStore>, providers: Vec<Arc<FakeProvider>>) -> NewsService {
    NewsService::new(
        store,
        registry(providers),
        Arc::new(TruncatingSummarizer::default()),
        NewsServiceConfig::default(),
    )
}
