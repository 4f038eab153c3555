use async_trait::async_trait;
use aurora_core::{Article, ArticleStore, Facets, InsertOutcome, QueryFilter, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    articles: BTreeMap<i64, Article>,
    by_url: HashMap<String, i64>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, article: &Article) -> InsertOutcome {
        if self.by_url.contains_key(&article.url) {
            return InsertOutcome::Duplicate;
        }
        self.next_id += 1;
        let id = self.next_id;
        let mut stored = article.clone();
        stored.id = Some(id);
        self.by_url.insert(stored.url.clone(), id);
        self.articles.insert(id, stored);
        InsertOutcome::Inserted(id)
    }

    fn find_by_url(&self, url: &str) -> Option<Article> {
        self.by_url
            .get(url)
            .and_then(|id| self.articles.get(id))
            .cloned()
    }

    fn sorted_matching(&self, filter: &QueryFilter) -> Vec<&Article> {
        let mut matching: Vec<&Article> = self
            .articles
            .values()
            .filter(|a| filter.matches(a))
            .collect();
        matching.sort_by(|a, b| Article::newest_first(a, b));
        matching
    }

    fn facets(&self) -> Facets {
        let mut countries = BTreeSet::new();
        let mut languages = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut sources = BTreeSet::new();
        for article in self.articles.values() {
            countries.extend(article.country.clone());
            languages.extend(article.language.clone());
            categories.extend(article.category.clone());
            sources.insert(article.source.clone());
        }
        Facets {
            countries: countries.into_iter().collect(),
            languages: languages.into_iter().collect(),
            categories: categories.into_iter().collect(),
            sources: sources.into_iter().collect(),
        }
    }

    fn delete_fetched_before(&mut self, cutoff: DateTime<Utc>) -> u64 {
        let expired: Vec<i64> = self
            .articles
            .iter()
            .filter(|(_, a)| a.fetched_at < cutoff)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            if let Some(article) = self.articles.remove(id) {
                self.by_url.remove(&article.url);
            }
        }
        expired.len() as u64
    }
}

/// Process-local store. Ids are assigned from a counter and never reused.
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new() -> Result<Self> where Self: Sized {
        Ok(InMemoryStorage::new())
    }
}

#[async_trait]
impl ArticleStore for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        Ok(self.store.read().await.find_by_url(url))
    }

    async fn insert(&self, article: &Article) -> Result<InsertOutcome> {
        Ok(self.store.write().await.insert(article))
    }

    async fn find_page(&self, filter: &QueryFilter) -> Result<(Vec<Article>, u64)> {
        let store = self.store.read().await;
        let matching = store.sorted_matching(filter);
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.size as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn fetched_since(&self, since: DateTime<Utc>) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        let mut articles: Vec<Article> = store
            .articles
            .values()
            .filter(|a| a.fetched_at >= since)
            .cloned()
            .collect();
        articles.sort_by(Article::newest_first);
        Ok(articles)
    }

    async fn facets(&self) -> Result<Facets> {
        Ok(self.store.read().await.facets())
    }

    async fn delete_fetched_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        Ok(self.store.write().await.delete_fetched_before(cutoff))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.store.read().await.articles.len() as u64)
    }
}
