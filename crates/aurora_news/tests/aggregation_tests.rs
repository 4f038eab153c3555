mod common;

use async_trait::async_trait;
use aurora_core::{
    Article, ArticleStore, Error, Facets, InsertOutcome, QueryFilter, RefreshFilter, Result,
};
use aurora_news::aggregator::NO_PROVIDERS;
use aurora_storage::InMemoryStorage;
use chrono::{DateTime, Utc};
use common::{article, service, Behavior, FakeProvider};
use std::sync::Arc;

#[tokio::test]
async fn test_failing_providers_do_not_fail_the_refresh() {
    let store = Arc::new(InMemoryStorage::new());
    let good = FakeProvider::new(
        "Good",
        1,
        Behavior::Articles(vec![
            article("First", "https://good.example/1"),
            article("Second", "https://good.example/2"),
        ]),
    );
    let rejecting = FakeProvider::new("Rejecting", 2, Behavior::Fail("rateLimited"));
    let panicking = FakeProvider::new("Panicking", 3, Behavior::Panic);
    let hanging = FakeProvider::new("Hanging", 4, Behavior::Hang);
    let service = service(
        store.clone(),
        vec![hanging.clone(), panicking, rejecting, good],
    );

    let outcome = service.refresh(&RefreshFilter::defaults()).await.unwrap();

    assert_eq!(outcome.fetched, 2);
    assert_eq!(outcome.providers_total, 4);
    assert_eq!(outcome.providers_contributed, 1);
    assert_eq!(outcome.report.saved, 2);
    assert_eq!(outcome.reason, None);

    let codes: Vec<_> = outcome.failures.iter().map(|f| (f.provider.as_str(), f.code.as_str())).collect();
    assert_eq!(
        codes,
        vec![("Rejecting", "rateLimited"), ("Panicking", "TASK_FAILED"), ("Hanging", "TIMEOUT")]
    );
    assert!(!hanging.health.is_healthy());
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_merge_follows_priority_so_first_write_wins() {
    let store = Arc::new(InMemoryStorage::new());
    let secondary = FakeProvider::new(
        "Secondary",
        2,
        Behavior::Articles(vec![article("Secondary headline", "https://shared.example/story")]),
    );
    let primary = FakeProvider::new(
        "Primary",
        1,
        Behavior::Articles(vec![article("Primary headline", "https://shared.example/story")]),
    );
    let service = service(store.clone(), vec![secondary, primary]);

    let outcome = service.refresh(&RefreshFilter::defaults()).await.unwrap();
    assert_eq!(outcome.report.saved, 1);
    assert_eq!(outcome.report.duplicates, 1);

    let stored = store.find_by_url("https://shared.example/story").await.unwrap().unwrap();
    assert_eq!(stored.title, "Primary headline");
}

#[tokio::test]
async fn test_no_providers_is_a_degraded_success() {
    let store = Arc::new(InMemoryStorage::new());
    let service = service(store, vec![]);

    let outcome = service.refresh(&RefreshFilter::defaults()).await.unwrap();
    assert_eq!(outcome.fetched, 0);
    assert_eq!(outcome.reason.as_deref(), Some(NO_PROVIDERS));
}

#[tokio::test]
async fn test_second_refresh_only_finds_duplicates() {
    let store = Arc::new(InMemoryStorage::new());
    let provider = FakeProvider::new(
        "Steady",
        1,
        Behavior::Articles(vec![
            article("One", "https://steady.example/1"),
            article("Two", "https://steady.example/2"),
        ]),
    );
    let service = service(store.clone(), vec![provider.clone()]);

    let first = service.refresh(&RefreshFilter::defaults()).await.unwrap();
    let second = service.refresh(&RefreshFilter::defaults()).await.unwrap();

    assert_eq!(first.report.saved, 2);
    assert_eq!(second.report.saved, 0);
    assert_eq!(second.report.duplicates, 2);
    assert_eq!(provider.calls(), 2);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_invalid_articles_are_counted_not_stored() {
    let store = Arc::new(InMemoryStorage::new());
    let mut long_description = article("Long", "https://bad.example/2");
    long_description.description = Some("x".repeat(2001));
    let provider = FakeProvider::new(
        "Mixed",
        1,
        Behavior::Articles(vec![
            article(&"t".repeat(501), "https://bad.example/1"),
            long_description,
            article("Fine", "https://ok.example/1"),
        ]),
    );
    let service = service(store.clone(), vec![provider]);

    let outcome = service.refresh(&RefreshFilter::defaults()).await.unwrap();
    assert_eq!(outcome.report.errors, 2);
    assert_eq!(outcome.report.saved, 1);
    assert!(store.find_by_url("https://bad.example/1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_enrichment_uses_filter_then_defaults() {
    let store = Arc::new(InMemoryStorage::new());
    let provider = FakeProvider::new(
        "Plain",
        1,
        Behavior::Articles(vec![article("Untagged", "https://plain.example/1")]),
    );
    let service = service(store.clone(), vec![provider]);

    let filter = RefreshFilter::new(Some("gb".into()), None, Some("sports".into()), None);
    service.refresh(&filter).await.unwrap();

    let stored = store.find_by_url("https://plain.example/1").await.unwrap().unwrap();
    assert_eq!(stored.country.as_deref(), Some("gb"));
    assert_eq!(stored.language.as_deref(), Some("en"));
    assert_eq!(stored.category.as_deref(), Some("sports"));
    assert!(stored.summary.is_some());
}

struct UnavailableStore;

#[async_trait]
impl ArticleStore for UnavailableStore {
    fn name(&self) -> &str {
        "unavailable"
    }
    async fn find_by_url(&self, _url: &str) -> Result<Option<Article>> {
        Err(Error::Persistence("connection refused".into()))
    }
    async fn insert(&self, _article: &Article) -> Result<InsertOutcome> {
        Err(Error::Persistence("connection refused".into()))
    }
    async fn find_page(&self, _filter: &QueryFilter) -> Result<(Vec<Article>, u64)> {
        Err(Error::Persistence("connection refused".into()))
    }
    async fn fetched_since(&self, _since: DateTime<Utc>) -> Result<Vec<Article>> {
        Err(Error::Persistence("connection refused".into()))
    }
    async fn facets(&self) -> Result<Facets> {
        Err(Error::Persistence("connection refused".into()))
    }
    async fn delete_fetched_before(&self, _cutoff: DateTime<Utc>) -> Result<u64> {
        Err(Error::Persistence("connection refused".into()))
    }
    async fn count(&self) -> Result<u64> {
        Err(Error::Persistence("connection refused".into()))
    }
}

#[tokio::test]
async fn test_unavailable_store_fails_the_refresh() {
    let provider = FakeProvider::new(
        "Good",
        1,
        Behavior::Articles(vec![article("One", "https://good.example/1")]),
    );
    let service = service(Arc::new(UnavailableStore), vec![provider]);

    let result = service.refresh(&RefreshFilter::defaults()).await;
    assert!(matches!(result, Err(Error::Persistence(_))));
    assert_eq!(service.metrics().refreshes_failed, 1);
    assert_eq!(service.metrics().refreshes_completed, 0);
}
