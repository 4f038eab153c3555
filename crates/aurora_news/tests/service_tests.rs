mod common;

use aurora_core::{ArticleStore, Error, QueryFilter, RefreshFilter};
use aurora_news::scheduler::{self, JobSchedule, SchedulerConfig};
use aurora_storage::InMemoryStorage;
use chrono::{Duration, Utc};
use common::{article, service, Behavior, CountingStore, FakeProvider};
use std::sync::Arc;

async fn seed(store: &dyn ArticleStore, count: usize) {
    for i in 0..count {
        let mut a = article(&format!("Story {}", i), &format!("https://seed.example/{}", i));
        a.published_at = Some(Utc::now() - Duration::minutes(i as i64));
        store.insert(&a).await.unwrap();
    }
}

#[tokio::test]
async fn test_pagination_over_45_articles() {
    let store = Arc::new(InMemoryStorage::new());
    seed(store.as_ref(), 45).await;
    let service = service(store, vec![]);

    let last = service.news(&QueryFilter::paged(2, 20)).await.unwrap();
    assert_eq!(last.total_pages, 3);
    assert_eq!(last.total_elements, 45);
    assert_eq!(last.articles.len(), 5);
    assert!(!last.has_next);
    assert!(last.has_previous);
    assert_eq!(last.articles[0].title, "Story 40");
    assert_eq!(last.available_sources, vec!["fake"]);
}

#[tokio::test]
async fn test_repeated_query_is_served_from_cache_until_refresh() {
    let store = Arc::new(CountingStore::default());
    seed(store.as_ref(), 3).await;
    let provider = FakeProvider::new(
        "Fresh",
        1,
        Behavior::Articles(vec![article("Breaking", "https://fresh.example/1")]),
    );
    let service = service(store.clone(), vec![provider]);
    let filter = QueryFilter::new(None, None, None, Some("story".into()), 0, 20);

    let first = service.news(&filter).await.unwrap();
    let second = service.news(&filter).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(store.page_reads(), 1);
    assert_eq!(service.metrics().cache_entries, 1);

    service.refresh(&RefreshFilter::defaults()).await.unwrap();
    assert_eq!(service.metrics().cache_entries, 0);

    let unfiltered = service.news(&QueryFilter::default()).await.unwrap();
    assert_eq!(unfiltered.total_elements, 4);
    assert_eq!(store.page_reads(), 2);
}

#[tokio::test]
async fn test_clear_cache_forces_reload() {
    let store = Arc::new(CountingStore::default());
    let service = service(store.clone(), vec![]);

    service.news(&QueryFilter::default()).await.unwrap();
    assert_eq!(service.clear_cache(), 1);
    service.news(&QueryFilter::default()).await.unwrap();
    assert_eq!(store.page_reads(), 2);
}

#[tokio::test]
async fn test_retention_sweep_removes_old_articles() {
    let store = Arc::new(InMemoryStorage::new());
    let mut stale = article("Stale", "https://old.example/1");
    stale.fetched_at = Utc::now() - Duration::days(8);
    store.insert(&stale).await.unwrap();
    store.insert(&article("Current", "https://new.example/1")).await.unwrap();
    let service = service(store.clone(), vec![]);

    service.news(&QueryFilter::default()).await.unwrap();
    let report = service.cleanup(None).await.unwrap();

    assert_eq!(report.retention_days, 7);
    assert_eq!((report.before, report.deleted, report.after), (2, 1, 1));
    assert!(store.find_by_url("https://old.example/1").await.unwrap().is_none());
    assert_eq!(service.metrics().cache_entries, 0);

    let again = service.cleanup(None).await.unwrap();
    assert_eq!(again.deleted, 0);
}

#[tokio::test]
async fn test_search_validation_and_matching() {
    let store = Arc::new(InMemoryStorage::new());
    store.insert(&article("Solar record", "https://s.example/1")).await.unwrap();
    store.insert(&article("Wind farm", "https://s.example/2")).await.unwrap();
    let service = service(store, vec![]);

    assert!(matches!(service.search("s", 0, 20).await, Err(Error::Validation(_))));

    let page = service.search("SOLAR", 0, 20).await.unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.articles[0].url, "https://s.example/1");

    let invalid = QueryFilter::new(None, None, None, Some("x".into()), 0, 20);
    assert!(matches!(service.news(&invalid).await, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_provider_listing_and_metrics() {
    let store = Arc::new(InMemoryStorage::new());
    let ok = FakeProvider::new("Ok", 1, Behavior::Articles(vec![article("A", "https://m.example/1")]));
    let broken = FakeProvider::new("Broken", 2, Behavior::Fail("apiKeyInvalid"));
    let service = service(store, vec![broken, ok]);

    service.refresh(&RefreshFilter::defaults()).await.unwrap();

    assert_eq!(service.active_providers(), vec!["Ok"]);
    assert_eq!(
        service.provider_descriptions(),
        vec!["Ok (enabled)", "Broken (enabled (unhealthy))"]
    );

    let metrics = service.metrics();
    assert_eq!(metrics.total_providers, 2);
    assert_eq!(metrics.active_providers, 1);
    assert_eq!(metrics.refreshes_completed, 1);
    assert_eq!(metrics.articles_saved, 1);

    let health = service.health_summary();
    assert_eq!((health.healthy, health.unhealthy), (1, 1));
}

#[tokio::test]
async fn test_scheduler_runs_refresh_and_stops() {
    let store = Arc::new(InMemoryStorage::new());
    let provider = FakeProvider::new(
        "Ticker",
        1,
        Behavior::Articles(vec![article("Tick", "https://tick.example/1")]),
    );
    let service = Arc::new(service(store.clone(), vec![provider.clone()]));

    let config = SchedulerConfig {
        cleanup: JobSchedule::disabled(std::time::Duration::from_secs(3600)),
        health: JobSchedule::disabled(std::time::Duration::from_secs(3600)),
        popular_categories: vec![],
        ..SchedulerConfig::default()
    };
    let handle = scheduler::start(service.clone(), config);
    assert_eq!(handle.job_names(), vec!["refresh"]);

    for _ in 0..50 {
        if store.count().await.unwrap() > 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    handle.stop().await;

    assert!(provider.calls() >= 1);
    assert_eq!(store.count().await.unwrap(), 1);
}
