//! End-to-end scheduler tests over a scripted browser and an in-memory store

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use vigil::{
    extractor::Extractor,
    models::{ChannelConfig, EventCategory, WatcherConfig, WebhookChannel},
    notification::NotificationService,
    persistence::{SqliteWatcherRepository, traits::WatcherRepository},
    registry::WatcherRegistry,
    scheduler::Scheduler,
    test_helpers::{FakePageDriver, ScriptedPage},
};

async fn setup_db() -> Arc<SqliteWatcherRepository> {
    let repo = SqliteWatcherRepository::new("sqlite::memory:")
        .await
        .expect("Failed to set up in-memory database");
    repo.run_migrations().await.expect("Failed to run migrations");
    Arc::new(repo)
}

fn webhook(url: &str, on_events: Vec<EventCategory>) -> ChannelConfig {
    ChannelConfig::Webhook(WebhookChannel {
        url: url.to_string(),
        content_field_name: "content".to_string(),
        on_events,
    })
}

fn config(notifiers: Vec<ChannelConfig>) -> WatcherConfig {
    WatcherConfig {
        url: "https://shop.example.com/item".to_string(),
        css_selector: "#price".to_string(),
        name: Some("Item price".to_string()),
        interval: 60,
        pause_time: 0,
        scroll_to_bottom: false,
        verbose_notifications: false,
        notifiers,
    }
}

struct Harness {
    repo: Arc<SqliteWatcherRepository>,
    driver: Arc<FakePageDriver>,
    scheduler: Scheduler,
    watcher_id: i64,
}

async fn setup(pages: Vec<ScriptedPage>, watcher_config: WatcherConfig) -> Harness {
    let repo = setup_db().await;

    let mut registry = WatcherRegistry::new(repo.clone() as Arc<dyn WatcherRepository>);
    let watcher_id = registry.register(&watcher_config).await.unwrap();

    let driver = Arc::new(FakePageDriver::new(pages));
    let scheduler = Scheduler::new(
        repo.clone() as Arc<dyn WatcherRepository>,
        registry,
        Extractor::new(driver.clone()),
        NotificationService::new(),
        Duration::from_millis(10),
        CancellationToken::new(),
    );

    Harness { repo, driver, scheduler, watcher_id }
}

#[tokio::test]
async fn test_first_scrape_stores_value_and_timestamp() {
    let harness = setup(
        vec![ScriptedPage::Element(Some("42".to_string()))],
        config(vec![]),
    )
    .await;

    harness.scheduler.run_cycle().await.unwrap();

    let stored = &harness.repo.get_watchers().await.unwrap()[0];
    assert_eq!(stored.data.as_deref(), Some("42"));
    assert!(stored.last_scrape.is_some());
}

#[tokio::test]
async fn test_first_scrape_notifies_subscribed_channel() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "content": "First scrape: 42"
        })))
        .with_status(200)
        .create_async()
        .await;

    let harness = setup(
        vec![ScriptedPage::Element(Some("42".to_string()))],
        config(vec![webhook(&server.url(), vec![EventCategory::FirstScrape])]),
    )
    .await;

    harness.scheduler.run_cycle().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_numeric_decrease_notifies_change_subscriber() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "content": "Value decreased from 42 to 17"
        })))
        .with_status(200)
        .create_async()
        .await;

    // Subscribing to `change` implicitly covers the numeric sub-events.
    let harness = setup(
        vec![ScriptedPage::Element(Some("17".to_string()))],
        config(vec![webhook(&server.url(), vec![EventCategory::Change])]),
    )
    .await;
    harness.repo.record_scrape(harness.watcher_id, 0.0, Some("42")).await.unwrap();

    harness.scheduler.run_cycle().await.unwrap();
    mock.assert_async().await;

    let stored = &harness.repo.get_watchers().await.unwrap()[0];
    assert_eq!(stored.data.as_deref(), Some("17"));
}

#[tokio::test]
async fn test_no_change_is_not_notified_to_change_subscriber() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/").expect(0).create_async().await;

    let harness = setup(
        vec![ScriptedPage::Element(Some("42".to_string()))],
        config(vec![webhook(&server.url(), vec![EventCategory::Change])]),
    )
    .await;
    harness.repo.record_scrape(harness.watcher_id, 0.0, Some("42")).await.unwrap();

    harness.scheduler.run_cycle().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_element_records_error_and_clears_value() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "content": "Element not found"
        })))
        .with_status(200)
        .create_async()
        .await;

    let harness = setup(
        vec![ScriptedPage::Element(None)],
        config(vec![webhook(&server.url(), vec![EventCategory::Error])]),
    )
    .await;
    harness.repo.record_scrape(harness.watcher_id, 0.0, Some("42")).await.unwrap();

    harness.scheduler.run_cycle().await.unwrap();
    mock.assert_async().await;

    // The timestamp still advances, so the next check waits a full interval.
    let stored = &harness.repo.get_watchers().await.unwrap()[0];
    assert!(stored.data.is_none());
    assert!(stored.last_scrape.unwrap() > 0.0);
}

#[tokio::test]
async fn test_missing_element_on_first_scrape_has_distinct_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "content": "Element not found on first scrape"
        })))
        .with_status(200)
        .create_async()
        .await;

    let harness = setup(
        vec![ScriptedPage::Element(None)],
        config(vec![webhook(&server.url(), vec![EventCategory::Error])]),
    )
    .await;

    harness.scheduler.run_cycle().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_verbose_notifications_prefix_name_and_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "content": "Item price (https://shop.example.com/item): First scrape: 42"
        })))
        .with_status(200)
        .create_async()
        .await;

    let mut watcher_config =
        config(vec![webhook(&server.url(), vec![EventCategory::FirstScrape])]);
    watcher_config.verbose_notifications = true;

    let harness = setup(vec![ScriptedPage::Element(Some("42".to_string()))], watcher_config).await;

    harness.scheduler.run_cycle().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_watcher_not_rescraped_before_interval_elapses() {
    let harness = setup(
        vec![
            ScriptedPage::Element(Some("42".to_string())),
            ScriptedPage::Element(Some("17".to_string())),
        ],
        config(vec![]),
    )
    .await;

    harness.scheduler.run_cycle().await.unwrap();
    assert_eq!(harness.driver.goto_calls(), 1);

    // The interval is 60s; an immediate second cycle must not navigate again.
    harness.scheduler.run_cycle().await.unwrap();
    assert_eq!(harness.driver.goto_calls(), 1);

    let stored = &harness.repo.get_watchers().await.unwrap()[0];
    assert_eq!(stored.data.as_deref(), Some("42"));
}

#[tokio::test]
async fn test_transport_failure_leaves_state_untouched() {
    let harness = setup(vec![ScriptedPage::NavigationError], config(vec![])).await;

    harness.scheduler.run_cycle().await.unwrap();

    // No successful extraction happened, so nothing was recorded and the
    // watcher stays immediately due for the next cycle.
    let stored = &harness.repo.get_watchers().await.unwrap()[0];
    assert!(stored.last_scrape.is_none());
    assert!(stored.data.is_none());
}
