//! This module defines the interface to the browser session and the
//! extraction algorithm built on top of it.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::Watcher;

pub mod webdriver;

pub use webdriver::WebDriverSession;

/// Custom error type for driver-level operations.
///
/// These are transport failures (driver crashed, navigation error), distinct
/// from the element simply not being on the page.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A WebDriver command failed.
    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    /// Establishing the WebDriver session failed.
    #[error("Failed to create WebDriver session: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    /// A script executed in the page returned something unexpected.
    #[error("Unexpected script result: {0}")]
    ScriptResult(String),
}

/// The result of attempting to extract a watcher's element text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractResult {
    /// The element was located and its text read.
    Found(String),
    /// No element matched the selector.
    NotFound,
}

/// A controllable browser session.
///
/// There is exactly one session per process; it is a shared, stateful
/// resource that cannot serve two navigations at once, which is what
/// serializes the scheduler loop.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigates the session to the given URL.
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// Returns the text of the first element matching the CSS selector, or
    /// `None` when no element matches.
    async fn element_text(&self, selector: &str) -> Result<Option<String>, DriverError>;

    /// Scrolls the page to the bottom.
    async fn scroll_to_bottom(&self) -> Result<(), DriverError>;

    /// Returns the current scroll height of the page.
    async fn page_height(&self) -> Result<u64, DriverError>;

    /// Closes the session, releasing the browser.
    async fn close(&self) -> Result<(), DriverError>;
}

/// Wraps the browser session with the extraction algorithm: navigate, pause,
/// optionally scroll until the page height stabilizes, and locate the target
/// element.
pub struct Extractor {
    driver: Arc<dyn PageDriver>,
}

impl Extractor {
    /// Creates a new extractor over the given browser session.
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }

    /// Extracts the watcher's element text.
    ///
    /// When `scroll_to_bottom` is set, the page is scrolled repeatedly; the
    /// loop terminates when the element appears or the page height stops
    /// growing. Height convergence is the only bound: a page whose height
    /// never stabilizes keeps this extraction in flight.
    pub async fn extract(&self, watcher: &Watcher) -> Result<ExtractResult, DriverError> {
        self.driver.goto(&watcher.url).await?;

        let pause = Duration::from_secs(watcher.pause_time.max(0) as u64);

        if !watcher.scroll_to_bottom {
            tokio::time::sleep(pause).await;
            return Ok(match self.driver.element_text(&watcher.css_selector).await? {
                Some(text) => ExtractResult::Found(text),
                None => ExtractResult::NotFound,
            });
        }

        let mut last_height: Option<u64> = None;
        loop {
            self.driver.scroll_to_bottom().await?;
            tokio::time::sleep(pause).await;

            if let Some(text) = self.driver.element_text(&watcher.css_selector).await? {
                return Ok(ExtractResult::Found(text));
            }

            let height = self.driver.page_height().await?;
            if last_height == Some(height) {
                return Ok(ExtractResult::NotFound);
            }
            last_height = Some(height);
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::{Sequence, predicate::eq};

    use super::*;
    use crate::models::WatcherConfig;

    fn watcher(scroll_to_bottom: bool) -> Watcher {
        Watcher::from_config(&WatcherConfig {
            url: "https://example.com/page".to_string(),
            css_selector: "#price".to_string(),
            name: None,
            interval: 60,
            pause_time: 0,
            scroll_to_bottom,
            verbose_notifications: false,
            notifiers: vec![],
        })
    }

    #[tokio::test]
    async fn test_extract_found_without_scrolling() {
        let mut driver = MockPageDriver::new();
        driver
            .expect_goto()
            .with(eq("https://example.com/page"))
            .once()
            .returning(|_| Ok(()));
        driver
            .expect_element_text()
            .with(eq("#price"))
            .once()
            .returning(|_| Ok(Some("42".to_string())));
        driver.expect_scroll_to_bottom().never();

        let extractor = Extractor::new(Arc::new(driver));
        let result = extractor.extract(&watcher(false)).await.unwrap();
        assert_eq!(result, ExtractResult::Found("42".to_string()));
    }

    #[tokio::test]
    async fn test_extract_not_found_without_scrolling() {
        let mut driver = MockPageDriver::new();
        driver.expect_goto().once().returning(|_| Ok(()));
        driver.expect_element_text().once().returning(|_| Ok(None));

        let extractor = Extractor::new(Arc::new(driver));
        let result = extractor.extract(&watcher(false)).await.unwrap();
        assert_eq!(result, ExtractResult::NotFound);
    }

    #[tokio::test]
    async fn test_scroll_loop_stops_when_height_stabilizes() {
        let mut driver = MockPageDriver::new();
        driver.expect_goto().once().returning(|_| Ok(()));
        driver.expect_scroll_to_bottom().times(3).returning(|| Ok(()));
        driver.expect_element_text().times(3).returning(|_| Ok(None));

        // Heights: 100, 200, 200 -> converged after the third pass.
        let mut seq = Sequence::new();
        for height in [100u64, 200, 200] {
            driver
                .expect_page_height()
                .once()
                .in_sequence(&mut seq)
                .returning(move || Ok(height));
        }

        let extractor = Extractor::new(Arc::new(driver));
        let result = extractor.extract(&watcher(true)).await.unwrap();
        assert_eq!(result, ExtractResult::NotFound);
    }

    #[tokio::test]
    async fn test_scroll_loop_returns_as_soon_as_element_appears() {
        let mut driver = MockPageDriver::new();
        driver.expect_goto().once().returning(|_| Ok(()));
        driver.expect_scroll_to_bottom().times(2).returning(|| Ok(()));

        let mut seq = Sequence::new();
        driver
            .expect_element_text()
            .once()
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        driver
            .expect_element_text()
            .once()
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some("loaded".to_string())));
        driver.expect_page_height().once().returning(|| Ok(100));

        let extractor = Extractor::new(Arc::new(driver));
        let result = extractor.extract(&watcher(true)).await.unwrap();
        assert_eq!(result, ExtractResult::Found("loaded".to_string()));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut driver = MockPageDriver::new();
        driver.expect_goto().once().returning(|_| {
            Err(DriverError::ScriptResult("session lost".to_string()))
        });

        let extractor = Extractor::new(Arc::new(driver));
        let result = extractor.extract(&watcher(false)).await;
        assert!(result.is_err());
    }
}
