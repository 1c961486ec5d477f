//! This module contains the state management interface for the application.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::models::Watcher;

/// The durable store for watcher rows.
///
/// The store is the single source of truth for `last_scrape` and `data`; the
/// in-memory registry only carries identity and channels.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WatcherRepository: Send + Sync {
    /// Looks up a watcher by its logical identity.
    async fn find_watcher(
        &self,
        url: &str,
        css_selector: &str,
        name: &str,
    ) -> Result<Option<Watcher>, sqlx::Error>;

    /// Inserts a new watcher row and returns the assigned identity.
    async fn insert_watcher(&self, watcher: &Watcher) -> Result<i64, sqlx::Error>;

    /// Refreshes the configurable settings of an existing row from the
    /// current run's configuration.
    async fn update_watcher_settings(&self, watcher: &Watcher) -> Result<(), sqlx::Error>;

    /// Retrieves all watcher rows in store iteration order.
    async fn get_watchers(&self) -> Result<Vec<Watcher>, sqlx::Error>;

    /// Deletes a watcher row by identity.
    async fn delete_watcher(&self, id: i64) -> Result<(), sqlx::Error>;

    /// Records the outcome of a scrape cycle: the scrape timestamp and the
    /// observed value (or `None` when the element was not found).
    async fn record_scrape<'a>(
        &self,
        id: i64,
        last_scrape: f64,
        data: Option<&'a str>,
    ) -> Result<(), sqlx::Error>;
}
