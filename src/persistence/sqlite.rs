//! This module provides a concrete implementation of the WatcherRepository
//! using SQLite.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

use super::{error::PersistenceError, traits::WatcherRepository};
use crate::models::Watcher;

/// SQL query constants for watcher operations
mod watcher_sql {
    /// Select a watcher by its logical identity.
    pub const FIND_WATCHER: &str =
        "SELECT watcher_id, url, css_selector, name, interval, pause_time, scroll_to_bottom, \
         verbose_notifications, last_scrape, data FROM watchers \
         WHERE url = ? AND css_selector = ? AND name = ?";

    /// Select all watchers in store order.
    pub const SELECT_WATCHERS: &str =
        "SELECT watcher_id, url, css_selector, name, interval, pause_time, scroll_to_bottom, \
         verbose_notifications, last_scrape, data FROM watchers ORDER BY watcher_id";

    /// Insert a new watcher.
    pub const INSERT_WATCHER: &str =
        "INSERT INTO watchers (url, css_selector, name, interval, pause_time, scroll_to_bottom, \
         verbose_notifications, last_scrape, data) VALUES (?, ?, ?, ?, ?, ?, ?, NULL, NULL)";

    /// Refresh the configurable settings of an existing watcher.
    pub const UPDATE_SETTINGS: &str =
        "UPDATE watchers SET interval = ?, pause_time = ?, scroll_to_bottom = ?, \
         verbose_notifications = ? WHERE watcher_id = ?";

    /// Delete a watcher by identity.
    pub const DELETE_WATCHER: &str = "DELETE FROM watchers WHERE watcher_id = ?";

    /// Record the outcome of a scrape cycle.
    pub const RECORD_SCRAPE: &str =
        "UPDATE watchers SET last_scrape = ?, data = ? WHERE watcher_id = ?";
}

/// A concrete implementation of the WatcherRepository using SQLite.
pub struct SqliteWatcherRepository {
    /// The SQLite connection pool used for database operations.
    pool: SqlitePool,
}

impl SqliteWatcherRepository {
    /// Creates a new repository connected to the given database URL. The
    /// database file is created if it does not exist.
    #[tracing::instrument(level = "info")]
    pub async fn new(database_url: &str) -> Result<Self, PersistenceError> {
        tracing::debug!(database_url, "Attempting to connect to SQLite database.");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        tracing::info!(database_url, "Successfully connected to SQLite database.");
        Ok(Self { pool })
    }

    /// Runs database migrations.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn run_migrations(&self) -> Result<(), PersistenceError> {
        tracing::debug!("Running database migrations.");
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations.");
            e
        })?;
        tracing::info!("Database migrations completed successfully.");
        Ok(())
    }

    /// Closes the connection pool gracefully.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn close(&self) {
        tracing::debug!("Closing SQLite connection pool.");
        self.pool.close().await;
        tracing::info!("SQLite connection pool closed successfully.");
    }
}

#[async_trait]
impl WatcherRepository for SqliteWatcherRepository {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn find_watcher(
        &self,
        url: &str,
        css_selector: &str,
        name: &str,
    ) -> Result<Option<Watcher>, sqlx::Error> {
        sqlx::query_as::<_, Watcher>(watcher_sql::FIND_WATCHER)
            .bind(url)
            .bind(css_selector)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url, "Failed to look up watcher.");
                e
            })
    }

    #[tracing::instrument(skip(self, watcher), fields(url = %watcher.url, name = %watcher.name), level = "debug")]
    async fn insert_watcher(&self, watcher: &Watcher) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(watcher_sql::INSERT_WATCHER)
            .bind(&watcher.url)
            .bind(&watcher.css_selector)
            .bind(&watcher.name)
            .bind(watcher.interval)
            .bind(watcher.pause_time)
            .bind(watcher.scroll_to_bottom)
            .bind(watcher.verbose_notifications)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %watcher.url, "Failed to insert watcher.");
                e
            })?;
        Ok(result.last_insert_rowid())
    }

    #[tracing::instrument(skip(self, watcher), fields(watcher_id = watcher.id), level = "debug")]
    async fn update_watcher_settings(&self, watcher: &Watcher) -> Result<(), sqlx::Error> {
        sqlx::query(watcher_sql::UPDATE_SETTINGS)
            .bind(watcher.interval)
            .bind(watcher.pause_time)
            .bind(watcher.scroll_to_bottom)
            .bind(watcher.verbose_notifications)
            .bind(watcher.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, watcher_id = watcher.id, "Failed to update watcher settings.");
                e
            })?;
        Ok(())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_watchers(&self) -> Result<Vec<Watcher>, sqlx::Error> {
        sqlx::query_as::<_, Watcher>(watcher_sql::SELECT_WATCHERS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch watchers.");
                e
            })
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn delete_watcher(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(watcher_sql::DELETE_WATCHER)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, watcher_id = id, "Failed to delete watcher.");
                e
            })?;
        Ok(())
    }

    #[tracing::instrument(skip(self, data), level = "debug")]
    async fn record_scrape<'a>(
        &self,
        id: i64,
        last_scrape: f64,
        data: Option<&'a str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(watcher_sql::RECORD_SCRAPE)
            .bind(last_scrape)
            .bind(data)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, watcher_id = id, "Failed to record scrape result.");
                e
            })?;
        Ok(())
    }
}
