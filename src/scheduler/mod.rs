//! The scheduler drives the scrape-classify-notify cycle.
//!
//! A single loop scans every persisted watcher each iteration, in store
//! order, and runs the full cycle for those that are due and registered in
//! the current run. The browser session is a shared, stateful resource, so
//! watchers are processed strictly sequentially; cancellation takes effect
//! between watchers and between iterations, never mid-extraction.

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    classifier::{Classification, classify},
    extractor::{ExtractResult, Extractor},
    models::{EventCategory, Watcher},
    notification::NotificationService,
    persistence::traits::WatcherRepository,
    registry::{RegisteredWatcher, WatcherRegistry},
};

/// Represents the set of errors that can occur during the scheduler's
/// operation.
///
/// Only store failures surface here: the process cannot make progress
/// without durable state, so these are non-recoverable.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The persistent store was unavailable or rejected a write.
    #[error("A data store operation failed: {0}")]
    Store(#[from] sqlx::Error),
}

/// The main loop: extract, classify, notify, persist.
pub struct Scheduler {
    repo: Arc<dyn WatcherRepository>,
    registry: WatcherRegistry,
    extractor: Extractor,
    notifications: NotificationService,
    poll_interval: Duration,
    cancellation_token: CancellationToken,
}

impl Scheduler {
    /// Creates a new scheduler over its collaborators.
    ///
    /// The registry must already be registered and reconciled; it is
    /// read-only for the lifetime of the loop.
    pub fn new(
        repo: Arc<dyn WatcherRepository>,
        registry: WatcherRegistry,
        extractor: Extractor,
        notifications: NotificationService,
        poll_interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self { repo, registry, extractor, notifications, poll_interval, cancellation_token }
    }

    /// Runs the scheduling loop until cancellation.
    pub async fn run(&self) -> Result<(), SchedulerError> {
        tracing::info!(
            watchers = self.registry.len(),
            poll_interval = ?self.poll_interval,
            "Scheduler started."
        );

        loop {
            self.run_cycle().await?;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Scheduler received shutdown signal, stopping.");
                    return Ok(());
                }
            }
        }
    }

    /// Scans all persisted watchers once and processes the due ones.
    ///
    /// Only watchers registered in the current run are considered; rows the
    /// reconciliation pass missed (e.g. written by a concurrent process) are
    /// skipped rather than scraped.
    pub async fn run_cycle(&self) -> Result<(), SchedulerError> {
        for watcher in self.repo.get_watchers().await? {
            if self.cancellation_token.is_cancelled() {
                tracing::debug!("Cancellation requested, finishing cycle early.");
                return Ok(());
            }

            let Some(entry) = self.registry.get(watcher.id) else {
                tracing::debug!(watcher_id = watcher.id, "Skipping unregistered watcher row.");
                continue;
            };

            let now = epoch_seconds();
            if !watcher.is_due(now) {
                continue;
            }

            self.process_watcher(&watcher, entry, now).await?;
        }
        Ok(())
    }

    /// Runs one watcher's full cycle: extract, classify, notify, persist.
    async fn process_watcher(
        &self,
        watcher: &Watcher,
        entry: &RegisteredWatcher,
        now: f64,
    ) -> Result<(), SchedulerError> {
        let result = match self.extractor.extract(watcher).await {
            Ok(result) => result,
            Err(e) => {
                // Transport failure: no state mutation, the next cycle
                // retries once the interval elapses again.
                tracing::warn!(
                    watcher_id = watcher.id,
                    url = %watcher.url,
                    error = %e,
                    "Extraction failed, watcher state unchanged."
                );
                return Ok(());
            }
        };

        let classification = classify(
            watcher.data.as_deref(),
            watcher.last_scrape.is_some(),
            &result,
        );
        let message = render_message(watcher, entry, &classification);

        match classification.category {
            EventCategory::Error => {
                tracing::warn!(watcher_id = watcher.id, url = %watcher.url, "{message}");
            }
            EventCategory::NoChange => {
                tracing::debug!(watcher_id = watcher.id, url = %watcher.url, "{message}");
            }
            _ => {
                tracing::info!(watcher_id = watcher.id, url = %watcher.url, "{message}");
            }
        }

        self.notifications
            .dispatch(&entry.channels, classification.category, &message)
            .await;

        // Persisted unconditionally, also on error events, so a permanently
        // missing element is re-checked at its interval rather than every
        // loop iteration.
        let new_value = match &result {
            ExtractResult::Found(text) => Some(text.as_str()),
            ExtractResult::NotFound => None,
        };
        self.repo.record_scrape(watcher.id, now, new_value).await?;

        Ok(())
    }
}

/// Renders the outgoing message, prefixing the watcher's name and URL when
/// verbose notifications are enabled.
fn render_message(
    watcher: &Watcher,
    entry: &RegisteredWatcher,
    classification: &Classification,
) -> String {
    if watcher.verbose_notifications {
        format!("{} ({}): {}", entry.name, watcher.url, classification.message)
    } else {
        classification.message.clone()
    }
}

/// The current time as float epoch seconds, the store's timestamp format.
fn epoch_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
