//! The in-memory authoritative set of watchers for the current run.
//!
//! At startup every configured watcher is registered (bound to an existing
//! store row or inserted fresh), then a single reconciliation pass prunes
//! store rows no longer referenced by the configuration. During the scheduler
//! loop the registry is read-only.

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;

use crate::{
    models::{ChannelConfig, Watcher, WatcherConfig},
    persistence::traits::WatcherRepository,
};

/// Errors that can occur while building or reconciling the registry.
///
/// All of these are fatal at startup: no partial registry is acceptable.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The persistent store was unavailable or rejected an operation.
    #[error("A data store operation failed: {0}")]
    Store(#[from] sqlx::Error),
}

/// A watcher entry for the current run, carrying the in-memory-only fields.
#[derive(Debug, Clone)]
pub struct RegisteredWatcher {
    /// The store-assigned identity.
    pub id: i64,
    /// The resolved display name.
    pub name: String,
    /// The notification channels attached to this watcher. Channels are
    /// values, not records; they are never persisted.
    pub channels: Vec<ChannelConfig>,
}

/// The registry of watchers declared by the current run's configuration,
/// indexed by store identity for constant-time membership tests.
pub struct WatcherRegistry {
    repo: Arc<dyn WatcherRepository>,
    entries: HashMap<i64, RegisteredWatcher>,
}

impl WatcherRegistry {
    /// Creates an empty registry over the given store.
    pub fn new(repo: Arc<dyn WatcherRepository>) -> Self {
        Self { repo, entries: HashMap::new() }
    }

    /// Registers a configured watcher, binding it to an existing store row
    /// with the same (`url`, `css_selector`, `name`) identity or inserting a
    /// new one. Returns the watcher's identity.
    ///
    /// On rebind, the row's settings are refreshed from the current
    /// configuration; `last_scrape` and `data` are left untouched.
    pub async fn register(&mut self, config: &WatcherConfig) -> Result<i64, RegistryError> {
        let mut watcher = Watcher::from_config(config);

        let id = match self
            .repo
            .find_watcher(&watcher.url, &watcher.css_selector, &watcher.name)
            .await?
        {
            Some(existing) => {
                tracing::info!(
                    watcher_id = existing.id,
                    url = %watcher.url,
                    name = %watcher.name,
                    "Found existing watcher, reusing its identity."
                );
                watcher.id = existing.id;
                self.repo.update_watcher_settings(&watcher).await?;
                existing.id
            }
            None => {
                let id = self.repo.insert_watcher(&watcher).await?;
                tracing::info!(
                    watcher_id = id,
                    url = %watcher.url,
                    name = %watcher.name,
                    "Created watcher."
                );
                id
            }
        };

        self.entries.insert(
            id,
            RegisteredWatcher { id, name: watcher.name, channels: config.notifiers.clone() },
        );
        Ok(id)
    }

    /// Deletes every store row whose identity is absent from this run's
    /// registry. Returns the number of rows pruned.
    ///
    /// Must run once, after all `register` calls and before the scheduler
    /// loop starts. Running it again with an unchanged registry deletes
    /// nothing.
    pub async fn reconcile(&self) -> Result<usize, RegistryError> {
        let mut pruned = 0;
        for row in self.repo.get_watchers().await? {
            if !self.entries.contains_key(&row.id) {
                self.repo.delete_watcher(row.id).await?;
                tracing::info!(
                    watcher_id = row.id,
                    url = %row.url,
                    name = %row.name,
                    "Deleted watcher no longer present in configuration."
                );
                pruned += 1;
            }
        }
        Ok(pruned)
    }

    /// Returns the registry entry for an identity, if registered in this run.
    pub fn get(&self, id: i64) -> Option<&RegisteredWatcher> {
        self.entries.get(&id)
    }

    /// Whether the identity is registered in this run.
    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    /// The number of registered watchers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
