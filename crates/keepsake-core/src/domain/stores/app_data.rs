//! Sync metadata store.
//!
//! Tracks the last successful data synchronization and the current loading
//! flag, persisted so the app can show sync freshness after a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::registry::ResettableStore;
use crate::domain::store::PersistedStore;
use crate::error::Result;
use crate::storage::SerializedStore;

/// Storage name for the sync metadata document.
pub const APP_DATA_STORAGE: &str = "app-data-storage";

/// Sync metadata state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDataState {
    pub last_sync_time: Option<DateTime<Utc>>,
    pub is_loading: bool,
}

/// Sync metadata domain store.
pub struct AppDataStore {
    inner: PersistedStore<AppDataState>,
}

impl AppDataStore {
    pub async fn hydrate(adapter: SerializedStore) -> Self {
        Self {
            inner: PersistedStore::hydrate(APP_DATA_STORAGE, adapter).await,
        }
    }

    pub async fn snapshot(&self) -> AppDataState {
        self.inner.snapshot().await
    }

    pub async fn set_last_sync_time(&self, time: DateTime<Utc>) -> Result<()> {
        self.inner
            .update(|state| state.last_sync_time = Some(time))
            .await
    }

    pub async fn set_loading(&self, is_loading: bool) -> Result<()> {
        self.inner
            .update(|state| state.is_loading = is_loading)
            .await
    }
}

#[async_trait]
impl ResettableStore for AppDataStore {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn reset(&self) -> Result<()> {
        self.inner.reset().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::security::MasterKey;
    use crate::storage::{Database, EncryptedStore};

    async fn test_store() -> AppDataStore {
        let db = Database::in_memory().await.expect("in-memory database");
        let adapter = SerializedStore::new(EncryptedStore::new(&db, MasterKey::generate()));
        AppDataStore::hydrate(adapter).await
    }

    #[tokio::test]
    async fn test_initial_state() {
        let store = test_store().await;
        let state = store.snapshot().await;

        assert!(state.last_sync_time.is_none());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_setters_are_independent() {
        let store = test_store().await;
        let now = Utc::now();

        store.set_last_sync_time(now).await.unwrap();
        store.set_loading(true).await.unwrap();

        let state = store.snapshot().await;
        assert_eq!(state.last_sync_time, Some(now));
        assert!(state.is_loading);

        store.set_loading(false).await.unwrap();
        let state = store.snapshot().await;
        assert_eq!(state.last_sync_time, Some(now), "loading flag must not clobber sync time");
        assert!(!state.is_loading);
    }
}
