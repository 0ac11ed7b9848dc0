//! Generic write-through state container.
//!
//! Each persisted domain wraps a [`PersistedStore`] holding its in-memory
//! state and its storage name. Reads come from the cache only; storage is
//! consulted at hydration and on writes. Every mutation persists the full
//! resulting document before it returns.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::storage::SerializedStore;

/// Named, typed state container with an in-memory cache kept consistent
/// with the serialized store.
///
/// The write lock is held across the persist, so mutations of one domain
/// serialize. Each domain is expected to have a single logical writer at a
/// time; the lock makes read-modify-write mutators such as toggles
/// race-free without any cross-domain coordination.
pub struct PersistedStore<T> {
    name: &'static str,
    adapter: SerializedStore,
    state: RwLock<T>,
}

impl<T> PersistedStore<T>
where
    T: Clone + Default + Serialize + DeserializeOwned + Send + Sync,
{
    /// Load the store, replacing the initial state with the persisted
    /// document if one exists.
    ///
    /// Hydration never fails: an absent or unreadable document leaves the
    /// declared initial state (`T::default()`) in place.
    pub async fn hydrate(name: &'static str, adapter: SerializedStore) -> Self {
        let state = match adapter.get_item::<T>(name).await {
            Some(persisted) => {
                tracing::debug!(domain = %name, "Hydrated persisted state");
                persisted
            }
            None => T::default(),
        };

        Self {
            name,
            adapter,
            state: RwLock::new(state),
        }
    }

    /// The domain's storage name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current in-memory state. Never re-reads from storage.
    pub async fn snapshot(&self) -> T {
        self.state.read().await.clone()
    }

    /// Apply a mutation and persist the full resulting state before
    /// returning.
    ///
    /// On a persist failure the in-memory state still reflects the update;
    /// the error tells the caller that the persisted copy has diverged.
    pub async fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let mut state = self.state.write().await;
        f(&mut state);
        self.adapter.set_item(self.name, &*state).await
    }

    /// Replace the whole state and persist it.
    pub async fn replace(&self, value: T) -> Result<()> {
        let mut state = self.state.write().await;
        *state = value;
        self.adapter.set_item(self.name, &*state).await
    }

    /// Restore the declared initial state, in memory and on disk.
    pub async fn reset(&self) -> Result<()> {
        self.replace(T::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::security::MasterKey;
    use crate::storage::{Database, EncryptedStore, SerializedStore};
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    async fn test_adapter() -> SerializedStore {
        let db = Database::in_memory().await.expect("in-memory database");
        SerializedStore::new(EncryptedStore::new(&db, MasterKey::generate()))
    }

    #[tokio::test]
    async fn test_hydrate_without_persisted_state_uses_default() {
        let adapter = test_adapter().await;
        let store: PersistedStore<Counter> = PersistedStore::hydrate("counter", adapter).await;

        assert_eq!(store.snapshot().await, Counter::default());
    }

    #[tokio::test]
    async fn test_update_persists_before_returning() {
        let adapter = test_adapter().await;
        let store: PersistedStore<Counter> =
            PersistedStore::hydrate("counter", adapter.clone()).await;

        store.update(|c| c.value = 7).await.unwrap();

        let persisted: Counter = adapter.get_item("counter").await.unwrap();
        assert_eq!(persisted.value, 7);
    }

    #[tokio::test]
    async fn test_hydrate_picks_up_persisted_state() {
        let adapter = test_adapter().await;

        {
            let store: PersistedStore<Counter> =
                PersistedStore::hydrate("counter", adapter.clone()).await;
            store.update(|c| c.value = 41).await.unwrap();
        }

        // Fresh in-memory state over the same adapter
        let store: PersistedStore<Counter> = PersistedStore::hydrate("counter", adapter).await;
        assert_eq!(store.snapshot().await.value, 41);
    }

    #[tokio::test]
    async fn test_reset_restores_initial_state() {
        let adapter = test_adapter().await;
        let store: PersistedStore<Counter> =
            PersistedStore::hydrate("counter", adapter.clone()).await;

        store.update(|c| c.value = 13).await.unwrap();
        store.reset().await.unwrap();

        assert_eq!(store.snapshot().await, Counter::default());
        let persisted: Counter = adapter.get_item("counter").await.unwrap();
        assert_eq!(persisted, Counter::default());
    }

    #[tokio::test]
    async fn test_sequential_updates_compose() {
        let adapter = test_adapter().await;
        let store: PersistedStore<Counter> = PersistedStore::hydrate("counter", adapter).await;

        store.update(|c| c.value += 1).await.unwrap();
        store.update(|c| c.value += 1).await.unwrap();
        store.update(|c| c.value += 1).await.unwrap();

        assert_eq!(store.snapshot().await.value, 3);
    }
}
