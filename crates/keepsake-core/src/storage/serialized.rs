//! JSON serialization adapter over the encrypted store.
//!
//! Domain stores read and write whole documents by name through this
//! adapter. Reads degrade: a missing, unreadable or unparseable entry
//! behaves like a cold start and yields `None`. Writes surface their
//! errors, because a dropped write means the in-memory state and the
//! persisted state have diverged.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::storage::encrypted::EncryptedStore;

/// Fixed prefix for state document keys, so domain documents cannot
/// collide with anything else sharing the store.
const STATE_KEY_PREFIX: &str = "state:";

/// Typed JSON document access over the encrypted byte store.
#[derive(Debug, Clone)]
pub struct SerializedStore {
    store: EncryptedStore,
}

impl SerializedStore {
    pub fn new(store: EncryptedStore) -> Self {
        Self { store }
    }

    fn storage_key(name: &str) -> String {
        format!("{}{}", STATE_KEY_PREFIX, name)
    }

    /// Read and parse the document stored under `name`.
    ///
    /// Any read-side failure (storage error, undecryptable entry, malformed
    /// JSON) is logged and reported as `None`, so a corrupted entry behaves
    /// like a cold start for the domain that reads it.
    pub async fn get_item<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let bytes = match self.store.get(&Self::storage_key(name)).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "Failed to read state document");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    name = %name,
                    error = %e,
                    "Stored state document is malformed, treating as absent"
                );
                None
            }
        }
    }

    /// Serialize `value` and write it under `name`.
    ///
    /// Serialization and storage failures are surfaced to the caller.
    pub async fn set_item<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(&Self::storage_key(name), &bytes).await
    }

    /// Remove the document stored under `name`.
    pub async fn remove_item(&self, name: &str) -> Result<()> {
        self.store.delete(&Self::storage_key(name)).await
    }

    /// Access the underlying byte store.
    pub fn raw(&self) -> &EncryptedStore {
        &self.store
    }
}
