//! Storage encryption key provisioning.
//!
//! Implements the get-or-create protocol for the master key: read it back
//! from the secure keystore, or synthesize a fresh one and persist it, with
//! two explicitly distinguished degraded paths (write-failed and
//! keystore-unavailable). Provisioning never fails the caller: whatever
//! happens, some key is returned, and its provenance says how trustworthy
//! it is.

use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;

use super::key::{KeySource, MasterKey, ProvisionedKey};
use super::keystore::{DeviceIdSource, SecretKeystore};

/// Fixed keystore entry name for the storage encryption key.
pub const KEY_STORAGE_NAME: &str = "storage-encryption-key";

/// Domain tag mixed into the deterministic device-derived fallback key.
const DEVICE_FALLBACK_TAG: &[u8] = b"keepsake.device-key.v1";

/// Provisions the storage encryption key.
///
/// Must be resolved, and awaited, before the encrypted store opens; no
/// storage operation runs concurrently with an in-flight key resolution
/// (the application context enforces this by sequencing its init).
pub struct KeyProvider {
    keystore: Arc<dyn SecretKeystore>,
    device_id: Arc<dyn DeviceIdSource>,
    entry_name: String,
}

impl KeyProvider {
    pub fn new(keystore: Arc<dyn SecretKeystore>, device_id: Arc<dyn DeviceIdSource>) -> Self {
        Self {
            keystore,
            device_id,
            entry_name: KEY_STORAGE_NAME.to_string(),
        }
    }

    /// Use a custom keystore entry name (for tests or multi-tenant setups).
    pub fn with_entry_name(mut self, name: &str) -> Self {
        self.entry_name = name.to_string();
        self
    }

    /// Get the persistent master key, creating one if necessary.
    ///
    /// Idempotent: with a healthy keystore, repeated calls (within one
    /// process or across restarts) return identical key bytes. Keystore
    /// errors are logged and recovered locally; this function always
    /// returns a key.
    pub async fn get_or_create(&self) -> ProvisionedKey {
        if !self.keystore.available() {
            return self.device_derived_fallback();
        }

        match self.keystore.get(&self.entry_name).await {
            Ok(Some(stored)) => match MasterKey::from_hex(&stored) {
                Ok(key) => {
                    tracing::debug!("Loaded storage encryption key from keystore");
                    return ProvisionedKey {
                        key,
                        source: KeySource::Keystore,
                    };
                }
                Err(e) => {
                    // A stored value we cannot decode is as good as absent;
                    // fall through and replace it.
                    tracing::error!(error = %e, "Stored encryption key is malformed, regenerating");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to read encryption key from keystore");
            }
        }

        let key = self.synthesize_key();
        match self.keystore.set(&self.entry_name, &key.to_hex()).await {
            Ok(()) => {
                tracing::info!("Generated and stored new storage encryption key");
                ProvisionedKey {
                    key,
                    source: KeySource::GeneratedStored,
                }
            }
            Err(e) => {
                // Non-fatal: the key still serves this session, but a later
                // successful run may generate a different key, making data
                // written now unreadable.
                tracing::error!(error = %e, "Failed to persist encryption key; using unstored key for this session");
                ProvisionedKey {
                    key,
                    source: KeySource::GeneratedUnstored,
                }
            }
        }
    }

    /// Combine device identity, a timestamp, and a random component into a
    /// fresh 256-bit key.
    fn synthesize_key(&self) -> MasterKey {
        let mut random_part = [0u8; 16];
        aes_gcm::aead::OsRng.fill_bytes(&mut random_part);

        let mut material = Vec::new();
        material.extend_from_slice(self.device_id.unique_device_id().as_bytes());
        material.extend_from_slice(Utc::now().timestamp_millis().to_be_bytes().as_slice());
        material.extend_from_slice(&random_part);

        MasterKey::derive(&material)
    }

    /// Deterministic weak key for platforms without any keystore.
    ///
    /// Stable across runs so data written under it stays readable; the
    /// `DeviceDerived` provenance marks the reduced security level.
    fn device_derived_fallback(&self) -> ProvisionedKey {
        tracing::warn!("Secure keystore unavailable; deriving encryption key from device id only");

        let mut material = Vec::new();
        material.extend_from_slice(self.device_id.unique_device_id().as_bytes());
        material.extend_from_slice(DEVICE_FALLBACK_TAG);

        ProvisionedKey {
            key: MasterKey::derive(&material),
            source: KeySource::DeviceDerived,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::security::key::KeyError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedDeviceId;

    impl DeviceIdSource for FixedDeviceId {
        fn unique_device_id(&self) -> String {
            "test-device-0001".to_string()
        }
    }

    #[derive(Default)]
    struct MapKeystore {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SecretKeystore for MapKeystore {
        async fn get(&self, name: &str) -> Result<Option<String>, KeyError> {
            Ok(self.entries.lock().unwrap().get(name).cloned())
        }

        async fn set(&self, name: &str, value: &str) -> Result<(), KeyError> {
            self.entries
                .lock()
                .unwrap()
                .insert(name.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, name: &str) -> Result<(), KeyError> {
            self.entries.lock().unwrap().remove(name);
            Ok(())
        }
    }

    /// Keystore whose writes always fail but reads work.
    #[derive(Default)]
    struct ReadOnlyKeystore;

    #[async_trait]
    impl SecretKeystore for ReadOnlyKeystore {
        async fn get(&self, _name: &str) -> Result<Option<String>, KeyError> {
            Ok(None)
        }

        async fn set(&self, _name: &str, _value: &str) -> Result<(), KeyError> {
            Err(KeyError::Keystore("write rejected".to_string()))
        }

        async fn delete(&self, _name: &str) -> Result<(), KeyError> {
            Ok(())
        }
    }

    /// Keystore modelling a platform without any keystore API.
    struct MissingKeystore;

    #[async_trait]
    impl SecretKeystore for MissingKeystore {
        fn available(&self) -> bool {
            false
        }

        async fn get(&self, _name: &str) -> Result<Option<String>, KeyError> {
            Err(KeyError::Keystore("unavailable".to_string()))
        }

        async fn set(&self, _name: &str, _value: &str) -> Result<(), KeyError> {
            Err(KeyError::Keystore("unavailable".to_string()))
        }

        async fn delete(&self, _name: &str) -> Result<(), KeyError> {
            Err(KeyError::Keystore("unavailable".to_string()))
        }
    }

    fn provider(keystore: Arc<dyn SecretKeystore>) -> KeyProvider {
        KeyProvider::new(keystore, Arc::new(FixedDeviceId))
    }

    #[tokio::test]
    async fn test_first_call_generates_and_stores() {
        let provider = provider(Arc::new(MapKeystore::default()));

        let provisioned = provider.get_or_create().await;
        assert_eq!(provisioned.source, KeySource::GeneratedStored);
    }

    #[tokio::test]
    async fn test_idempotent_key_retrieval() {
        let provider = provider(Arc::new(MapKeystore::default()));

        let first = provider.get_or_create().await;
        let second = provider.get_or_create().await;

        assert_eq!(first.key.to_hex(), second.key.to_hex());
        assert_eq!(second.source, KeySource::Keystore);
    }

    #[tokio::test]
    async fn test_write_failure_degrades_to_unstored() {
        let provider = provider(Arc::new(ReadOnlyKeystore));

        let first = provider.get_or_create().await;
        assert_eq!(first.source, KeySource::GeneratedUnstored);

        // A second call cannot read anything back, so it generates again;
        // the random component makes the keys differ.
        let second = provider.get_or_create().await;
        assert_eq!(second.source, KeySource::GeneratedUnstored);
        assert_ne!(first.key.to_hex(), second.key.to_hex());
    }

    #[tokio::test]
    async fn test_unavailable_keystore_derives_stable_device_key() {
        let provider = provider(Arc::new(MissingKeystore));

        let first = provider.get_or_create().await;
        let second = provider.get_or_create().await;

        assert_eq!(first.source, KeySource::DeviceDerived);
        assert_eq!(first.key.to_hex(), second.key.to_hex());
    }

    #[tokio::test]
    async fn test_malformed_stored_key_is_replaced() {
        let keystore = Arc::new(MapKeystore::default());
        keystore
            .set(KEY_STORAGE_NAME, "not-hex-at-all")
            .await
            .unwrap();

        let provider = provider(keystore.clone());
        let provisioned = provider.get_or_create().await;

        assert_eq!(provisioned.source, KeySource::GeneratedStored);

        let stored = keystore.get(KEY_STORAGE_NAME).await.unwrap().unwrap();
        assert_eq!(stored, provisioned.key.to_hex());
    }
}
