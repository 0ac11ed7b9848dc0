//! OS keyring integration for the storage encryption key.
//!
//! Stores the master encryption key in the operating system's credential
//! store (macOS Keychain, Windows Credential Manager, Linux Secret Service).

use async_trait::async_trait;
use keyring::Entry;

use crate::domain::security::{KeyError, SecretKeystore};

/// Service name used for keyring storage
const KEYRING_SERVICE: &str = "keepsake";

/// OS keyring-backed secret keystore.
///
/// Secrets are stored as passwords under a fixed service name. Access may
/// require user authentication depending on OS configuration.
#[derive(Debug, Clone)]
pub struct KeyringKeystore {
    service: String,
}

impl Default for KeyringKeystore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringKeystore {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    /// Use a custom service name (for tests or multi-tenant scenarios).
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, name: &str) -> Result<Entry, KeyError> {
        Entry::new(&self.service, name)
            .map_err(|e| KeyError::Keystore(format!("Failed to create keyring entry: {}", e)))
    }
}

#[async_trait]
impl SecretKeystore for KeyringKeystore {
    async fn get(&self, name: &str) -> Result<Option<String>, KeyError> {
        let entry = self.entry(name)?;

        // keyring operations are blocking, so run them on a blocking task
        let result = tokio::task::spawn_blocking(move || entry.get_password())
            .await
            .map_err(|e| KeyError::Keystore(format!("Task join error: {}", e)))?;

        match result {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(KeyError::Keystore(format!(
                "Failed to read keystore entry: {}",
                e
            ))),
        }
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), KeyError> {
        let entry = self.entry(name)?;
        let value = value.to_string();

        tokio::task::spawn_blocking(move || {
            entry
                .set_password(&value)
                .map_err(|e| KeyError::Keystore(format!("Failed to write keystore entry: {}", e)))
        })
        .await
        .map_err(|e| KeyError::Keystore(format!("Task join error: {}", e)))?
    }

    async fn delete(&self, name: &str) -> Result<(), KeyError> {
        let entry = self.entry(name)?;

        tokio::task::spawn_blocking(move || match entry.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(KeyError::Keystore(format!(
                "Failed to delete keystore entry: {}",
                e
            ))),
        })
        .await
        .map_err(|e| KeyError::Keystore(format!("Task join error: {}", e)))?
    }
}

/// In-memory keystore for testing.
///
/// Stores secrets in a process-local map; nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryKeystore {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

impl InMemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretKeystore for InMemoryKeystore {
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
