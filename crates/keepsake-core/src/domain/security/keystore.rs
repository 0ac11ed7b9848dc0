//! Platform-supplied collaborator traits for key provisioning.
//!
//! The secure keystore and the device identifier are opaque, platform-owned
//! facilities. The traits here are the seams the key provider works against;
//! production implementations live in `infrastructure`.

use async_trait::async_trait;

use super::key::KeyError;

/// Protected storage for small secrets, distinct from the encrypted
/// key-value store this crate builds on top of it.
///
/// Implementations map to the OS credential store (keyring) in production
/// and to an in-memory map in tests.
#[async_trait]
pub trait SecretKeystore: Send + Sync {
    /// Whether the keystore API is usable at all on this platform.
    ///
    /// When this returns `false` the key provider does not attempt any
    /// keystore I/O and falls back to a device-derived key.
    fn available(&self) -> bool {
        true
    }

    /// Read a secret by name. Absent entries are `Ok(None)`.
    async fn get(&self, name: &str) -> Result<Option<String>, KeyError>;

    /// Write a secret under the given name, replacing any existing value.
    async fn set(&self, name: &str, value: &str) -> Result<(), KeyError>;

    /// Delete a secret. Deleting an absent entry is not an error.
    async fn delete(&self, name: &str) -> Result<(), KeyError>;
}

/// Source of a device-unique identifier.
///
/// The identifier feeds key synthesis and the device-derived fallback; it
/// must be stable across restarts of the same install.
pub trait DeviceIdSource: Send + Sync {
    fn unique_device_id(&self) -> String;
}
