//! Security domain module
//!
//! Provisions the storage encryption key that the encrypted store is opened
//! with.
//!
//! # Architecture
//!
//! - **Key material**: `MasterKey`, `ProvisionedKey`, `KeySource`
//! - **Collaborator traits**: `SecretKeystore`, `DeviceIdSource`
//! - **Service**: `KeyProvider` implementing the get-or-create protocol
//!
//! # Key lifecycle
//!
//! The key is created once per install, read back on every startup, and
//! never rotated. Keystore failures degrade the key's provenance rather
//! than failing startup: a rejected write yields a session-only key, and a
//! wholly unavailable keystore yields a weaker key derived from the device
//! identifier. Callers can distinguish these via [`KeySource`].

pub mod key;
pub mod keystore;
pub mod provider;

pub use key::{KeyError, KeySource, MasterKey, ProvisionedKey};
pub use keystore::{DeviceIdSource, SecretKeystore};
pub use provider::{KeyProvider, KEY_STORAGE_NAME};
