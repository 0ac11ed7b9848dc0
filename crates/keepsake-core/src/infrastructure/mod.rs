//! Infrastructure layer
//!
//! Implementations for platform facilities: the OS keyring and device
//! identity.

pub mod device;
pub mod keystore;

pub use device::HostDeviceId;
pub use keystore::{InMemoryKeystore, KeyringKeystore};
