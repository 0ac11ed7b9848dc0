//! Key material types for the storage encryption key.
//!
//! The encrypted store is keyed by a single AES-256 master key whose
//! lifecycle (create once per install, read on every startup, never rotated)
//! is managed by [`KeyProvider`](super::provider::KeyProvider).

use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Errors that can occur while provisioning or decoding the master key.
///
/// These never escape the key provider: every provisioning failure is
/// recovered locally and logged, and `get_or_create` always returns a key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Keystore error: {0}")]
    Keystore(String),

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid key format: {0}")]
    InvalidFormat(String),
}

/// The storage encryption key, securely zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
}

impl MasterKey {
    /// Generate a new random master key
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; KEY_SIZE];
        aes_gcm::aead::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create a master key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_SIZE {
            return Err(KeyError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Create a master key from hex-encoded string
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex).map_err(|e| KeyError::InvalidFormat(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Derive a master key by hashing arbitrary entropy material.
    ///
    /// Used both for fresh key synthesis (device id + timestamp + random
    /// bytes) and for the deterministic device-derived fallback.
    pub fn derive(material: &[u8]) -> Self {
        let digest = Sha256::digest(material);
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&digest);
        Self { bytes }
    }

    /// Export key as hex string (for storage in the keystore)
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Get the raw key bytes (use carefully)
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Where the returned key came from.
///
/// Callers that care about the security level of the current key (for
/// example to warn the user when running on a degraded key) match on this
/// instead of inspecting the key itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Read back from the secure keystore; the normal steady state.
    Keystore,
    /// Freshly generated this run and persisted to the keystore.
    GeneratedStored,
    /// Freshly generated this run, but the keystore write failed. The key is
    /// valid for this session only; data written under it may become
    /// unreadable once a later run generates a different key.
    GeneratedUnstored,
    /// The keystore API is unavailable on this platform. The key is derived
    /// deterministically from the device identifier alone: stable across
    /// runs, but with reduced security compared to a keystore-held key.
    DeviceDerived,
}

impl KeySource {
    /// Whether the key is held by the secure keystore.
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Keystore | Self::GeneratedStored)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keystore => "keystore",
            Self::GeneratedStored => "generated-stored",
            Self::GeneratedUnstored => "generated-unstored",
            Self::DeviceDerived => "device-derived",
        }
    }
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A provisioned master key together with its provenance.
#[derive(Debug, Clone)]
pub struct ProvisionedKey {
    pub key: MasterKey,
    pub source: KeySource,
}
