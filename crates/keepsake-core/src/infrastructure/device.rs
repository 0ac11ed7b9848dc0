//! Device identity for key synthesis.

use sha2::{Digest, Sha256};

use crate::domain::security::DeviceIdSource;

/// Device identifier derived from the host name.
///
/// The raw host name is hashed so the identifier is uniform and does not
/// leak the machine name into derived key material verbatim. Stable for as
/// long as the host name is.
#[derive(Debug, Default, Clone)]
pub struct HostDeviceId;

impl HostDeviceId {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceIdSource for HostDeviceId {
    fn unique_device_id(&self) -> String {
        let hostname = gethostname::gethostname();
        let digest = Sha256::digest(hostname.to_string_lossy().as_bytes());
        hex::encode(&digest[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_device_id_is_stable() {
        let source = HostDeviceId::new();
        assert_eq!(source.unique_device_id(), source.unique_device_id());
    }

    #[test]
    fn test_host_device_id_shape() {
        let id = HostDeviceId::new().unique_device_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
