//! Ephemeral scratch store.
//!
//! Memory-only: no hydration, no persistence. Holds transient data (form
//! drafts, intermediate results) that survives only for the process
//! lifetime. The payload is a schema-less JSON value whose shape is
//! defined entirely by the caller.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::registry::ResettableStore;
use crate::error::Result;

/// Registry name for the scratch domain (it has no storage name).
pub const SCRATCH_DOMAIN: &str = "scratch";

/// Ephemeral scratch domain store.
#[derive(Debug, Default)]
pub struct ScratchStore {
    temp_data: RwLock<Option<serde_json::Value>>,
}

impl ScratchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scratch value, if any.
    pub async fn snapshot(&self) -> Option<serde_json::Value> {
        self.temp_data.read().await.clone()
    }

    /// Replace the scratch value. Passing `None` clears it.
    pub async fn set_temp_data(&self, data: Option<serde_json::Value>) {
        *self.temp_data.write().await = data;
    }

    /// Clear the scratch value.
    pub async fn clear(&self) {
        *self.temp_data.write().await = None;
    }
}

#[async_trait]
impl ResettableStore for ScratchStore {
    fn name(&self) -> &'static str {
        SCRATCH_DOMAIN
    }

    async fn reset(&self) -> Result<()> {
        self.clear().await;
        Ok(())
    }
}
