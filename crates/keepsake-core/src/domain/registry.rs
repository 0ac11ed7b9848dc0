//! Store registry and coordinated reset.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// A domain store that can restore its declared initial state.
///
/// Reset goes through each store's own state-replacement path, never a raw
/// storage wipe, so a domain's custom initial-state logic is never
/// bypassed.
#[async_trait]
pub trait ResettableStore: Send + Sync {
    /// The domain's name, for logging and registry listings.
    fn name(&self) -> &'static str;

    /// Restore the initial state, in memory and (for persisted domains) on
    /// disk.
    async fn reset(&self) -> Result<()>;
}

/// Registry of every domain store subject to coordinated reset.
///
/// Contract: every persisted domain store must be registered exactly once.
/// An unregistered domain is never reset and will silently retain stale
/// state after `reset_all` — registering new domains is part of adding
/// them, not an optimization.
#[derive(Default)]
pub struct StoreRegistry {
    stores: Vec<Arc<dyn ResettableStore>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a domain store for coordinated reset.
    pub fn register(&mut self, store: Arc<dyn ResettableStore>) {
        self.stores.push(store);
    }

    /// Names of every registered domain, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stores.iter().map(|s| s.name()).collect()
    }

    /// Reset every registered domain to its initial state.
    ///
    /// Every store is visited even if an earlier one fails; the first
    /// error is returned after the sweep completes.
    pub async fn reset_all(&self) -> Result<()> {
        let mut first_error: Option<Error> = None;

        for store in &self.stores {
            if let Err(e) = store.reset().await {
                tracing::error!(domain = %store.name(), error = %e, "Failed to reset domain store");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            } else {
                tracing::debug!(domain = %store.name(), "Reset domain store");
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::info!(domains = self.stores.len(), "Reset all registered stores");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingStore {
        name: &'static str,
        resets: AtomicU32,
        fail: bool,
    }

    impl CountingStore {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                resets: AtomicU32::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl ResettableStore for CountingStore {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn reset(&self) -> Result<()> {
            self.resets.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Crypto("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_reset_all_visits_every_store() {
        let a = CountingStore::new("a", false);
        let b = CountingStore::new("b", false);

        let mut registry = StoreRegistry::new();
        registry.register(a.clone());
        registry.register(b.clone());

        registry.reset_all().await.unwrap();

        assert_eq!(a.resets.load(Ordering::SeqCst), 1);
        assert_eq!(b.resets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_all_continues_past_failures() {
        let a = CountingStore::new("a", true);
        let b = CountingStore::new("b", false);

        let mut registry = StoreRegistry::new();
        registry.register(a.clone());
        registry.register(b.clone());

        let result = registry.reset_all().await;

        assert!(result.is_err());
        assert_eq!(b.resets.load(Ordering::SeqCst), 1, "later stores still reset");
    }

    #[tokio::test]
    async fn test_names_in_registration_order() {
        let mut registry = StoreRegistry::new();
        registry.register(CountingStore::new("first", false));
        registry.register(CountingStore::new("second", false));

        assert_eq!(registry.names(), vec!["first", "second"]);
    }
}
