//! Application context
//!
//! [`AppState`] is the single constructed object that owns every domain
//! store, replacing module-level singletons: initialization order is
//! explicit, and consumers receive the context (or individual stores) by
//! injection, which keeps each piece testable in isolation.

use std::sync::Arc;

use anyhow::Result as AnyResult;

use crate::config::Config;
use crate::domain::registry::StoreRegistry;
use crate::domain::security::{DeviceIdSource, KeyProvider, KeySource, SecretKeystore};
use crate::domain::stores::{AppDataStore, ScratchStore, SettingsStore, UserStore};
use crate::error::Result;
use crate::infrastructure::{HostDeviceId, KeyringKeystore};
use crate::storage::{Database, DatabaseConfig, EncryptedStore, SerializedStore};

/// Top-level application state context.
///
/// Construction sequences the layers: the encryption key is provisioned
/// and awaited first, then the database opens and migrates, then each
/// domain store hydrates, and finally every store is registered for
/// coordinated reset. No storage operation can race key resolution.
pub struct AppState {
    user: Arc<UserStore>,
    settings: Arc<SettingsStore>,
    app_data: Arc<AppDataStore>,
    scratch: Arc<ScratchStore>,
    registry: StoreRegistry,
    adapter: SerializedStore,
    database: Database,
    key_source: KeySource,
}

impl AppState {
    /// Initialize with the OS keyring and host device identity.
    pub async fn init(config: &Config) -> AnyResult<Self> {
        let keystore = Arc::new(KeyringKeystore::with_service(&config.keystore.service));
        let device_id = Arc::new(HostDeviceId::new());
        Self::init_with(
            DatabaseConfig::with_path(config.database_path()),
            keystore,
            device_id,
        )
        .await
    }

    /// Initialize with injected platform collaborators.
    ///
    /// Tests pass an in-memory keystore and a fixed device id here.
    pub async fn init_with(
        db_config: DatabaseConfig,
        keystore: Arc<dyn SecretKeystore>,
        device_id: Arc<dyn DeviceIdSource>,
    ) -> AnyResult<Self> {
        let provisioned = KeyProvider::new(keystore, device_id).get_or_create().await;
        if !provisioned.source.is_secure() {
            tracing::warn!(
                key_source = %provisioned.source,
                "Running on a degraded encryption key"
            );
        }
        let key_source = provisioned.source;

        let database = Database::new(db_config).await?;
        let adapter = SerializedStore::new(EncryptedStore::new(&database, provisioned.key));

        let user = Arc::new(UserStore::hydrate(adapter.clone()).await);
        let settings = Arc::new(SettingsStore::hydrate(adapter.clone()).await);
        let app_data = Arc::new(AppDataStore::hydrate(adapter.clone()).await);
        let scratch = Arc::new(ScratchStore::new());

        // Every domain subject to coordinated reset registers here. A
        // domain added later but not registered is excluded from
        // reset_all and will retain stale state.
        let mut registry = StoreRegistry::new();
        registry.register(user.clone());
        registry.register(settings.clone());
        registry.register(app_data.clone());
        registry.register(scratch.clone());

        tracing::info!(
            key_source = %key_source,
            domains = ?registry.names(),
            "Application state initialized"
        );

        Ok(Self {
            user,
            settings,
            app_data,
            scratch,
            registry,
            adapter,
            database,
            key_source,
        })
    }

    /// User session store.
    pub fn user(&self) -> &Arc<UserStore> {
        &self.user
    }

    /// Settings store.
    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    /// Sync metadata store.
    pub fn app_data(&self) -> &Arc<AppDataStore> {
        &self.app_data
    }

    /// Ephemeral scratch store.
    pub fn scratch(&self) -> &Arc<ScratchStore> {
        &self.scratch
    }

    /// Provenance of the encryption key this context was opened with.
    pub fn key_source(&self) -> KeySource {
        self.key_source
    }

    /// Names of every registered domain.
    pub fn domains(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Reset every registered domain store to its declared initial state.
    pub async fn reset_all(&self) -> Result<()> {
        self.registry.reset_all().await
    }

    /// Wipe the encrypted store wholesale.
    ///
    /// Unlike [`reset_all`](Self::reset_all) this does not touch in-memory
    /// state; it exists for storage-level maintenance (e.g. before an
    /// uninstall). Prefer `reset_all` for user-facing resets.
    pub async fn clear_storage(&self) -> Result<()> {
        self.adapter.raw().clear_all().await
    }
}
