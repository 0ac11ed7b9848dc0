//! Application settings store.
//!
//! Theme, language and notification preferences, persisted so the app
//! looks the same after a restart.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::registry::ResettableStore;
use crate::domain::store::PersistedStore;
use crate::error::Result;
use crate::storage::SerializedStore;

/// Storage name for the settings document.
pub const SETTINGS_STORAGE: &str = "app-settings-storage";

/// Color theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings state with its declared defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsState {
    pub theme: Theme,
    pub language: String,
    pub notifications: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            language: "en".to_string(),
            notifications: true,
        }
    }
}

/// Settings domain store.
pub struct SettingsStore {
    inner: PersistedStore<SettingsState>,
}

impl SettingsStore {
    pub async fn hydrate(adapter: SerializedStore) -> Self {
        Self {
            inner: PersistedStore::hydrate(SETTINGS_STORAGE, adapter).await,
        }
    }

    pub async fn snapshot(&self) -> SettingsState {
        self.inner.snapshot().await
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.inner.update(|state| state.theme = theme).await
    }

    pub async fn set_language(&self, language: &str) -> Result<()> {
        let language = language.to_string();
        self.inner.update(|state| state.language = language).await
    }

    /// Flip the notifications flag relative to the current state.
    ///
    /// The read-modify-write runs under the store's write lock, so
    /// concurrent toggles cannot lose updates.
    pub async fn toggle_notifications(&self) -> Result<()> {
        self.inner
            .update(|state| state.notifications = !state.notifications)
            .await
    }
}

#[async_trait]
impl ResettableStore for SettingsStore {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn reset(&self) -> Result<()> {
        self.inner.reset().await
    }
}
