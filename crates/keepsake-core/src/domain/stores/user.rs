//! User session store.
//!
//! Persists the signed-in user and login flag across restarts so a
//! restart lands the user back in their session. Application code drives
//! this store from auth-provider events; the store itself never talks to
//! the auth provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::registry::ResettableStore;
use crate::domain::store::PersistedStore;
use crate::error::Result;
use crate::storage::SerializedStore;

/// Storage name for the user session document.
pub const USER_STORAGE: &str = "user-storage";

/// The signed-in user's identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// User session state: the current user (if any) and the login flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    pub user: Option<UserProfile>,
    pub is_logged_in: bool,
}

/// User session domain store.
pub struct UserStore {
    inner: PersistedStore<UserState>,
}

impl UserStore {
    pub async fn hydrate(adapter: SerializedStore) -> Self {
        Self {
            inner: PersistedStore::hydrate(USER_STORAGE, adapter).await,
        }
    }

    /// Current session state.
    pub async fn snapshot(&self) -> UserState {
        self.inner.snapshot().await
    }

    /// Set the user and mark the session logged in.
    pub async fn login(&self, user: UserProfile) -> Result<()> {
        self.inner
            .update(|state| {
                state.user = Some(user);
                state.is_logged_in = true;
            })
            .await
    }

    /// Clear the user and the login flag.
    pub async fn logout(&self) -> Result<()> {
        self.inner
            .update(|state| {
                state.user = None;
                state.is_logged_in = false;
            })
            .await
    }

    /// Update the user record without touching the login flag.
    pub async fn set_user(&self, user: Option<UserProfile>) -> Result<()> {
        self.inner.update(|state| state.user = user).await
    }
}

#[async_trait]
impl ResettableStore for UserStore {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn reset(&self) -> Result<()> {
        self.inner.reset().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::security::MasterKey;
    use crate::storage::{Database, EncryptedStore};

    fn profile() -> UserProfile {
        UserProfile {
            id: "1".to_string(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
        }
    }

    async fn test_store() -> UserStore {
        let db = Database::in_memory().await.expect("in-memory database");
        let adapter = SerializedStore::new(EncryptedStore::new(&db, MasterKey::generate()));
        UserStore::hydrate(adapter).await
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let store = test_store().await;

        store.login(profile()).await.unwrap();
        let state = store.snapshot().await;
        assert_eq!(state.user, Some(profile()));
        assert!(state.is_logged_in);

        store.logout().await.unwrap();
        let state = store.snapshot().await;
        assert_eq!(state.user, None);
        assert!(!state.is_logged_in);
    }

    #[tokio::test]
    async fn test_set_user_preserves_login_flag() {
        let store = test_store().await;

        store.login(profile()).await.unwrap();

        let updated = UserProfile {
            name: "B".to_string(),
            ..profile()
        };
        store.set_user(Some(updated.clone())).await.unwrap();

        let state = store.snapshot().await;
        assert_eq!(state.user, Some(updated));
        assert!(state.is_logged_in, "set_user must not touch the login flag");
    }

    #[tokio::test]
    async fn test_initial_state() {
        let store = test_store().await;
        let state = store.snapshot().await;
        assert_eq!(state, UserState::default());
        assert!(state.user.is_none());
        assert!(!state.is_logged_in);
    }
}
