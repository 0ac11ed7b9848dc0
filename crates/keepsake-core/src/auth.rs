//! Authentication provider boundary.
//!
//! The remote authentication provider is an external collaborator; this
//! module only fixes its contract. Application code subscribes to the
//! auth-state feed and drives the user session store from it — the
//! persistence layer never calls the provider itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The signed-in identity delivered by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Remote authentication provider contract.
///
/// `subscribe` delivers the current signed-in identity, or `None` when
/// signed out, starting with the present state.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> anyhow::Result<AuthIdentity>;

    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<AuthIdentity>;

    async fn sign_out(&self) -> anyhow::Result<()>;

    fn subscribe(&self) -> watch::Receiver<Option<AuthIdentity>>;
}

/// In-memory provider for tests and local development.
///
/// Accepts any credentials and derives the identity from the email.
pub struct StubAuthProvider {
    state: watch::Sender<Option<AuthIdentity>>,
}

impl Default for StubAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StubAuthProvider {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self { state }
    }

    fn identity_for(email: &str) -> AuthIdentity {
        let name = email.split('@').next().unwrap_or(email).to_string();
        AuthIdentity {
            id: format!("stub-{}", name),
            name,
            email: email.to_string(),
        }
    }
}

#[async_trait]
impl AuthProvider for StubAuthProvider {
    async fn sign_up(&self, email: &str, _password: &str) -> anyhow::Result<AuthIdentity> {
        let identity = Self::identity_for(email);
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, _password: &str) -> anyhow::Result<AuthIdentity> {
        let identity = Self::identity_for(email);
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> anyhow::Result<()> {
        self.state.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthIdentity>> {
        self.state.subscribe()
    }
}
