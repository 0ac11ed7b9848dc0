//! Keepsake Core Library
//!
//! Encrypted local state persistence for applications that need their
//! session, settings and sync metadata to survive process restarts:
//! - Key provisioning (OS keyring with explicit degraded fallbacks)
//! - Encrypted SQLite key-value storage (AES-256-GCM at rest)
//! - JSON document adapter
//! - Typed domain stores with write-through in-memory caches
//! - Coordinated reset across every registered domain
//! - Error-report and auth-provider boundary contracts

pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod report;
pub mod storage;

pub use application::AppState;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::application::AppState;
    pub use crate::config::Config;
    pub use crate::domain::security::KeySource;
    pub use crate::domain::stores::{
        AppDataState, SettingsState, Theme, UserProfile, UserState,
    };
    pub use crate::error::{Error, Result};
}
