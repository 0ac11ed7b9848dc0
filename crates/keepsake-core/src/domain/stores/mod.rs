//! Concrete domain stores.
//!
//! Each store owns one independently named slice of application state.
//! Three persist through the serialized adapter; the scratch store is
//! memory-only.

pub mod app_data;
pub mod scratch;
pub mod settings;
pub mod user;

pub use app_data::{AppDataState, AppDataStore, APP_DATA_STORAGE};
pub use scratch::{ScratchStore, SCRATCH_DOMAIN};
pub use settings::{SettingsState, SettingsStore, Theme, SETTINGS_STORAGE};
pub use user::{UserProfile, UserState, UserStore, USER_STORAGE};
