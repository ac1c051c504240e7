/// Database connection and table creation
pub mod database;

/// Application settings from `ledger.toml` and the environment
pub mod settings;

pub use settings::{Settings, SyncSettings, load_app_settings};
