//! Application settings loaded from `ledger.toml`.
//!
//! Every key is optional. The file itself is optional: a missing file yields
//! the defaults. `DATABASE_URL` in the environment overrides the file.

use super::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Settings file read when `LEDGER_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "ledger.toml";

/// Whole settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SeaORM connection string of the local store
    pub database_url: String,
    /// Populate an empty store with the demo dataset on startup
    pub seed_demo_data: bool,
    /// Remote snapshot settings
    pub sync: SyncSettings,
}

/// `[sync]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Initial connectivity; offline skips the pull entirely
    pub online: bool,
    /// Simulated latency of the mock remote, in milliseconds
    pub remote_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            seed_demo_data: true,
            sync: SyncSettings::default(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            online: true,
            remote_delay_ms: 400,
        }
    }
}

/// Parses settings from a TOML string.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is invalid or a key has the wrong type.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })
}

/// Loads settings from a TOML file. A missing file yields the defaults.
///
/// # Errors
/// [`Error::Io`] if the file exists but cannot be read, [`Error::Config`]
/// if it cannot be parsed.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    debug!("Loading settings from {:?}", path);
    let contents = std::fs::read_to_string(path)?;
    parse_settings(&contents)
}

/// Loads settings from `LEDGER_CONFIG` (or `./ledger.toml`) and applies the
/// `DATABASE_URL` override.
pub fn load_app_settings() -> Result<Settings> {
    let path = std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut settings = load_settings(&path)?;

    if let Ok(url) = std::env::var("DATABASE_URL") {
        debug!("DATABASE_URL overrides configured database");
        settings.database_url = url;
    }

    Ok(settings)
}
