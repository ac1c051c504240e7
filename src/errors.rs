//! Unified error types for the ledger engine.
//!
//! Only structural failures live here. Expected conditions (a missing id, an
//! offline remote, a transaction pointing at a wallet that no longer exists)
//! are modelled as `Option`/`bool` results or reported in outcome structs.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any error reported by the database driver
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The embedded store could not be opened, or no store is attached
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Why the store is unusable
        message: String,
    },

    /// An insert collided with an existing id. Always a bug in identity generation.
    #[error("Duplicate key '{id}' in table '{table}'")]
    DuplicateKey {
        /// Table the insert targeted
        table: &'static str,
        /// The colliding id
        id: String,
    },

    /// Amounts are non-negative magnitudes in minor units
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// A wallet balance would leave the `i64` range
    #[error("Balance of wallet '{wallet_id}' overflows")]
    BalanceOverflow {
        /// The wallet whose balance could not be computed
        wallet_id: String,
    },

    /// A debt amount would leave the `i64` range
    #[error("Amount of debt '{debt_id}' overflows")]
    DebtOverflow {
        /// The debt whose amount could not be computed
        debt_id: String,
    },

    /// A persisted epoch column does not map to a representable date
    #[error("Invalid stored timestamp: {millis}")]
    InvalidTimestamp {
        /// Raw epoch milliseconds read from the row
        millis: i64,
    },

    /// A stored enum column holds a value outside its domain
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnumValue {
        /// Field being decoded
        field: &'static str,
        /// The offending raw value
        value: String,
    },

    /// A remote snapshot could not be converted into domain values
    #[error("Malformed snapshot: {message}")]
    MalformedSnapshot {
        /// What was wrong with the payload
        message: String,
    },

    /// JSON encoding of a stored column failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a [`Error::StoreUnavailable`] from any displayable cause.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
