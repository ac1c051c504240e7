//! Shared test utilities.
//!
//! Helpers for in-memory stores and drafts with sensible defaults, so tests
//! only spell out the fields they care about.

use crate::{
    errors::Result,
    models::{
        CategoryType, DebtDirection, DebtStatus, NewCategory, NewDebt, NewTransaction, NewWallet,
        TransactionType, Wallet, WalletKind,
    },
    store::EntityStore,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// An [`EntityStore`] over a fresh in-memory database.
pub async fn setup_test_store() -> Result<EntityStore> {
    Ok(EntityStore::new(setup_test_db().await?))
}

/// Midnight UTC on the given day.
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A fully populated wallet value, for store-level tests that bypass the repositories.
pub fn sample_wallet(id: &str, balance: i64) -> Wallet {
    let at = date(2026, 1, 1);
    Wallet {
        id: id.to_string(),
        name: format!("Wallet {id}"),
        currency: "UZS".to_string(),
        kind: WalletKind::Card,
        initial_balance: balance,
        current_balance: balance,
        icon: None,
        color: None,
        group: None,
        order: None,
        active: true,
        created_at: at,
        updated_at: at,
    }
}

/// Wallet draft with the given opening balance.
///
/// # Defaults
/// * currency: `UZS`
/// * kind: card
/// * active: true
pub fn new_wallet(name: &str, balance: i64) -> NewWallet {
    NewWallet {
        name: name.to_string(),
        currency: "UZS".to_string(),
        kind: WalletKind::Card,
        initial_balance: balance,
        current_balance: balance,
        icon: None,
        color: None,
        group: None,
        order: None,
        active: true,
    }
}

/// Transaction draft dated 2026-01-10 with no category, note or tags.
pub fn new_transaction(
    transaction_type: TransactionType,
    amount: i64,
    wallet_id: &str,
) -> NewTransaction {
    NewTransaction {
        transaction_type,
        amount,
        currency: "UZS".to_string(),
        wallet_id: wallet_id.to_string(),
        to_wallet_id: None,
        category_id: None,
        note: None,
        tags: Vec::new(),
        date_time: date(2026, 1, 10),
    }
}

/// Transfer draft from `from` to `to`.
pub fn new_transfer(amount: i64, from: &str, to: &str) -> NewTransaction {
    NewTransaction {
        to_wallet_id: Some(to.to_string()),
        ..new_transaction(TransactionType::Transfer, amount, from)
    }
}

/// Expense category draft.
pub fn new_category(name: &str) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        category_type: CategoryType::Expense,
        icon: None,
        color: None,
        archived: false,
        order: None,
    }
}

/// Open debt draft in UZS.
pub fn new_debt(counterparty: &str, amount: i64, direction: DebtDirection) -> NewDebt {
    NewDebt {
        counterparty: counterparty.to_string(),
        amount,
        currency: "UZS".to_string(),
        direction,
        due_date: None,
        note: None,
        status: DebtStatus::Open,
    }
}
