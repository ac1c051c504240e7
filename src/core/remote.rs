//! In-process stand-in for the account backend.
//!
//! Serves a fixed account after a short delay, the way the real endpoint is
//! expected to behave. Can be switched off to simulate an unreachable server.

use super::{
    ledger::settle_balances,
    repository::new_id,
    sync::{RemoteSnapshot, RemoteSource, Snapshot},
};
use crate::{
    errors::{Error, Result},
    models::{
        Category, CategoryType, Debt, DebtDirection, DebtStatus, Transaction, TransactionType,
        Wallet, WalletGroup, WalletKind,
    },
    store::{from_epoch_millis, to_epoch_millis},
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tracing::{debug, warn};

/// Delay applied before every response unless configured otherwise.
pub const DEFAULT_REMOTE_DELAY: Duration = Duration::from_millis(400);

/// Fake remote returning the demo account.
#[derive(Debug)]
pub struct MockRemote {
    delay: Duration,
    reachable: AtomicBool,
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_DELAY)
    }
}

impl MockRemote {
    /// A reachable remote answering after `delay`.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            reachable: AtomicBool::new(true),
        }
    }

    /// Makes later fetches fail (`false`) or succeed (`true`).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteSource for MockRemote {
    async fn fetch_snapshot(&self) -> Option<RemoteSnapshot> {
        tokio::time::sleep(self.delay).await;
        if !self.reachable.load(Ordering::SeqCst) {
            debug!("Mock remote unreachable");
            return None;
        }
        match remote_account(Utc::now()) {
            Ok(snapshot) => Some(RemoteSnapshot::from(&snapshot)),
            Err(e) => {
                warn!("Mock remote could not build its account: {}", e);
                None
            }
        }
    }
}

fn day(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::Config {
            message: format!("invalid remote date {year}-{month:02}-{day:02}"),
        })
}

/// The account served by [`MockRemote`]: three wallets, four categories, five
/// transactions and two open debts, with balances consistent with the log.
pub fn remote_account(now: DateTime<Utc>) -> Result<Snapshot> {
    let now = from_epoch_millis(to_epoch_millis(now))?;

    let wallet = |name: &str, kind, balance, icon: &str, color: &str, group| Wallet {
        id: new_id(),
        name: name.to_string(),
        currency: "UZS".to_string(),
        kind,
        initial_balance: balance,
        current_balance: balance,
        icon: Some(icon.to_string()),
        color: Some(color.to_string()),
        group,
        order: None,
        active: true,
        created_at: now,
        updated_at: now,
    };
    let mut wallets = vec![
        wallet("Main Card", WalletKind::Card, 6_088_244, "CreditCard", "#3b82f6", None),
        wallet("Cash", WalletKind::Cash, 500_000, "Banknote", "#10b981", None),
        wallet(
            "Savings",
            WalletKind::Savings,
            10_000_000,
            "PiggyBank",
            "#f59e0b",
            Some(WalletGroup::Savings),
        ),
    ];

    let category = |name: &str, category_type, icon: &str, color: &str| Category {
        id: new_id(),
        name: name.to_string(),
        category_type,
        icon: Some(icon.to_string()),
        color: Some(color.to_string()),
        archived: false,
        order: None,
        created_at: now,
        updated_at: now,
    };
    let groceries = category("Groceries", CategoryType::Expense, "ShoppingCart", "#60A5FA");
    let restaurant = category("Restaurant", CategoryType::Expense, "UtensilsCrossed", "#6366F1");
    let transport = category("Transport", CategoryType::Expense, "Bus", "#F59E0B");
    let salary = category("Salary", CategoryType::Income, "DollarSign", "#10b981");

    let main_card = wallets[0].id.clone();
    let tx = |transaction_type, amount, category: &Category, date_time, note: Option<&str>| {
        Transaction {
            id: new_id(),
            transaction_type,
            amount,
            currency: "UZS".to_string(),
            wallet_id: main_card.clone(),
            to_wallet_id: None,
            category_id: Some(category.id.clone()),
            note: note.map(str::to_string),
            tags: Vec::new(),
            date_time,
            created_at: now,
            updated_at: now,
        }
    };
    let transactions = vec![
        tx(TransactionType::Income, 8_500_000, &salary, day(2025, 12, 5)?, Some("Salary December")),
        tx(TransactionType::Expense, 450_000, &groceries, day(2025, 12, 4)?, None),
        tx(TransactionType::Expense, 320_000, &restaurant, day(2025, 12, 7)?, None),
        tx(TransactionType::Income, 9_000_000, &salary, day(2026, 1, 5)?, Some("Salary January")),
        tx(TransactionType::Expense, 310_000, &groceries, day(2026, 1, 3)?, None),
    ];

    let debt = |counterparty: &str, amount, direction| Debt {
        id: new_id(),
        counterparty: counterparty.to_string(),
        amount,
        currency: "UZS".to_string(),
        direction,
        due_date: None,
        note: None,
        status: DebtStatus::Open,
        created_at: now,
        updated_at: now,
    };
    let debts = vec![
        debt("Split", 3_324_000, DebtDirection::IOwe),
        debt("Work", 5_000_000, DebtDirection::ImOwed),
    ];

    settle_balances(&mut wallets, &transactions)?;

    Ok(Snapshot {
        wallets,
        categories: vec![groceries, restaurant, transport, salary],
        transactions,
        debts,
    })
}
