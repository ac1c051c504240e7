//! Demo dataset for first launch and for "load demo data".
//!
//! Three wallets, six categories, two months of activity (December 2025 and
//! January 2026) and four debts. Current balances are derived from the
//! seeded transactions so the dataset passes a balance audit.

use super::{
    ledger::settle_balances,
    repository::{DEFAULT_CATEGORIES, new_id},
    sync::{Snapshot, replace_core_tables},
};
use crate::{
    errors::{Error, Result},
    models::{
        Category, Debt, DebtDirection, DebtStatus, Transaction, TransactionType, Wallet,
        WalletGroup, WalletKind,
    },
    store::{EntityStore, from_epoch_millis, to_epoch_millis},
};
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, instrument};

const CURRENCY: &str = "UZS";

/// name, kind, opening balance, icon, colour, group
type DemoWallet = (&'static str, WalletKind, i64, &'static str, &'static str, Option<WalletGroup>);

const DEMO_WALLETS: [DemoWallet; 3] = [
    ("Main Card", WalletKind::Card, 6_088_244, "CreditCard", "#3b82f6", None),
    ("Cash", WalletKind::Cash, 500_000, "Banknote", "#10b981", None),
    ("Savings", WalletKind::Savings, 10_000_000, "PiggyBank", "#f59e0b", Some(WalletGroup::Savings)),
];

const DEMO_CATEGORIES: [&str; 6] = ["Groceries", "Restaurant", "Transport", "Communal", "Credit", "Salary"];

/// type, amount, category, wallet, (year, month, day), note
type DemoTransaction = (TransactionType, i64, &'static str, &'static str, (i32, u32, u32), Option<&'static str>);

const INCOME: TransactionType = TransactionType::Income;
const EXPENSE: TransactionType = TransactionType::Expense;

const DEMO_TRANSACTIONS: [DemoTransaction; 29] = [
    // December 2025
    (INCOME, 8_500_000, "Salary", "Main Card", (2025, 12, 5), Some("Salary December")),
    (INCOME, 500_000, "Salary", "Main Card", (2025, 12, 15), Some("Bonus")),
    (EXPENSE, 1_200_000, "Communal", "Main Card", (2025, 12, 3), Some("Utilities")),
    (EXPENSE, 450_000, "Groceries", "Main Card", (2025, 12, 4), None),
    (EXPENSE, 320_000, "Restaurant", "Main Card", (2025, 12, 7), None),
    (EXPENSE, 180_000, "Transport", "Main Card", (2025, 12, 8), None),
    (EXPENSE, 2_500_000, "Credit", "Main Card", (2025, 12, 10), Some("Loan payment")),
    (EXPENSE, 380_000, "Groceries", "Main Card", (2025, 12, 12), None),
    (EXPENSE, 150_000, "Transport", "Main Card", (2025, 12, 14), None),
    (EXPENSE, 275_000, "Restaurant", "Main Card", (2025, 12, 18), None),
    (EXPENSE, 95_000, "Transport", "Cash", (2025, 12, 20), None),
    (EXPENSE, 520_000, "Groceries", "Main Card", (2025, 12, 22), None),
    (EXPENSE, 1_100_000, "Communal", "Main Card", (2025, 12, 25), Some("Internet + phone")),
    (EXPENSE, 410_000, "Restaurant", "Main Card", (2025, 12, 28), None),
    // January 2026
    (INCOME, 9_000_000, "Salary", "Main Card", (2026, 1, 5), Some("Salary January")),
    (INCOME, 200_000, "Salary", "Cash", (2026, 1, 12), Some("Freelance")),
    (EXPENSE, 1_350_000, "Communal", "Main Card", (2026, 1, 2), Some("Utilities")),
    (EXPENSE, 310_000, "Groceries", "Main Card", (2026, 1, 3), None),
    (EXPENSE, 275_000, "Transport", "Main Card", (2026, 1, 4), None),
    (EXPENSE, 2_800_000, "Credit", "Main Card", (2026, 1, 8), Some("Loan payment")),
    (EXPENSE, 185_000, "Restaurant", "Main Card", (2026, 1, 9), None),
    (EXPENSE, 420_000, "Groceries", "Main Card", (2026, 1, 11), None),
    (EXPENSE, 165_000, "Transport", "Main Card", (2026, 1, 14), None),
    (EXPENSE, 390_000, "Restaurant", "Main Card", (2026, 1, 16), None),
    (EXPENSE, 548_000, "Groceries", "Main Card", (2026, 1, 18), None),
    (EXPENSE, 980_000, "Communal", "Main Card", (2026, 1, 20), Some("Internet + phone")),
    (EXPENSE, 220_000, "Transport", "Main Card", (2026, 1, 22), None),
    (EXPENSE, 305_000, "Restaurant", "Main Card", (2026, 1, 25), None),
    (EXPENSE, 412_000, "Groceries", "Main Card", (2026, 1, 28), None),
];

const DEMO_DEBTS: [(&str, i64, DebtDirection); 4] = [
    ("Split", 3_324_000, DebtDirection::IOwe),
    ("TBC 1", 14_792_000, DebtDirection::IOwe),
    ("TBC 2", 4_312_000, DebtDirection::IOwe),
    ("Work", 5_000_000, DebtDirection::ImOwed),
];

fn midnight((year, month, day): (i32, u32, u32)) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::Config {
            message: format!("invalid demo date {year}-{month:02}-{day:02}"),
        })
}

fn id_by_name<'a>(pairs: &'a [(&'static str, String)], name: &str) -> Result<&'a str> {
    pairs
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| id.as_str())
        .ok_or_else(|| Error::Config {
            message: format!("demo data refers to unknown '{name}'"),
        })
}

/// Builds the demo dataset with fresh ids, stamped at `now`.
///
/// `now` is truncated to storage precision so the returned values equal what
/// a later read from the store yields.
pub fn demo_dataset(now: DateTime<Utc>) -> Result<Snapshot> {
    let now = from_epoch_millis(to_epoch_millis(now))?;

    let mut wallets: Vec<Wallet> = DEMO_WALLETS
        .iter()
        .map(|&(name, kind, balance, icon, color, group)| Wallet {
            id: new_id(),
            name: name.to_string(),
            currency: CURRENCY.to_string(),
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
        })
        .collect();

    let categories: Vec<Category> = DEMO_CATEGORIES
        .iter()
        .filter_map(|name| DEFAULT_CATEGORIES.iter().find(|d| d.name == *name))
        .map(|d| Category {
            id: new_id(),
            name: d.name.to_string(),
            category_type: d.category_type,
            icon: Some(d.icon.to_string()),
            color: Some(d.color.to_string()),
            archived: false,
            order: None,
            created_at: now,
            updated_at: now,
        })
        .collect();

    let wallet_ids: Vec<(&'static str, String)> = DEMO_WALLETS
        .iter()
        .zip(&wallets)
        .map(|(demo, w)| (demo.0, w.id.clone()))
        .collect();
    let category_ids: Vec<(&'static str, String)> = DEMO_CATEGORIES
        .iter()
        .zip(&categories)
        .map(|(name, c)| (*name, c.id.clone()))
        .collect();

    let transactions = DEMO_TRANSACTIONS
        .iter()
        .map(|&(transaction_type, amount, category, wallet, day, note)| {
            Ok(Transaction {
                id: new_id(),
                transaction_type,
                amount,
                currency: CURRENCY.to_string(),
                wallet_id: id_by_name(&wallet_ids, wallet)?.to_string(),
                to_wallet_id: None,
                category_id: Some(id_by_name(&category_ids, category)?.to_string()),
                note: note.map(str::to_string),
                tags: Vec::new(),
                date_time: midnight(day)?,
                created_at: now,
                updated_at: now,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let debts = DEMO_DEBTS
        .iter()
        .map(|&(counterparty, amount, direction)| Debt {
            id: new_id(),
            counterparty: counterparty.to_string(),
            amount,
            currency: CURRENCY.to_string(),
            direction,
            due_date: None,
            note: None,
            status: DebtStatus::Open,
            created_at: now,
            updated_at: now,
        })
        .collect();

    settle_balances(&mut wallets, &transactions)?;

    Ok(Snapshot {
        wallets,
        categories,
        transactions,
        debts,
    })
}

/// Writes the demo dataset into a store that has no wallets yet.
///
/// Returns the written data, or `None` when wallets already exist. Rows in
/// other tables are left alone.
#[instrument(skip(store))]
pub async fn seed_database(store: &EntityStore) -> Result<Option<Snapshot>> {
    let existing = store.count::<Wallet>().await?;
    if existing > 0 {
        debug!("Store already has {} wallets, skipping seed", existing);
        return Ok(None);
    }

    let snapshot = demo_dataset(Utc::now())?;
    let txn = store.begin().await?;
    let inserted = async {
        txn.bulk_add(&snapshot.wallets).await?;
        txn.bulk_add(&snapshot.categories).await?;
        txn.bulk_add(&snapshot.transactions).await?;
        txn.bulk_add(&snapshot.debts).await?;
        Ok::<_, Error>(())
    }
    .await;
    match inserted {
        Ok(()) => txn.commit().await?,
        Err(e) => {
            txn.rollback().await?;
            return Err(e);
        }
    }

    info!(
        "Seeded demo data: {} wallets, {} categories, {} transactions, {} debts",
        snapshot.wallets.len(),
        snapshot.categories.len(),
        snapshot.transactions.len(),
        snapshot.debts.len()
    );
    Ok(Some(snapshot))
}

/// Replaces wallets, categories, transactions and debts with a fresh demo
/// dataset. Subscriptions, goals and preferences are kept.
#[instrument(skip(store))]
pub async fn load_demo_data(store: &EntityStore) -> Result<Snapshot> {
    let snapshot = demo_dataset(Utc::now())?;
    replace_core_tables(store, &snapshot).await?;
    info!("Loaded demo data over existing records");
    Ok(snapshot)
}
