//! Sync reconciler - replaces the four core tables with a remote snapshot.
//!
//! A pull is a full replace, not a merge. Local edits made since the last pull
//! are never pushed anywhere, so a successful pull discards them. Callers that
//! expose a "sync now" action should treat it as destructive.
//!
//! The pull gives up quietly (returns `Ok(None)`, store untouched) when the
//! host is offline, the remote returns nothing, the payload is malformed, or
//! it carries no wallets. Only store failures are errors.

use crate::{
    errors::{Error, Result},
    models::{
        Category, CategoryType, Debt, DebtDirection, DebtStatus, Transaction, TransactionType,
        Wallet, WalletGroup, WalletKind,
    },
    store::{EntityStore, from_epoch_millis, to_epoch_millis},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tracing::{debug, info, instrument, warn};

/// Key of the last successful pull in the key-value state table.
pub const LAST_SYNC_AT_KEY: &str = "last_sync_at";

/// A complete dataset for the four core collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Wallets
    pub wallets: Vec<Wallet>,
    /// Categories
    pub categories: Vec<Category>,
    /// Transactions
    pub transactions: Vec<Transaction>,
    /// Debts
    pub debts: Vec<Debt>,
}

/// Source of full snapshots. `None` means offline or failed; never partial data.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetches one full snapshot.
    async fn fetch_snapshot(&self) -> Option<RemoteSnapshot>;
}

/// Reports whether the host currently has network access.
pub trait Connectivity: Send + Sync {
    /// True when a pull may be attempted.
    fn is_online(&self) -> bool;
}

/// Connectivity toggled by the host (for example from OS network events).
#[derive(Debug, Default)]
pub struct ConnectivityFlag {
    online: AtomicBool,
}

impl ConnectivityFlag {
    /// Starts in the given state.
    #[must_use]
    pub const fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Records a connectivity change.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

// Wire format: camelCase keys, ISO-8601 date strings, enum values in their
// stored spelling.

/// Snapshot as delivered by the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSnapshot {
    /// Wallets
    #[serde(default)]
    pub wallets: Vec<RemoteWallet>,
    /// Categories
    #[serde(default)]
    pub categories: Vec<RemoteCategory>,
    /// Transactions
    #[serde(default)]
    pub transactions: Vec<RemoteTransaction>,
    /// Debts
    #[serde(default)]
    pub debts: Vec<RemoteDebt>,
}

/// Wallet on the wire.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteWallet {
    pub id: String,
    pub name: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: WalletKind,
    pub initial_balance: i64,
    pub current_balance: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<WalletGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Category on the wire.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCategory {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

/// Transaction on the wire.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub currency: String,
    pub wallet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_wallet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub date_time: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Debt on the wire.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDebt {
    pub id: String,
    #[serde(rename = "personOrEntityName")]
    pub counterparty: String,
    pub amount: i64,
    pub currency: String,
    pub direction: DebtDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: DebtStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// ISO-8601 string to a date at storage precision.
fn parse_date(field: &str, value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| Error::MalformedSnapshot {
        message: format!("{field}: '{value}' is not an ISO-8601 date: {e}"),
    })?;
    from_epoch_millis(to_epoch_millis(parsed.with_timezone(&Utc)))
}

fn parse_opt_date(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_date(field, v)).transpose()
}

/// Storage-precision ISO-8601 rendering used on the wire.
#[must_use]
pub fn to_iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn ensure_unique<'a>(collection: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::MalformedSnapshot {
                message: format!("duplicate id '{id}' in {collection}"),
            });
        }
    }
    Ok(())
}

impl RemoteSnapshot {
    /// Converts the wire payload into domain values.
    ///
    /// # Errors
    /// [`Error::MalformedSnapshot`] for an unparsable date or an id repeated
    /// within one collection.
    pub fn into_snapshot(self) -> Result<Snapshot> {
        ensure_unique("wallets", self.wallets.iter().map(|w| w.id.as_str()))?;
        ensure_unique("categories", self.categories.iter().map(|c| c.id.as_str()))?;
        ensure_unique("transactions", self.transactions.iter().map(|t| t.id.as_str()))?;
        ensure_unique("debts", self.debts.iter().map(|d| d.id.as_str()))?;

        let wallets = self
            .wallets
            .into_iter()
            .map(|w| {
                Ok(Wallet {
                    created_at: parse_date("wallet.createdAt", &w.created_at)?,
                    updated_at: parse_date("wallet.updatedAt", &w.updated_at)?,
                    id: w.id,
                    name: w.name,
                    currency: w.currency,
                    kind: w.kind,
                    initial_balance: w.initial_balance,
                    current_balance: w.current_balance,
                    icon: w.icon,
                    color: w.color,
                    group: w.group,
                    order: w.order,
                    active: w.active,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let categories = self
            .categories
            .into_iter()
            .map(|c| {
                Ok(Category {
                    created_at: parse_date("category.createdAt", &c.created_at)?,
                    updated_at: parse_date("category.updatedAt", &c.updated_at)?,
                    id: c.id,
                    name: c.name,
                    category_type: c.category_type,
                    icon: c.icon,
                    color: c.color,
                    archived: c.archived,
                    order: c.order,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let transactions = self
            .transactions
            .into_iter()
            .map(|t| {
                Ok(Transaction {
                    date_time: parse_date("transaction.dateTime", &t.date_time)?,
                    created_at: parse_date("transaction.createdAt", &t.created_at)?,
                    updated_at: parse_date("transaction.updatedAt", &t.updated_at)?,
                    id: t.id,
                    transaction_type: t.transaction_type,
                    amount: t.amount,
                    currency: t.currency,
                    wallet_id: t.wallet_id,
                    to_wallet_id: t.to_wallet_id,
                    category_id: t.category_id,
                    note: t.note,
                    tags: t.tags,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let debts = self
            .debts
            .into_iter()
            .map(|d| {
                Ok(Debt {
                    due_date: parse_opt_date("debt.dueDate", d.due_date.as_deref())?,
                    created_at: parse_date("debt.createdAt", &d.created_at)?,
                    updated_at: parse_date("debt.updatedAt", &d.updated_at)?,
                    id: d.id,
                    counterparty: d.counterparty,
                    amount: d.amount,
                    currency: d.currency,
                    direction: d.direction,
                    note: d.note,
                    status: d.status,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Snapshot {
            wallets,
            categories,
            transactions,
            debts,
        })
    }
}

impl From<&Snapshot> for RemoteSnapshot {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            wallets: snapshot
                .wallets
                .iter()
                .map(|w| RemoteWallet {
                    id: w.id.clone(),
                    name: w.name.clone(),
                    currency: w.currency.clone(),
                    kind: w.kind,
                    initial_balance: w.initial_balance,
                    current_balance: w.current_balance,
                    icon: w.icon.clone(),
                    color: w.color.clone(),
                    group: w.group,
                    order: w.order,
                    active: w.active,
                    created_at: to_iso(w.created_at),
                    updated_at: to_iso(w.updated_at),
                })
                .collect(),
            categories: snapshot
                .categories
                .iter()
                .map(|c| RemoteCategory {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    category_type: c.category_type,
                    icon: c.icon.clone(),
                    color: c.color.clone(),
                    archived: c.archived,
                    order: c.order,
                    created_at: to_iso(c.created_at),
                    updated_at: to_iso(c.updated_at),
                })
                .collect(),
            transactions: snapshot
                .transactions
                .iter()
                .map(|t| RemoteTransaction {
                    id: t.id.clone(),
                    transaction_type: t.transaction_type,
                    amount: t.amount,
                    currency: t.currency.clone(),
                    wallet_id: t.wallet_id.clone(),
                    to_wallet_id: t.to_wallet_id.clone(),
                    category_id: t.category_id.clone(),
                    note: t.note.clone(),
                    tags: t.tags.clone(),
                    date_time: to_iso(t.date_time),
                    created_at: to_iso(t.created_at),
                    updated_at: to_iso(t.updated_at),
                })
                .collect(),
            debts: snapshot
                .debts
                .iter()
                .map(|d| RemoteDebt {
                    id: d.id.clone(),
                    counterparty: d.counterparty.clone(),
                    amount: d.amount,
                    currency: d.currency.clone(),
                    direction: d.direction,
                    due_date: d.due_date.map(to_iso),
                    note: d.note.clone(),
                    status: d.status,
                    created_at: to_iso(d.created_at),
                    updated_at: to_iso(d.updated_at),
                })
                .collect(),
        }
    }
}

/// Clears the four core tables and inserts `snapshot`, all in one store
/// transaction. On failure the store keeps its previous contents.
pub async fn replace_core_tables(store: &EntityStore, snapshot: &Snapshot) -> Result<()> {
    let txn = store.begin().await?;
    let replaced = async {
        txn.clear::<Wallet>().await?;
        txn.clear::<Category>().await?;
        txn.clear::<Transaction>().await?;
        txn.clear::<Debt>().await?;
        txn.bulk_add(&snapshot.wallets).await?;
        txn.bulk_add(&snapshot.categories).await?;
        txn.bulk_add(&snapshot.transactions).await?;
        txn.bulk_add(&snapshot.debts).await?;
        Ok::<_, Error>(())
    }
    .await;

    match replaced {
        Ok(()) => txn.commit().await,
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

/// Pulls snapshots from a [`RemoteSource`] into the store.
#[derive(Clone)]
pub struct SyncReconciler {
    store: EntityStore,
    remote: Arc<dyn RemoteSource>,
    connectivity: Arc<dyn Connectivity>,
}

impl std::fmt::Debug for SyncReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncReconciler")
            .field("online", &self.connectivity.is_online())
            .finish_non_exhaustive()
    }
}

impl SyncReconciler {
    /// Wires a reconciler to its collaborators.
    #[must_use]
    pub fn new(
        store: EntityStore,
        remote: Arc<dyn RemoteSource>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            store,
            remote,
            connectivity,
        }
    }

    /// Whether a pull would currently be attempted.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Replaces wallets, categories, transactions and debts with the remote
    /// snapshot and records the sync time.
    ///
    /// Returns the stored snapshot, or `None` with the store untouched when no
    /// usable snapshot was available. Any local change not present remotely
    /// is lost.
    #[instrument(skip(self))]
    pub async fn pull(&self) -> Result<Option<Snapshot>> {
        if !self.connectivity.is_online() {
            info!("Offline, skipping sync pull");
            return Ok(None);
        }

        let Some(payload) = self.remote.fetch_snapshot().await else {
            info!("Remote returned no snapshot");
            return Ok(None);
        };

        let snapshot = match payload.into_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring remote snapshot: {}", e);
                return Ok(None);
            }
        };
        if snapshot.wallets.is_empty() {
            info!("Remote snapshot has no wallets, keeping local data");
            return Ok(None);
        }

        replace_core_tables(&self.store, &snapshot).await?;
        self.store
            .set_state_value(LAST_SYNC_AT_KEY, &to_iso(Utc::now()))
            .await?;

        info!(
            "Sync pull replaced local data: {} wallets, {} categories, {} transactions, {} debts",
            snapshot.wallets.len(),
            snapshot.categories.len(),
            snapshot.transactions.len(),
            snapshot.debts.len()
        );
        Ok(Some(snapshot))
    }

    /// Time of the last successful pull. `None` if never synced or unreadable.
    pub async fn last_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        last_sync_at(&self.store).await
    }
}

/// Reads the last-sync marker from `store`.
pub async fn last_sync_at(store: &EntityStore) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = store.get_state_value(LAST_SYNC_AT_KEY).await? else {
        return Ok(None);
    };
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(at) => Ok(Some(at.with_timezone(&Utc))),
        Err(e) => {
            debug!("Unreadable {} marker '{}': {}", LAST_SYNC_AT_KEY, raw, e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{
            remote::remote_account,
            repository::{CategoryRepository, DebtRepository, TransactionRepository},
        },
        store::Record,
        test_utils::{
            init_test_tracing, new_category, new_debt, new_transaction, sample_wallet,
            setup_test_store,
        },
    };

    struct StaticRemote(Option<RemoteSnapshot>);

    #[async_trait]
    impl RemoteSource for StaticRemote {
        async fn fetch_snapshot(&self) -> Option<RemoteSnapshot> {
            self.0.clone()
        }
    }

    fn reconciler(store: &EntityStore, payload: Option<RemoteSnapshot>, online: bool) -> SyncReconciler {
        SyncReconciler::new(
            store.clone(),
            Arc::new(StaticRemote(payload)),
            Arc::new(ConnectivityFlag::new(online)),
        )
    }

    fn demo_payload() -> RemoteSnapshot {
        RemoteSnapshot::from(&remote_account(Utc::now()).unwrap())
    }

    async fn sorted<R: Record>(store: &EntityStore) -> Result<Vec<R>> {
        let mut rows = store.all::<R>().await?;
        rows.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(rows)
    }

    fn by_id<R: Record + Clone>(rows: &[R]) -> Vec<R> {
        let mut rows = rows.to_vec();
        rows.sort_by(|a, b| a.id().cmp(b.id()));
        rows
    }

    #[tokio::test]
    async fn test_pull_replaces_instead_of_merging() -> Result<()> {
        init_test_tracing();
        let store = setup_test_store().await?;
        store.add(&sample_wallet("local", 1_000)).await?;
        CategoryRepository::new(store.clone())
            .create(new_category("Local only"))
            .await?;
        TransactionRepository::new(store.clone())
            .create(new_transaction(TransactionType::Income, 5, "local"))
            .await?;
        DebtRepository::new(store.clone())
            .create(new_debt("Neighbour", 700, DebtDirection::ImOwed))
            .await?;

        let pulled = reconciler(&store, Some(demo_payload()), true)
            .pull()
            .await?
            .unwrap();

        assert!(store.get::<Wallet>("local").await?.is_none());
        assert_eq!(sorted::<Wallet>(&store).await?, by_id(&pulled.wallets));
        assert_eq!(sorted::<Category>(&store).await?, by_id(&pulled.categories));
        assert_eq!(sorted::<Transaction>(&store).await?, by_id(&pulled.transactions));
        assert_eq!(sorted::<Debt>(&store).await?, by_id(&pulled.debts));
        assert_eq!(store.count::<Transaction>().await?, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_pull_records_last_sync_time() -> Result<()> {
        let store = setup_test_store().await?;
        let sync = reconciler(&store, Some(demo_payload()), true);
        assert!(sync.last_sync_at().await?.is_none());

        let before = Utc::now();
        sync.pull().await?;
        let at = sync.last_sync_at().await?.unwrap();
        assert!(at >= before - chrono::Duration::milliseconds(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_offline_pull_leaves_store_alone() -> Result<()> {
        let store = setup_test_store().await?;
        store.add(&sample_wallet("local", 1_000)).await?;
        let sync = reconciler(&store, Some(demo_payload()), false);

        assert!(sync.pull().await?.is_none());
        assert!(store.get::<Wallet>("local").await?.is_some());
        assert!(sync.last_sync_at().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_unusable_payloads_are_ignored() -> Result<()> {
        init_test_tracing();
        let store = setup_test_store().await?;
        store.add(&sample_wallet("local", 1_000)).await?;

        let mut empty = demo_payload();
        empty.wallets.clear();
        let mut bad_date = demo_payload();
        bad_date.transactions[0].date_time = "yesterday".to_string();

        for payload in [None, Some(empty), Some(bad_date)] {
            assert!(reconciler(&store, payload, true).pull().await?.is_none());
        }
        assert_eq!(store.count::<Wallet>().await?, 1);
        assert_eq!(store.count::<Transaction>().await?, 0);
        Ok(())
    }

    #[test]
    fn test_duplicate_ids_are_malformed() {
        let mut payload = demo_payload();
        let first = payload.debts[0].clone();
        payload.debts.push(first);

        let err = payload.into_snapshot().unwrap_err();
        assert!(matches!(err, Error::MalformedSnapshot { .. }));
    }

    #[test]
    fn test_parses_camel_case_payload() {
        let json = r#"{
            "wallets": [{
                "id": "w1", "name": "Main Card", "currency": "UZS", "type": "card",
                "initialBalance": 100, "currentBalance": 80, "active": true,
                "createdAt": "2026-01-01T08:30:00.123456Z", "updatedAt": "2026-01-01T08:30:00Z"
            }],
            "debts": [{
                "id": "d1", "personOrEntityName": "Split", "amount": 5, "currency": "UZS",
                "direction": "IM_OWED", "status": "partial", "dueDate": "2026-03-01T00:00:00+05:00",
                "createdAt": "2026-01-01T00:00:00Z", "updatedAt": "2026-01-01T00:00:00Z"
            }]
        }"#;
        let snapshot = serde_json::from_str::<RemoteSnapshot>(json)
            .unwrap()
            .into_snapshot()
            .unwrap();

        assert!(snapshot.categories.is_empty());
        let wallet = &snapshot.wallets[0];
        assert_eq!(wallet.kind, WalletKind::Card);
        assert_eq!(to_epoch_millis(wallet.created_at) % 1_000, 123);
        let debt = &snapshot.debts[0];
        assert_eq!(debt.counterparty, "Split");
        assert_eq!(debt.status, DebtStatus::Partial);
        assert_eq!(to_iso(debt.due_date.unwrap()), "2026-02-28T19:00:00.000Z");
    }
}
