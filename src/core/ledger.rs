//! Ledger mutation engine - keeps wallet balances in step with the
//! transaction log.
//!
//! For every wallet, `current_balance == initial_balance + Σ effects` where an
//! income adds its amount, an expense subtracts it, and a transfer subtracts
//! from the source and adds to a distinct destination. This module is the only
//! place that writes `current_balance` as a consequence of transaction
//! activity.
//!
//! Each operation locks every wallet it may touch (sorted by id, so two
//! operations can never wait on each other in a cycle) before its first read
//! and holds the locks until its last write. Operations on disjoint wallets run
//! concurrently.

use crate::{
    core::repository::{TransactionRepository, WalletRepository, transaction::from_draft, validate_amount},
    errors::{Error, Result},
    models::{NewTransaction, Transaction, TransactionPatch, TransactionType, Wallet},
    store::StoreTransaction,
};
use chrono::Utc;
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

/// Signed balance changes a transaction applies, one entry per wallet side.
///
/// A transfer whose destination is absent or equal to its source has no effect.
#[must_use]
pub fn balance_effects(transaction: &Transaction) -> Vec<(String, i64)> {
    let amount = transaction.amount;
    match transaction.transaction_type {
        TransactionType::Income => vec![(transaction.wallet_id.clone(), amount)],
        TransactionType::Expense => vec![(transaction.wallet_id.clone(), amount.saturating_neg())],
        TransactionType::Transfer => match &transaction.to_wallet_id {
            Some(to) if *to != transaction.wallet_id => vec![
                (transaction.wallet_id.clone(), amount.saturating_neg()),
                (to.clone(), amount),
            ],
            _ => Vec::new(),
        },
    }
}

/// A balance adjustment that could not be applied because its wallet is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// The missing wallet
    pub wallet_id: String,
    /// Change that would have been applied to it
    pub delta: i64,
}

/// Result of a ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerOutcome {
    /// The transaction as persisted (for a delete, as it was before removal)
    pub transaction: Transaction,
    /// Adjustments skipped because the wallet does not exist
    pub skipped: Vec<DanglingReference>,
}

/// A wallet whose stored balance disagrees with its transaction log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDrift {
    /// Wallet id
    pub wallet_id: String,
    /// `current_balance` as stored
    pub stored: i64,
    /// `initial_balance` plus every effect in the log
    pub expected: i64,
}

/// One async mutex per wallet id, created on first use.
#[derive(Debug, Clone, Default)]
pub struct WalletLocks {
    inner: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

/// Held locks; released on drop.
#[derive(Debug)]
pub struct WalletGuards {
    ids: BTreeSet<String>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl WalletGuards {
    /// Whether every id in `ids` is covered by these guards.
    fn covers<'a>(&self, mut ids: impl Iterator<Item = &'a String>) -> bool {
        ids.all(|id| self.ids.contains(id))
    }
}

impl WalletLocks {
    /// Locks every wallet in `ids`, in sorted order.
    pub async fn acquire(&self, ids: BTreeSet<String>) -> WalletGuards {
        let mutexes: Vec<Arc<tokio::sync::Mutex<()>>> = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            ids.iter()
                .map(|id| Arc::clone(map.entry(id.clone()).or_default()))
                .collect()
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }
        WalletGuards {
            ids,
            _guards: guards,
        }
    }
}

/// Wallet ids a transaction (or draft) can touch.
fn wallet_ids(wallet_id: &str, to_wallet_id: Option<&str>) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    ids.insert(wallet_id.to_string());
    if let Some(to) = to_wallet_id {
        ids.insert(to.to_string());
    }
    ids
}

fn touched(transaction: &Transaction) -> BTreeSet<String> {
    wallet_ids(&transaction.wallet_id, transaction.to_wallet_id.as_deref())
}

/// Wallet rows an operation will write, and the adjustments it had to skip.
#[derive(Debug, Default)]
struct BalancePlan {
    wallets: BTreeMap<String, Wallet>,
    missing: BTreeSet<String>,
    skipped: Vec<DanglingReference>,
}

impl BalancePlan {
    /// Adds `sign * effect` for each side of `transaction` to the planned
    /// balances, reading each wallet the first time it is touched.
    async fn push(&mut self, txn: &StoreTransaction, transaction: &Transaction, sign: i64) -> Result<()> {
        for (wallet_id, effect) in balance_effects(transaction) {
            let delta = effect
                .checked_mul(sign)
                .ok_or_else(|| overflow(&wallet_id))?;

            if !self.wallets.contains_key(&wallet_id) && !self.missing.contains(&wallet_id) {
                match txn.get::<Wallet>(&wallet_id).await? {
                    Some(wallet) => {
                        self.wallets.insert(wallet_id.clone(), wallet);
                    }
                    None => {
                        self.missing.insert(wallet_id.clone());
                    }
                }
            }
            let Some(wallet) = self.wallets.get_mut(&wallet_id) else {
                warn!(
                    "Wallet {} referenced by transaction {} does not exist, skipping {}",
                    wallet_id, transaction.id, delta
                );
                self.skipped.push(DanglingReference { wallet_id, delta });
                continue;
            };

            let balance = wallet
                .current_balance
                .checked_add(delta)
                .ok_or_else(|| overflow(&wallet_id))?;
            debug!("Wallet {} balance {} -> {}", wallet_id, wallet.current_balance, balance);
            wallet.current_balance = balance;
        }
        Ok(())
    }

    /// Writes every planned wallet with a fresh `updated_at`.
    async fn write(self, txn: &StoreTransaction) -> Result<Vec<DanglingReference>> {
        let now = Utc::now();
        for mut wallet in self.wallets.into_values() {
            wallet.updated_at = now;
            txn.put(&wallet).await?;
        }
        Ok(self.skipped)
    }
}

fn overflow(wallet_id: &str) -> Error {
    Error::BalanceOverflow {
        wallet_id: wallet_id.to_string(),
    }
}

/// Commits `txn` if `result` is `Ok`, otherwise rolls it back and returns the error.
async fn finish<T>(txn: StoreTransaction, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}

/// Creates, edits and deletes transactions together with their balance effects.
///
/// Every new balance is computed before the first write, and the transaction
/// row and its wallet rows are written in one store transaction: either all of
/// them change or none do.
#[derive(Debug, Clone)]
pub struct Ledger {
    wallets: WalletRepository,
    transactions: TransactionRepository,
    locks: WalletLocks,
}

impl Ledger {
    /// Builds a ledger over the given repositories with a fresh lock registry.
    #[must_use]
    pub fn new(wallets: WalletRepository, transactions: TransactionRepository) -> Self {
        Self {
            wallets,
            transactions,
            locks: WalletLocks::default(),
        }
    }

    /// The lock registry, shared with anything else that must serialize
    /// against balance writes.
    #[must_use]
    pub const fn locks(&self) -> &WalletLocks {
        &self.locks
    }

    /// Persists a new transaction and applies its effect to the wallet(s).
    ///
    /// # Errors
    /// [`Error::InvalidAmount`] for a negative amount and
    /// [`Error::BalanceOverflow`] if a balance would leave the `i64` range.
    /// Nothing is stored in either case.
    pub async fn create_transaction(&self, draft: NewTransaction) -> Result<LedgerOutcome> {
        validate_amount(draft.amount)?;
        let _guards = self
            .locks
            .acquire(wallet_ids(&draft.wallet_id, draft.to_wallet_id.as_deref()))
            .await;

        let transaction = from_draft(draft);
        let txn = self.transactions.store().begin().await?;
        let result = async {
            let mut plan = BalancePlan::default();
            plan.push(&txn, &transaction, 1).await?;
            let stored = txn.add(&transaction).await?;
            let skipped = plan.write(&txn).await?;
            Ok::<_, Error>(LedgerOutcome {
                transaction: stored,
                skipped,
            })
        }
        .await;
        let outcome = finish(txn, result).await?;

        info!(
            "Created {} transaction {} of {}",
            outcome.transaction.transaction_type, outcome.transaction.id, outcome.transaction.amount
        );
        Ok(outcome)
    }

    /// Applies `patch` to a stored transaction, first reversing the old effect
    /// and then applying the new one. `None` if the transaction does not exist.
    pub async fn update_transaction(
        &self,
        id: &str,
        patch: TransactionPatch,
    ) -> Result<Option<LedgerOutcome>> {
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }

        let Some(mut before) = self.transactions.get_by_id(id).await? else {
            return Ok(None);
        };

        // The stored row may move to other wallets while we wait for locks, so
        // re-read under the locks and retry if the wallet set grew.
        let (_guards, before, mut after) = loop {
            let mut after = before.clone();
            patch.clone().apply(&mut after);
            let ids: BTreeSet<String> = touched(&before).union(&touched(&after)).cloned().collect();
            let guards = self.locks.acquire(ids).await;

            let Some(current) = self.transactions.get_by_id(id).await? else {
                return Ok(None);
            };
            let mut after = current.clone();
            patch.clone().apply(&mut after);
            if guards.covers(touched(&current).iter().chain(touched(&after).iter())) {
                break (guards, current, after);
            }
            debug!("Transaction {} moved wallets while locking, retrying", id);
            before = current;
        };
        after.updated_at = Utc::now();

        let txn = self.transactions.store().begin().await?;
        let result = async {
            let mut plan = BalancePlan::default();
            plan.push(&txn, &before, -1).await?;
            plan.push(&txn, &after, 1).await?;
            let stored = txn.put(&after).await?;
            let skipped = plan.write(&txn).await?;
            Ok::<_, Error>(LedgerOutcome {
                transaction: stored,
                skipped,
            })
        }
        .await;
        let outcome = finish(txn, result).await?;

        info!("Updated transaction {}", outcome.transaction.id);
        Ok(Some(outcome))
    }

    /// Reverses the stored transaction's effect and removes it.
    /// `None` if it does not exist.
    pub async fn delete_transaction(&self, id: &str) -> Result<Option<LedgerOutcome>> {
        let Some(mut snapshot) = self.transactions.get_by_id(id).await? else {
            return Ok(None);
        };

        let (_guards, transaction) = loop {
            let guards = self.locks.acquire(touched(&snapshot)).await;
            let Some(current) = self.transactions.get_by_id(id).await? else {
                return Ok(None);
            };
            if guards.covers(touched(&current).iter()) {
                break (guards, current);
            }
            snapshot = current;
        };

        let txn = self.transactions.store().begin().await?;
        let result = async {
            let mut plan = BalancePlan::default();
            plan.push(&txn, &transaction, -1).await?;
            txn.delete::<Transaction>(id).await?;
            let skipped = plan.write(&txn).await?;
            Ok::<_, Error>(skipped)
        }
        .await;
        let skipped = finish(txn, result).await?;

        info!("Deleted transaction {}", id);
        Ok(Some(LedgerOutcome {
            transaction,
            skipped,
        }))
    }

    /// Balance the wallet should have according to its transaction log alone.
    /// `None` if the wallet does not exist.
    ///
    /// # Errors
    /// [`Error::BalanceOverflow`] if the sum leaves the `i64` range.
    pub async fn recompute_balance(&self, wallet_id: &str) -> Result<Option<i64>> {
        let Some(wallet) = self.wallets.get_by_id(wallet_id).await? else {
            return Ok(None);
        };
        let transactions = self.transactions.get_touching_wallet(wallet_id).await?;
        expected_balance(&wallet, &transactions).map(Some)
    }

    /// Every wallet, active or not, whose stored balance differs from its log.
    ///
    /// # Errors
    /// [`Error::BalanceOverflow`] if a wallet's expected balance leaves the
    /// `i64` range.
    pub async fn audit(&self) -> Result<Vec<BalanceDrift>> {
        let transactions = self.transactions.get_all().await?;
        let mut drift = Vec::new();
        for wallet in self.wallets.get_all_with_inactive().await? {
            let expected = expected_balance(&wallet, &transactions)?;
            if expected != wallet.current_balance {
                drift.push(BalanceDrift {
                    wallet_id: wallet.id,
                    stored: wallet.current_balance,
                    expected,
                });
            }
        }
        if !drift.is_empty() {
            warn!("Balance audit found {} drifting wallet(s)", drift.len());
        }
        Ok(drift)
    }
}

/// Sets each wallet's current balance to its initial balance plus the net
/// effect of `transactions`. Used when building datasets outside the ledger.
pub fn settle_balances(wallets: &mut [Wallet], transactions: &[Transaction]) -> Result<()> {
    for wallet in wallets {
        wallet.current_balance = expected_balance(wallet, transactions)?;
    }
    Ok(())
}

fn expected_balance(wallet: &Wallet, transactions: &[Transaction]) -> Result<i64> {
    transactions
        .iter()
        .flat_map(balance_effects)
        .filter(|(id, _)| *id == wallet.id)
        .try_fold(wallet.initial_balance, |total, (_, delta)| total.checked_add(delta))
        .ok_or_else(|| overflow(&wallet.id))
}
