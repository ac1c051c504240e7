//! Transaction repository.
//!
//! Plain persistence: creating or deleting a transaction here does not touch
//! any wallet balance. Go through [`crate::core::ledger::Ledger`] for that.

use super::{modify, new_id};
use crate::{
    entities::TransactionColumn,
    errors::Result,
    models::{NewTransaction, Transaction, TransactionPatch},
    store::EntityStore,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition};
use tracing::debug;

/// CRUD over the `transactions` table.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    store: EntityStore,
}

impl TransactionRepository {
    /// Creates a repository over `store`.
    #[must_use]
    pub const fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// The store this repository writes to.
    pub(crate) const fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Persists a new transaction with a fresh id and timestamps.
    pub async fn create(&self, draft: NewTransaction) -> Result<Transaction> {
        self.store.add(&from_draft(draft)).await
    }

    /// Every transaction, oldest `date_time` first.
    pub async fn get_all(&self) -> Result<Vec<Transaction>> {
        let mut transactions = self.store.all::<Transaction>().await?;
        sort_by_date(&mut transactions);
        Ok(transactions)
    }

    /// The transaction with this id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Transaction>> {
        self.store.get(id).await
    }

    /// Transactions whose source wallet is `wallet_id`.
    pub async fn get_by_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>> {
        let mut transactions = self
            .store
            .find_where::<Transaction>(TransactionColumn::WalletId.eq(wallet_id))
            .await?;
        sort_by_date(&mut transactions);
        Ok(transactions)
    }

    /// Transactions with `wallet_id` as source or destination.
    pub async fn get_touching_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>> {
        let mut transactions = self
            .store
            .find_where::<Transaction>(
                Condition::any()
                    .add(TransactionColumn::WalletId.eq(wallet_id))
                    .add(TransactionColumn::ToWalletId.eq(wallet_id)),
            )
            .await?;
        sort_by_date(&mut transactions);
        Ok(transactions)
    }

    /// Transactions dated within `[start, end]`, both ends inclusive.
    pub async fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = self
            .store
            .find_between::<Transaction>(TransactionColumn::DateTime, start, end)
            .await?;
        sort_by_date(&mut transactions);
        Ok(transactions)
    }

    /// Transactions filed under `category_id`.
    pub async fn get_by_category(&self, category_id: &str) -> Result<Vec<Transaction>> {
        let mut transactions = self
            .store
            .find_where::<Transaction>(TransactionColumn::CategoryId.eq(category_id))
            .await?;
        sort_by_date(&mut transactions);
        Ok(transactions)
    }

    /// Shallow-merges `patch` into the stored transaction. `None` if it does not exist.
    pub async fn update(&self, id: &str, patch: TransactionPatch) -> Result<Option<Transaction>> {
        modify(&self.store, id, |t: &mut Transaction| patch.apply(t)).await
    }

    /// Hard-deletes the transaction. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self.store.delete::<Transaction>(id).await?;
        debug!("Delete transaction {}: existed={}", id, deleted);
        Ok(deleted)
    }
}

/// The transaction a draft becomes: fresh id, both timestamps set to now.
pub(crate) fn from_draft(draft: NewTransaction) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: new_id(),
        transaction_type: draft.transaction_type,
        amount: draft.amount,
        currency: draft.currency,
        wallet_id: draft.wallet_id,
        to_wallet_id: draft.to_wallet_id,
        category_id: draft.category_id,
        note: draft.note,
        tags: draft.tags,
        date_time: draft.date_time,
        created_at: now,
        updated_at: now,
    }
}

fn sort_by_date(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        a.date_time
            .cmp(&b.date_time)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::TransactionType;
    use crate::test_utils::{date, new_transaction, new_transfer, setup_test_store};

    #[tokio::test]
    async fn test_create_does_not_touch_wallets() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = TransactionRepository::new(store.clone());

        let tx = repo
            .create(new_transaction(TransactionType::Expense, 1_000, "w1"))
            .await?;

        assert_eq!(repo.get_by_id(&tx.id).await?, Some(tx));
        assert_eq!(store.count::<crate::models::Wallet>().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive_and_sorted() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = TransactionRepository::new(store);
        for day in [20, 1, 10, 31] {
            repo.create(NewTransaction {
                date_time: date(2026, 1, day),
                ..new_transaction(TransactionType::Income, i64::from(day), "w1")
            })
            .await?;
        }

        let found = repo
            .get_by_date_range(date(2026, 1, 1), date(2026, 1, 20))
            .await?;
        let amounts: Vec<i64> = found.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![1, 10, 20]);

        let all: Vec<i64> = repo.get_all().await?.iter().map(|t| t.amount).collect();
        assert_eq!(all, vec![1, 10, 20, 31]);
        Ok(())
    }

    #[tokio::test]
    async fn test_wallet_and_category_finders() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = TransactionRepository::new(store);
        repo.create(NewTransaction {
            category_id: Some("food".to_string()),
            ..new_transaction(TransactionType::Expense, 5, "a")
        })
        .await?;
        repo.create(new_transfer(7, "b", "a")).await?;
        repo.create(new_transaction(TransactionType::Income, 9, "b"))
            .await?;

        assert_eq!(repo.get_by_wallet("a").await?.len(), 1);
        assert_eq!(repo.get_touching_wallet("a").await?.len(), 2);
        assert_eq!(repo.get_by_category("food").await?.len(), 1);
        assert!(repo.get_by_category("rent").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_hard() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = TransactionRepository::new(store);
        let tx = repo
            .create(new_transaction(TransactionType::Expense, 1, "w1"))
            .await?;

        assert!(repo.delete(&tx.id).await?);
        assert!(!repo.delete(&tx.id).await?);
        assert_eq!(repo.get_by_id(&tx.id).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_is_none() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = TransactionRepository::new(store);
        let patch = TransactionPatch {
            amount: Some(3),
            ..Default::default()
        };
        assert_eq!(repo.update("missing", patch).await?, None);
        Ok(())
    }
}
