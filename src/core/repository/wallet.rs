//! Wallet repository.
//!
//! Wallets are never physically removed: `delete` clears the `active` flag and
//! list reads skip inactive rows. `get_by_id` still returns them, so old
//! transactions keep resolving their wallet.

use super::{by_position, modify, new_id};
use crate::{
    entities::WalletColumn,
    errors::Result,
    models::{NewWallet, Wallet, WalletGroup, WalletPatch},
    store::EntityStore,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// CRUD over the `wallets` table.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    store: EntityStore,
}

impl WalletRepository {
    /// Creates a repository over `store`.
    #[must_use]
    pub const fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Persists a new wallet with a fresh id and timestamps.
    ///
    /// The draft's balances are stored as given; callers opening a wallet
    /// normally pass the same value for `initial_balance` and `current_balance`.
    pub async fn create(&self, draft: NewWallet) -> Result<Wallet> {
        let now = Utc::now();
        let wallet = Wallet {
            id: new_id(),
            name: draft.name,
            currency: draft.currency,
            kind: draft.kind,
            initial_balance: draft.initial_balance,
            current_balance: draft.current_balance,
            icon: draft.icon,
            color: draft.color,
            group: draft.group,
            order: draft.order,
            active: draft.active,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.add(&wallet).await?;
        info!("Created wallet '{}' ({})", stored.name, stored.id);
        Ok(stored)
    }

    /// Active wallets, by sort position then name.
    pub async fn get_all(&self) -> Result<Vec<Wallet>> {
        let mut wallets = self
            .store
            .find_where::<Wallet>(WalletColumn::Active.eq(true))
            .await?;
        sort_wallets(&mut wallets);
        Ok(wallets)
    }

    /// Every wallet including deactivated ones, for balance audits.
    pub async fn get_all_with_inactive(&self) -> Result<Vec<Wallet>> {
        let mut wallets = self.store.all::<Wallet>().await?;
        sort_wallets(&mut wallets);
        Ok(wallets)
    }

    /// The wallet with this id, active or not.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Wallet>> {
        self.store.get(id).await
    }

    /// Shallow-merges `patch` into the stored wallet. `None` if it does not exist.
    pub async fn update(&self, id: &str, patch: WalletPatch) -> Result<Option<Wallet>> {
        modify(&self.store, id, |w: &mut Wallet| patch.apply(w)).await
    }

    /// Soft-deletes the wallet. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let deleted = modify(&self.store, id, |w: &mut Wallet| w.active = false)
            .await?
            .is_some();
        if deleted {
            info!("Deactivated wallet {}", id);
        } else {
            debug!("Wallet {} not found for delete", id);
        }
        Ok(deleted)
    }

    /// Sum of active wallets' current balances, per currency.
    pub async fn total_balance_by_currency(&self) -> Result<BTreeMap<String, i64>> {
        let mut totals = BTreeMap::new();
        for wallet in self.get_all().await? {
            *totals.entry(wallet.currency).or_insert(0) += wallet.current_balance;
        }
        Ok(totals)
    }

    /// Active wallets listed under `group`.
    pub async fn get_by_group(&self, group: WalletGroup) -> Result<Vec<Wallet>> {
        let mut wallets = self
            .store
            .find_where::<Wallet>(
                Condition::all()
                    .add(WalletColumn::Active.eq(true))
                    .add(WalletColumn::Group.eq(group.as_str())),
            )
            .await?;
        sort_wallets(&mut wallets);
        Ok(wallets)
    }
}

fn sort_wallets(wallets: &mut [Wallet]) {
    wallets.sort_by(|a, b| by_position((a.order, &a.name), (b.order, &b.name)));
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{new_wallet, setup_test_store};

    #[tokio::test]
    async fn test_create_assigns_identity_and_timestamps() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = WalletRepository::new(store);

        let wallet = repo.create(new_wallet("Cash", 500_000)).await?;

        assert!(!wallet.id.is_empty());
        assert_eq!(wallet.created_at, wallet.updated_at);
        assert_eq!(repo.get_by_id(&wallet.id).await?, Some(wallet));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_soft() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = WalletRepository::new(store);
        let wallet = repo.create(new_wallet("Cash", 100)).await?;

        assert!(repo.delete(&wallet.id).await?);
        assert!(!repo.delete("missing").await?);

        assert!(repo.get_all().await?.is_empty());
        let still_there = repo.get_by_id(&wallet.id).await?.unwrap();
        assert!(!still_there.active);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_merges_and_stamps() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = WalletRepository::new(store);
        let wallet = repo.create(new_wallet("Cash", 100)).await?;

        let updated = repo
            .update(
                &wallet.id,
                WalletPatch {
                    name: Some("Pocket".to_string()),
                    color: Some(Some("#10b981".to_string())),
                    ..Default::default()
                },
            )
            .await?
            .unwrap();

        assert_eq!(updated.name, "Pocket");
        assert_eq!(updated.color.as_deref(), Some("#10b981"));
        assert_eq!(updated.current_balance, 100);
        assert!(updated.updated_at >= wallet.updated_at);
        assert_eq!(repo.update("missing", WalletPatch::default()).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_totals_and_group_filter() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = WalletRepository::new(store);
        repo.create(new_wallet("Card", 1_000)).await?;
        let savings = repo
            .create(NewWallet {
                group: Some(WalletGroup::Savings),
                ..new_wallet("Savings", 5_000)
            })
            .await?;
        let usd = repo
            .create(NewWallet {
                currency: "USD".to_string(),
                ..new_wallet("Dollars", 70)
            })
            .await?;
        let gone = repo.create(new_wallet("Old", 9_999)).await?;
        repo.delete(&gone.id).await?;

        let totals = repo.total_balance_by_currency().await?;
        assert_eq!(totals.get("UZS"), Some(&6_000));
        assert_eq!(totals.get("USD"), Some(&usd.current_balance));

        let grouped = repo.get_by_group(WalletGroup::Savings).await?;
        assert_eq!(grouped, vec![savings]);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_respects_sort_position() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = WalletRepository::new(store);
        repo.create(new_wallet("Zeta", 0)).await?;
        repo.create(NewWallet {
            order: Some(0),
            ..new_wallet("Main", 0)
        })
        .await?;
        repo.create(new_wallet("Alpha", 0)).await?;

        let names: Vec<String> = repo.get_all().await?.into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["Main", "Alpha", "Zeta"]);
        Ok(())
    }
}
