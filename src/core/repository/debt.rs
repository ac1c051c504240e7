//! Debt repository.
//!
//! Debts sit outside the wallet-balance invariant. Pairing a debt change with
//! a wallet transaction is done by [`crate::core::debt::DebtLedger`].

use super::{modify, new_id, validate_amount};
use crate::{
    entities::DebtColumn,
    errors::Result,
    models::{Debt, DebtDirection, DebtPatch, NewDebt},
    store::EntityStore,
};
use chrono::Utc;
use sea_orm::ColumnTrait;

/// CRUD over the `debts` table.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    store: EntityStore,
}

impl DebtRepository {
    /// Creates a repository over `store`.
    #[must_use]
    pub const fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Persists a new debt with a fresh id and timestamps.
    /// A negative amount is rejected before anything is written.
    pub async fn create(&self, draft: NewDebt) -> Result<Debt> {
        validate_amount(draft.amount)?;
        let now = Utc::now();
        let debt = Debt {
            id: new_id(),
            counterparty: draft.counterparty,
            amount: draft.amount,
            currency: draft.currency,
            direction: draft.direction,
            due_date: draft.due_date,
            note: draft.note,
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        self.store.add(&debt).await
    }

    /// Every debt, oldest first.
    pub async fn get_all(&self) -> Result<Vec<Debt>> {
        let mut debts = self.store.all::<Debt>().await?;
        debts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(debts)
    }

    /// The debt with this id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Debt>> {
        self.store.get(id).await
    }

    /// Debts in one direction.
    pub async fn get_by_direction(&self, direction: DebtDirection) -> Result<Vec<Debt>> {
        self.store
            .find_where::<Debt>(DebtColumn::Direction.eq(direction.as_str()))
            .await
    }

    /// Shallow-merges `patch` into the stored debt. `None` if it does not exist.
    pub async fn update(&self, id: &str, patch: DebtPatch) -> Result<Option<Debt>> {
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }
        modify(&self.store, id, |d: &mut Debt| patch.apply(d)).await
    }

    /// Writes `debt` back verbatim, timestamps included.
    pub(crate) async fn restore(&self, debt: &Debt) -> Result<Debt> {
        self.store.put(debt).await
    }

    /// Hard-deletes the debt. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete::<Debt>(id).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::models::DebtStatus;
    use crate::test_utils::{new_debt, setup_test_store};

    #[tokio::test]
    async fn test_get_by_direction() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = DebtRepository::new(store);
        repo.create(new_debt("Bank", 1_000, DebtDirection::IOwe)).await?;
        repo.create(new_debt("Work", 500, DebtDirection::ImOwed)).await?;
        repo.create(new_debt("Split", 300, DebtDirection::IOwe)).await?;

        assert_eq!(repo.get_by_direction(DebtDirection::IOwe).await?.len(), 2);
        let owed = repo.get_by_direction(DebtDirection::ImOwed).await?;
        assert_eq!(owed.len(), 1);
        assert_eq!(owed[0].counterparty, "Work");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_hard_delete() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = DebtRepository::new(store);
        let debt = repo.create(new_debt("Bank", 1_000, DebtDirection::IOwe)).await?;

        let updated = repo
            .update(
                &debt.id,
                DebtPatch {
                    amount: Some(0),
                    status: Some(DebtStatus::Paid),
                    ..Default::default()
                },
            )
            .await?
            .unwrap();
        assert_eq!(updated.status, DebtStatus::Paid);

        assert!(repo.delete(&debt.id).await?);
        assert!(repo.get_all().await?.is_empty());
        assert!(!repo.delete(&debt.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_amount_is_rejected() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = DebtRepository::new(store.clone());

        let created = repo.create(new_debt("X", -500, DebtDirection::IOwe)).await;
        assert!(matches!(created, Err(Error::InvalidAmount { amount: -500 })));
        assert_eq!(store.count::<Debt>().await?, 0);

        let debt = repo.create(new_debt("Y", 500, DebtDirection::IOwe)).await?;
        let patch = DebtPatch {
            amount: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            repo.update(&debt.id, patch).await,
            Err(Error::InvalidAmount { amount: -1 })
        ));
        assert_eq!(repo.get_by_id(&debt.id).await?, Some(debt));
        Ok(())
    }
}
