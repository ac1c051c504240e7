//! Savings goal repository.

use super::{modify, new_id, validate_amount};
use crate::{
    entities::SavingsGoalColumn,
    errors::Result,
    models::{NewSavingsGoal, SavingsGoal, SavingsGoalPatch},
    store::EntityStore,
};
use chrono::Utc;
use sea_orm::ColumnTrait;

/// CRUD over the `savings_goals` table.
#[derive(Debug, Clone)]
pub struct SavingsGoalRepository {
    store: EntityStore,
}

impl SavingsGoalRepository {
    /// Creates a repository over `store`.
    #[must_use]
    pub const fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Persists a new goal with a fresh id and timestamps.
    pub async fn create(&self, draft: NewSavingsGoal) -> Result<SavingsGoal> {
        validate_amount(draft.target_amount)?;
        validate_amount(draft.current_amount)?;
        let now = Utc::now();
        let goal = SavingsGoal {
            id: new_id(),
            name: draft.name,
            target_amount: draft.target_amount,
            currency: draft.currency,
            current_amount: draft.current_amount,
            target_date: draft.target_date,
            linked_savings_wallet_id: draft.linked_savings_wallet_id,
            created_at: now,
            updated_at: now,
        };
        self.store.add(&goal).await
    }

    /// Every goal, oldest first.
    pub async fn get_all(&self) -> Result<Vec<SavingsGoal>> {
        let mut goals = self.store.all::<SavingsGoal>().await?;
        goals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(goals)
    }

    /// The goal with this id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<SavingsGoal>> {
        self.store.get(id).await
    }

    /// Goals kept in `currency`.
    pub async fn get_by_currency(&self, currency: &str) -> Result<Vec<SavingsGoal>> {
        self.store
            .find_where::<SavingsGoal>(SavingsGoalColumn::Currency.eq(currency))
            .await
    }

    /// Shallow-merges `patch` into the stored goal. `None` if it does not exist.
    pub async fn update(&self, id: &str, patch: SavingsGoalPatch) -> Result<Option<SavingsGoal>> {
        for amount in [patch.target_amount, patch.current_amount].into_iter().flatten() {
            validate_amount(amount)?;
        }
        modify(&self.store, id, |g: &mut SavingsGoal| patch.apply(g)).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::{date, setup_test_store};

    fn draft(name: &str, currency: &str) -> NewSavingsGoal {
        NewSavingsGoal {
            name: name.to_string(),
            target_amount: 10_000_000,
            currency: currency.to_string(),
            current_amount: 0,
            target_date: Some(date(2026, 12, 31)),
            linked_savings_wallet_id: None,
        }
    }

    #[tokio::test]
    async fn test_goal_crud_and_currency_filter() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = SavingsGoalRepository::new(store);
        let laptop = repo.create(draft("Laptop", "UZS")).await?;
        repo.create(draft("Trip", "USD")).await?;

        let updated = repo
            .update(
                &laptop.id,
                SavingsGoalPatch {
                    current_amount: Some(2_500_000),
                    target_date: Some(None),
                    ..Default::default()
                },
            )
            .await?
            .unwrap();
        assert_eq!(updated.current_amount, 2_500_000);
        assert_eq!(updated.target_date, None);

        assert_eq!(repo.get_by_currency("UZS").await?, vec![updated]);
        assert_eq!(repo.get_all().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_amounts_are_rejected() -> Result<()> {
        let store = setup_test_store().await?;
        let repo = SavingsGoalRepository::new(store.clone());
        let mut negative = draft("Laptop", "UZS");
        negative.current_amount = -1;

        assert!(matches!(
            repo.create(negative).await,
            Err(Error::InvalidAmount { amount: -1 })
        ));
        assert_eq!(store.count::<SavingsGoal>().await?, 0);

        let goal = repo.create(draft("Trip", "USD")).await?;
        let patch = SavingsGoalPatch {
            target_amount: Some(-5),
            ..Default::default()
        };
        assert!(matches!(
            repo.update(&goal.id, patch).await,
            Err(Error::InvalidAmount { amount: -5 })
        ));
        assert_eq!(repo.get_by_id(&goal.id).await?, Some(goal));
        Ok(())
    }
}
