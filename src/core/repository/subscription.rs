//! Subscription repository.

use super::{modify, new_id, validate_amount};
use crate::{
    entities::SubscriptionColumn,
    errors::Result,
    models::{NewSubscription, Subscription, SubscriptionPatch},
    store::EntityStore,
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::ColumnTrait;

/// CRUD over the `subscriptions` table.
#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    store: EntityStore,
}

impl SubscriptionRepository {
    /// Creates a repository over `store`.
    #[must_use]
    pub const fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Persists a new subscription with a fresh id and timestamps.
    pub async fn create(&self, draft: NewSubscription) -> Result<Subscription> {
        validate_amount(draft.amount)?;
        let now = Utc::now();
        let subscription = Subscription {
            id: new_id(),
            name: draft.name,
            amount: draft.amount,
            currency: draft.currency,
            wallet_id: draft.wallet_id,
            category_id: draft.category_id,
            frequency: draft.frequency,
            next_run_at: draft.next_run_at,
            active: draft.active,
            created_at: now,
            updated_at: now,
        };
        self.store.add(&subscription).await
    }

    /// Active subscriptions, soonest run first.
    pub async fn get_all(&self) -> Result<Vec<Subscription>> {
        let mut subscriptions = self
            .store
            .find_where::<Subscription>(SubscriptionColumn::Active.eq(true))
            .await?;
        subscriptions.sort_by(|a, b| a.next_run_at.cmp(&b.next_run_at));
        Ok(subscriptions)
    }

    /// The subscription with this id, active or not.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Subscription>> {
        self.store.get(id).await
    }

    /// Shallow-merges `patch` into the stored subscription. `None` if it does not exist.
    pub async fn update(&self, id: &str, patch: SubscriptionPatch) -> Result<Option<Subscription>> {
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }
        modify(&self.store, id, |s: &mut Subscription| patch.apply(s)).await
    }

    /// Active subscriptions whose next run falls on `day` (UTC).
    pub async fn get_due_on(&self, day: NaiveDate) -> Result<Vec<Subscription>> {
        let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1) - Duration::milliseconds(1);
        let mut due: Vec<Subscription> = self
            .store
            .find_between::<Subscription>(SubscriptionColumn::NextRunAt, start, end)
            .await?
            .into_iter()
            .filter(|s| s.active)
            .collect();
        due.sort_by(|a, b| a.next_run_at.cmp(&b.next_run_at));
        Ok(due)
    }
}
