//! Repositories - one per entity kind.
//!
//! Repositories assign ids and timestamps and apply soft-delete filtering on
//! list reads. They never compute derived values: wallet balances are the
//! ledger's business.

pub mod category;
pub mod debt;
pub mod preferences;
pub mod savings_goal;
pub mod subscription;
pub mod transaction;
pub mod wallet;

pub use category::{CategoryRepository, DEFAULT_CATEGORIES};
pub use debt::DebtRepository;
pub use preferences::UserPreferencesRepository;
pub use savings_goal::SavingsGoalRepository;
pub use subscription::SubscriptionRepository;
pub use transaction::TransactionRepository;
pub use wallet::WalletRepository;

use crate::errors::{Error, Result};
use crate::models::{
    Category, Debt, SavingsGoal, Subscription, Transaction, UserPreferences, Wallet,
};
use crate::store::{EntityStore, Record};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::debug;

/// Every repository over one shared store.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Wallets
    pub wallets: WalletRepository,
    /// Transactions
    pub transactions: TransactionRepository,
    /// Categories
    pub categories: CategoryRepository,
    /// Debts
    pub debts: DebtRepository,
    /// Subscriptions
    pub subscriptions: SubscriptionRepository,
    /// Savings goals
    pub savings_goals: SavingsGoalRepository,
    /// The preferences singleton
    pub preferences: UserPreferencesRepository,
}

impl Repositories {
    /// Builds every repository over clones of `store`.
    #[must_use]
    pub fn new(store: &EntityStore) -> Self {
        Self {
            wallets: WalletRepository::new(store.clone()),
            transactions: TransactionRepository::new(store.clone()),
            categories: CategoryRepository::new(store.clone()),
            debts: DebtRepository::new(store.clone()),
            subscriptions: SubscriptionRepository::new(store.clone()),
            savings_goals: SavingsGoalRepository::new(store.clone()),
            preferences: UserPreferencesRepository::new(store.clone()),
        }
    }
}

/// Records carrying an `updated_at` stamp.
pub(crate) trait Stamped {
    fn stamp(&mut self, at: DateTime<Utc>);
}

macro_rules! impl_stamped {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Stamped for $ty {
                fn stamp(&mut self, at: DateTime<Utc>) {
                    self.updated_at = at;
                }
            }
        )+
    };
}

impl_stamped!(Wallet, Transaction, Category, Debt, Subscription, SavingsGoal, UserPreferences);

/// Amounts are magnitudes: anything below zero is [`Error::InvalidAmount`].
pub(crate) fn validate_amount(amount: i64) -> Result<()> {
    if amount < 0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Fresh random id for a new record.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Read-modify-write: fetch the row, let `apply` merge the change, stamp
/// `updated_at` and persist. `None` when the id does not exist.
pub(crate) async fn modify<R, F>(store: &EntityStore, id: &str, apply: F) -> Result<Option<R>>
where
    R: Record + Stamped,
    F: FnOnce(&mut R) + Send,
{
    let Some(mut record) = store.get::<R>(id).await? else {
        debug!("No {} row with id {}", R::TABLE, id);
        return Ok(None);
    };
    apply(&mut record);
    record.stamp(Utc::now());
    store.put(&record).await.map(Some)
}

/// Sort key for user-ordered lists: explicit positions first, then by name.
pub(crate) fn by_position(a: (Option<i32>, &str), b: (Option<i32>, &str)) -> Ordering {
    match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.1.cmp(b.1)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.1.cmp(b.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_position_puts_unordered_last() {
        let mut items = vec![(None, "b"), (Some(2), "x"), (None, "a"), (Some(1), "z")];
        items.sort_by(|a, b| by_position(*a, *b));
        assert_eq!(items, vec![(Some(1), "z"), (Some(2), "x"), (None, "a"), (None, "b")]);
    }

    #[test]
    fn test_new_ids_are_unique_uuids() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
