//! Entity module - SeaORM row definitions for every table of the store.
//! Each entity has a Model struct for the row and an Entity struct for queries.
//! Domain code works with [`crate::models`]; the store converts between the two.

pub mod category;
pub mod debt;
pub mod savings_goal;
pub mod subscription;
pub mod system_state;
pub mod transaction;
pub mod user_preferences;
pub mod wallet;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as CategoryEntity};
pub use debt::{Column as DebtColumn, Entity as DebtEntity};
pub use savings_goal::{Column as SavingsGoalColumn, Entity as SavingsGoalEntity};
pub use subscription::{Column as SubscriptionColumn, Entity as SubscriptionEntity};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use transaction::{Column as TransactionColumn, Entity as TransactionEntity};
pub use user_preferences::{Column as UserPreferencesColumn, Entity as UserPreferencesEntity};
pub use wallet::{Column as WalletColumn, Entity as WalletEntity};
