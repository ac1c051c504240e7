//! Mapping between domain values and table rows.
//!
//! Rows keep dates as epoch milliseconds and enums as their wire spelling.
//! Decoding validates both, so a corrupted row surfaces as an error instead of
//! a silently wrong value.

use super::time::{from_epoch_millis, opt_from_epoch_millis, opt_to_epoch_millis, to_epoch_millis};
use crate::entities::{category, debt, savings_goal, subscription, transaction, user_preferences, wallet};
use crate::errors::Result;
use crate::models::{Category, Debt, SavingsGoal, Subscription, Transaction, UserPreferences, Wallet};
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait, FromQueryResult, IntoActiveModel};

/// A domain value persisted as one row of one table, keyed by a string id.
pub trait Record: Clone + Send + Sync + Sized + 'static {
    /// SeaORM entity of the backing table
    type Entity: EntityTrait<Model = Self::Row, ActiveModel = Self::Active>;
    /// Row model
    type Row: FromQueryResult + IntoActiveModel<Self::Active> + Clone + Send + Sync;
    /// Active model used for inserts
    type Active: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync + 'static;

    /// Table name, for logs and errors
    const TABLE: &'static str;

    /// Primary key value.
    fn id(&self) -> &str;

    /// Primary key column.
    fn id_column() -> <Self::Entity as EntityTrait>::Column;

    /// Decodes a row.
    fn from_row(row: Self::Row) -> Result<Self>;

    /// Encodes this value as a row.
    fn to_row(&self) -> Result<Self::Row>;
}

impl Record for Wallet {
    type Entity = wallet::Entity;
    type Row = wallet::Model;
    type Active = wallet::ActiveModel;

    const TABLE: &'static str = "wallets";

    fn id(&self) -> &str {
        &self.id
    }

    fn id_column() -> wallet::Column {
        wallet::Column::Id
    }

    fn from_row(row: wallet::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            currency: row.currency,
            kind: row.kind.parse()?,
            initial_balance: row.initial_balance,
            current_balance: row.current_balance,
            icon: row.icon,
            color: row.color,
            group: row.group.as_deref().map(str::parse).transpose()?,
            order: row.order,
            active: row.active,
            created_at: from_epoch_millis(row.created_at)?,
            updated_at: from_epoch_millis(row.updated_at)?,
        })
    }

    fn to_row(&self) -> Result<wallet::Model> {
        Ok(wallet::Model {
            id: self.id.clone(),
            name: self.name.clone(),
            currency: self.currency.clone(),
            kind: self.kind.as_str().to_string(),
            initial_balance: self.initial_balance,
            current_balance: self.current_balance,
            icon: self.icon.clone(),
            color: self.color.clone(),
            group: self.group.map(|g| g.as_str().to_string()),
            order: self.order,
            active: self.active,
            created_at: to_epoch_millis(self.created_at),
            updated_at: to_epoch_millis(self.updated_at),
        })
    }
}

impl Record for Transaction {
    type Entity = transaction::Entity;
    type Row = transaction::Model;
    type Active = transaction::ActiveModel;

    const TABLE: &'static str = "transactions";

    fn id(&self) -> &str {
        &self.id
    }

    fn id_column() -> transaction::Column {
        transaction::Column::Id
    }

    fn from_row(row: transaction::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            transaction_type: row.transaction_type.parse()?,
            amount: row.amount,
            currency: row.currency,
            wallet_id: row.wallet_id,
            to_wallet_id: row.to_wallet_id,
            category_id: row.category_id,
            note: row.note,
            tags: serde_json::from_str(&row.tags)?,
            date_time: from_epoch_millis(row.date_time)?,
            created_at: from_epoch_millis(row.created_at)?,
            updated_at: from_epoch_millis(row.updated_at)?,
        })
    }

    fn to_row(&self) -> Result<transaction::Model> {
        Ok(transaction::Model {
            id: self.id.clone(),
            transaction_type: self.transaction_type.as_str().to_string(),
            amount: self.amount,
            currency: self.currency.clone(),
            wallet_id: self.wallet_id.clone(),
            to_wallet_id: self.to_wallet_id.clone(),
            category_id: self.category_id.clone(),
            note: self.note.clone(),
            tags: serde_json::to_string(&self.tags)?,
            date_time: to_epoch_millis(self.date_time),
            created_at: to_epoch_millis(self.created_at),
            updated_at: to_epoch_millis(self.updated_at),
        })
    }
}

impl Record for Category {
    type Entity = category::Entity;
    type Row = category::Model;
    type Active = category::ActiveModel;

    const TABLE: &'static str = "categories";

    fn id(&self) -> &str {
        &self.id
    }

    fn id_column() -> category::Column {
        category::Column::Id
    }

    fn from_row(row: category::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            category_type: row.category_type.parse()?,
            icon: row.icon,
            color: row.color,
            archived: row.archived,
            order: row.order,
            created_at: from_epoch_millis(row.created_at)?,
            updated_at: from_epoch_millis(row.updated_at)?,
        })
    }

    fn to_row(&self) -> Result<category::Model> {
        Ok(category::Model {
            id: self.id.clone(),
            name: self.name.clone(),
            category_type: self.category_type.as_str().to_string(),
            icon: self.icon.clone(),
            color: self.color.clone(),
            archived: self.archived,
            order: self.order,
            created_at: to_epoch_millis(self.created_at),
            updated_at: to_epoch_millis(self.updated_at),
        })
    }
}

impl Record for Debt {
    type Entity = debt::Entity;
    type Row = debt::Model;
    type Active = debt::ActiveModel;

    const TABLE: &'static str = "debts";

    fn id(&self) -> &str {
        &self.id
    }

    fn id_column() -> debt::Column {
        debt::Column::Id
    }

    fn from_row(row: debt::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            counterparty: row.counterparty,
            amount: row.amount,
            currency: row.currency,
            direction: row.direction.parse()?,
            due_date: opt_from_epoch_millis(row.due_date)?,
            note: row.note,
            status: row.status.parse()?,
            created_at: from_epoch_millis(row.created_at)?,
            updated_at: from_epoch_millis(row.updated_at)?,
        })
    }

    fn to_row(&self) -> Result<debt::Model> {
        Ok(debt::Model {
            id: self.id.clone(),
            counterparty: self.counterparty.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            direction: self.direction.as_str().to_string(),
            due_date: opt_to_epoch_millis(self.due_date),
            note: self.note.clone(),
            status: self.status.as_str().to_string(),
            created_at: to_epoch_millis(self.created_at),
            updated_at: to_epoch_millis(self.updated_at),
        })
    }
}

impl Record for Subscription {
    type Entity = subscription::Entity;
    type Row = subscription::Model;
    type Active = subscription::ActiveModel;

    const TABLE: &'static str = "subscriptions";

    fn id(&self) -> &str {
        &self.id
    }

    fn id_column() -> subscription::Column {
        subscription::Column::Id
    }

    fn from_row(row: subscription::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            amount: row.amount,
            currency: row.currency,
            wallet_id: row.wallet_id,
            category_id: row.category_id,
            frequency: row.frequency.parse()?,
            next_run_at: from_epoch_millis(row.next_run_at)?,
            active: row.active,
            created_at: from_epoch_millis(row.created_at)?,
            updated_at: from_epoch_millis(row.updated_at)?,
        })
    }

    fn to_row(&self) -> Result<subscription::Model> {
        Ok(subscription::Model {
            id: self.id.clone(),
            name: self.name.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            wallet_id: self.wallet_id.clone(),
            category_id: self.category_id.clone(),
            frequency: self.frequency.as_str().to_string(),
            next_run_at: to_epoch_millis(self.next_run_at),
            active: self.active,
            created_at: to_epoch_millis(self.created_at),
            updated_at: to_epoch_millis(self.updated_at),
        })
    }
}

impl Record for SavingsGoal {
    type Entity = savings_goal::Entity;
    type Row = savings_goal::Model;
    type Active = savings_goal::ActiveModel;

    const TABLE: &'static str = "savings_goals";

    fn id(&self) -> &str {
        &self.id
    }

    fn id_column() -> savings_goal::Column {
        savings_goal::Column::Id
    }

    fn from_row(row: savings_goal::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            target_amount: row.target_amount,
            currency: row.currency,
            current_amount: row.current_amount,
            target_date: opt_from_epoch_millis(row.target_date)?,
            linked_savings_wallet_id: row.linked_savings_wallet_id,
            created_at: from_epoch_millis(row.created_at)?,
            updated_at: from_epoch_millis(row.updated_at)?,
        })
    }

    fn to_row(&self) -> Result<savings_goal::Model> {
        Ok(savings_goal::Model {
            id: self.id.clone(),
            name: self.name.clone(),
            target_amount: self.target_amount,
            currency: self.currency.clone(),
            current_amount: self.current_amount,
            target_date: opt_to_epoch_millis(self.target_date),
            linked_savings_wallet_id: self.linked_savings_wallet_id.clone(),
            created_at: to_epoch_millis(self.created_at),
            updated_at: to_epoch_millis(self.updated_at),
        })
    }
}

impl Record for UserPreferences {
    type Entity = user_preferences::Entity;
    type Row = user_preferences::Model;
    type Active = user_preferences::ActiveModel;

    const TABLE: &'static str = "user_preferences";

    fn id(&self) -> &str {
        &self.id
    }

    fn id_column() -> user_preferences::Column {
        user_preferences::Column::Id
    }

    fn from_row(row: user_preferences::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            base_currency: row.base_currency,
            calendar_type: row.calendar_type.parse()?,
            time_format: row.time_format.parse()?,
            theme: row.theme.parse()?,
            created_at: from_epoch_millis(row.created_at)?,
            updated_at: from_epoch_millis(row.updated_at)?,
        })
    }

    fn to_row(&self) -> Result<user_preferences::Model> {
        Ok(user_preferences::Model {
            id: self.id.clone(),
            base_currency: self.base_currency.clone(),
            calendar_type: self.calendar_type.as_str().to_string(),
            time_format: self.time_format.as_str().to_string(),
            theme: self.theme.as_str().to_string(),
            created_at: to_epoch_millis(self.created_at),
            updated_at: to_epoch_millis(self.updated_at),
        })
    }
}
