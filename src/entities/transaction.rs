//! Transaction row.
//!
//! `wallet_id`/`to_wallet_id` are plain strings: wallet consistency is kept by
//! the ledger, not by a foreign key. `tags` is a JSON array.

use sea_orm::entity::prelude::*;

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// `expense`, `income` or `transfer`
    pub transaction_type: String,
    pub amount: i64,
    pub currency: String,
    #[sea_orm(indexed)]
    pub wallet_id: String,
    pub to_wallet_id: Option<String>,
    #[sea_orm(indexed)]
    pub category_id: Option<String>,
    pub note: Option<String>,
    pub tags: String,
    /// User-assigned event date, epoch milliseconds
    #[sea_orm(indexed)]
    pub date_time: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Transactions declare no foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
