//! Savings goal row.

use sea_orm::entity::prelude::*;

/// Savings goal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub target_amount: i64,
    #[sea_orm(indexed)]
    pub currency: String,
    pub current_amount: i64,
    pub target_date: Option<i64>,
    pub linked_savings_wallet_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
