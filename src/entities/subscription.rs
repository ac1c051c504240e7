//! Subscription row.

use sea_orm::entity::prelude::*;

/// Subscription database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub amount: i64,
    pub currency: String,
    #[sea_orm(indexed)]
    pub wallet_id: String,
    pub category_id: Option<String>,
    pub frequency: String,
    pub next_run_at: i64,
    #[sea_orm(indexed)]
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
