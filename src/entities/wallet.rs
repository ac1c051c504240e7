//! Wallet row.
//!
//! Dates are epoch milliseconds; enum columns hold their wire spelling.
//! `active`, `group` and `currency` are indexed for list filtering.

use sea_orm::entity::prelude::*;

/// Wallet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    /// Opaque UUID string
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(indexed)]
    pub currency: String,
    /// `cash`, `card`, `savings` or `other`
    pub kind: String,
    pub initial_balance: i64,
    pub current_balance: i64,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// `accounts` or `savings`
    #[sea_orm(column_name = "wallet_group", indexed)]
    pub group: Option<String>,
    #[sea_orm(column_name = "sort_order")]
    pub order: Option<i32>,
    /// Soft-delete flag
    #[sea_orm(indexed)]
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Wallets declare no foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
