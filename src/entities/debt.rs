//! Debt row.

use sea_orm::entity::prelude::*;

/// Debt database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub counterparty: String,
    pub amount: i64,
    #[sea_orm(indexed)]
    pub currency: String,
    /// `I_OWE` or `IM_OWED`
    #[sea_orm(indexed)]
    pub direction: String,
    pub due_date: Option<i64>,
    pub note: Option<String>,
    /// `open`, `paid` or `partial`
    #[sea_orm(indexed)]
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
