//! Category row.

use sea_orm::entity::prelude::*;

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    /// `expense`, `income` or `both`
    #[sea_orm(indexed)]
    pub category_type: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[sea_orm(indexed)]
    pub archived: bool,
    #[sea_orm(column_name = "sort_order")]
    pub order: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
