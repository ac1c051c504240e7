//! System state entity - key-value pairs for process-wide persisted markers.
//!
//! Lives beside the entity tables but is not one of them: a sync pull never
//! clears it. Holds the `last_sync_at` marker.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// System state database model - stores key-value pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Marker key (e.g., `"last_sync_at"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Marker value stored as string
    pub value: String,
    /// When this marker was last written, epoch milliseconds
    pub updated_at: i64,
}

/// `SystemState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
