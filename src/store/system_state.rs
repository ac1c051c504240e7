//! Key-value markers kept outside the entity tables (last sync time and the
//! like). Sync replaces entity tables wholesale; these rows survive it.

use super::time::to_epoch_millis;
use crate::entities::{SystemState, system_state};
use crate::errors::Result;
use chrono::Utc;
use sea_orm::{Set, prelude::*};

pub(super) async fn get_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;
    Ok(state.map(|s| s.value))
}

pub(super) async fn set_value<C>(db: &C, key: &str, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = to_epoch_millis(Utc::now());

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(value.to_string());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
        };
        new_state.insert(db).await?;
    }

    Ok(())
}
