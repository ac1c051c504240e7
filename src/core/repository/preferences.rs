//! The user preferences singleton.

use super::modify;
use crate::{
    errors::Result,
    models::{NewPreferences, PreferencesPatch, UserPreferences},
    store::EntityStore,
};
use chrono::Utc;

/// Access to the single `default` preferences row.
#[derive(Debug, Clone)]
pub struct UserPreferencesRepository {
    store: EntityStore,
}

impl UserPreferencesRepository {
    /// Creates a repository over `store`.
    #[must_use]
    pub const fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Writes the singleton row, replacing any existing one.
    pub async fn create(&self, draft: NewPreferences) -> Result<UserPreferences> {
        let now = Utc::now();
        let prefs = UserPreferences {
            id: UserPreferences::SINGLETON_ID.to_string(),
            base_currency: draft.base_currency,
            calendar_type: draft.calendar_type,
            time_format: draft.time_format,
            theme: draft.theme,
            created_at: now,
            updated_at: now,
        };
        self.store.put(&prefs).await
    }

    /// The singleton row, if it was ever written.
    pub async fn get(&self) -> Result<Option<UserPreferences>> {
        self.store.get(UserPreferences::SINGLETON_ID).await
    }

    /// Shallow-merges `patch` into the singleton. `None` if it was never written.
    pub async fn update(&self, patch: PreferencesPatch) -> Result<Option<UserPreferences>> {
        modify(&self.store, UserPreferences::SINGLETON_ID, |p: &mut UserPreferences| {
            patch.apply(p);
        })
        .await
    }
}
