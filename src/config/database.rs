//! Database connection and table creation.
//!
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, and every column marked
//! `#[sea_orm(indexed)]` gets its index from `Schema::create_index_from_entity`.
//! Both use `IF NOT EXISTS`, so opening an existing database file is a no-op.

use crate::entities::{
    CategoryEntity, DebtEntity, SavingsGoalEntity, SubscriptionEntity, SystemState,
    TransactionEntity, UserPreferencesEntity, WalletEntity,
};
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::debug;

/// Used when neither the config file nor `DATABASE_URL` names a database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://ledger.sqlite?mode=rwc";

/// Establishes a connection to the `SQLite` database at `database_url`.
///
/// A failure here leaves the application without storage, so it is reported
/// as [`Error::StoreUnavailable`].
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url)
        .await
        .map_err(|e| Error::store_unavailable(format!("failed to open {database_url}: {e}")))
}

/// Creates every table and secondary index the store needs.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    create_table(db, WalletEntity).await?;
    create_table(db, TransactionEntity).await?;
    create_table(db, CategoryEntity).await?;
    create_table(db, DebtEntity).await?;
    create_table(db, SubscriptionEntity).await?;
    create_table(db, SavingsGoalEntity).await?;
    create_table(db, UserPreferencesEntity).await?;
    create_table(db, SystemState).await?;
    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }

    debug!("Ensured table {}", entity.table_name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{system_state, transaction, wallet};
    use sea_orm::{QuerySelect, Statement};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<wallet::Model> = WalletEntity::find().limit(1).all(&db).await?;
        let _: Vec<transaction::Model> = TransactionEntity::find().limit(1).all(&db).await?;
        let _: Vec<system_state::Model> = SystemState::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_indexed_columns_get_an_index() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let rows = db
            .query_all(Statement::from_string(
                db.get_database_backend(),
                "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'transactions'",
            ))
            .await?;
        let names: Vec<String> = rows
            .iter()
            .filter_map(|r| r.try_get::<String>("", "name").ok())
            .collect();

        assert!(names.iter().any(|n| n.contains("wallet_id")));
        assert!(names.iter().any(|n| n.contains("date_time")));
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_url_is_store_unavailable() {
        let result = create_connection("not-a-database://nowhere").await;
        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
    }
}
