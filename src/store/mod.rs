//! Entity Store - durable keyed tables over the embedded SQLite database.
//!
//! The store knows nothing about balances or soft deletes. It offers
//! get/put/add/delete/bulk-add/clear/count and index queries for any
//! [`Record`], and owns the conversion between domain dates and the epoch
//! milliseconds kept on disk.
//!
//! Build one [`EntityStore`] at startup and hand clones of it to the
//! repositories. Clones share the same connection pool.

mod records;
mod system_state;
mod table;
mod time;

pub use records::Record;
pub use time::{from_epoch_millis, to_epoch_millis};

use crate::config::database::{create_connection, create_tables};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseConnection, DatabaseTransaction, EntityTrait, TransactionTrait,
    sea_query::IntoCondition,
};
use tracing::{debug, info, instrument};

/// Column type of a record's table.
pub type ColumnOf<R> = <<R as Record>::Entity as EntityTrait>::Column;

/// Handle to the local database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EntityStore {
    db: DatabaseConnection,
}

impl EntityStore {
    /// Opens the database at `url` and ensures every table and index exists.
    ///
    /// Any failure here is [`Error::StoreUnavailable`]: nothing else can work
    /// without the store.
    #[instrument]
    pub async fn open(url: &str) -> Result<Self> {
        debug!("Opening entity store at {}", url);
        let db = create_connection(url).await?;
        create_tables(&db)
            .await
            .map_err(|e| Error::store_unavailable(format!("failed to create tables: {e}")))?;
        info!("Entity store ready");
        Ok(Self { db })
    }

    /// Wraps an already-connected database. Tables must exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Starts an atomic unit of work over several tables.
    pub async fn begin(&self) -> Result<StoreTransaction> {
        Ok(StoreTransaction {
            txn: self.db.begin().await?,
        })
    }

    /// Row with this id, whatever its soft-delete flags say.
    pub async fn get<R: Record>(&self, id: &str) -> Result<Option<R>> {
        table::get(&self.db, id).await
    }

    /// Every row of the table.
    pub async fn all<R: Record>(&self) -> Result<Vec<R>> {
        table::all(&self.db).await
    }

    /// Rows matching an equality/filter condition on indexed columns.
    pub async fn find_where<R: Record>(&self, condition: impl IntoCondition) -> Result<Vec<R>> {
        table::find_where(&self.db, condition).await
    }

    /// Rows whose date column lies in `[start, end]`.
    pub async fn find_between<R: Record>(
        &self,
        column: ColumnOf<R>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<R>> {
        table::find_between(&self.db, column, start, end).await
    }

    /// Number of rows in the table.
    pub async fn count<R: Record>(&self) -> Result<u64> {
        table::count::<R, _>(&self.db).await
    }

    /// Inserts a new row. Fails with [`Error::DuplicateKey`] if the id exists.
    /// Returns the record exactly as it will be read back.
    pub async fn add<R: Record>(&self, record: &R) -> Result<R> {
        table::add(&self.db, record).await
    }

    /// Inserts or replaces the row with the record's id.
    /// Returns the record exactly as it will be read back.
    pub async fn put<R: Record>(&self, record: &R) -> Result<R> {
        let txn = self.db.begin().await?;
        let stored = table::put(&txn, record).await?;
        txn.commit().await?;
        Ok(stored)
    }

    /// Removes the row. Returns whether a row existed.
    pub async fn delete<R: Record>(&self, id: &str) -> Result<bool> {
        table::delete::<R, _>(&self.db, id).await
    }

    /// Inserts many rows at once; all or nothing.
    pub async fn bulk_add<R: Record>(&self, records: &[R]) -> Result<()> {
        let txn = self.db.begin().await?;
        table::bulk_add(&txn, records).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Removes every row of the table. Returns the number removed.
    pub async fn clear<R: Record>(&self) -> Result<u64> {
        table::clear::<R, _>(&self.db).await
    }

    /// Reads a key-value marker.
    pub async fn get_state_value(&self, key: &str) -> Result<Option<String>> {
        system_state::get_value(&self.db, key).await
    }

    /// Writes a key-value marker.
    pub async fn set_state_value(&self, key: &str, value: &str) -> Result<()> {
        system_state::set_value(&self.db, key, value).await
    }
}

/// Several table operations applied atomically.
///
/// Dropping it without [`StoreTransaction::commit`] rolls everything back.
#[derive(Debug)]
pub struct StoreTransaction {
    txn: DatabaseTransaction,
}

impl StoreTransaction {
    /// Row with this id as seen inside this transaction.
    pub async fn get<R: Record>(&self, id: &str) -> Result<Option<R>> {
        table::get(&self.txn, id).await
    }

    /// Inserts a new row. Fails with [`Error::DuplicateKey`] if the id exists.
    pub async fn add<R: Record>(&self, record: &R) -> Result<R> {
        table::add(&self.txn, record).await
    }

    /// Inserts or replaces the row with the record's id.
    pub async fn put<R: Record>(&self, record: &R) -> Result<R> {
        table::put(&self.txn, record).await
    }

    /// Removes the row. Returns whether a row existed.
    pub async fn delete<R: Record>(&self, id: &str) -> Result<bool> {
        table::delete::<R, _>(&self.txn, id).await
    }

    /// Removes every row of the table. Returns the number removed.
    pub async fn clear<R: Record>(&self) -> Result<u64> {
        table::clear::<R, _>(&self.txn).await
    }

    /// Inserts many rows; fails with [`Error::DuplicateKey`] on any collision.
    pub async fn bulk_add<R: Record>(&self, records: &[R]) -> Result<()> {
        table::bulk_add(&self.txn, records).await
    }

    /// Number of rows in the table as seen inside this transaction.
    pub async fn count<R: Record>(&self) -> Result<u64> {
        table::count::<R, _>(&self.txn).await
    }

    /// Makes every change visible.
    pub async fn commit(self) -> Result<()> {
        self.txn.commit().await.map_err(Into::into)
    }

    /// Discards every change.
    pub async fn rollback(self) -> Result<()> {
        self.txn.rollback().await.map_err(Into::into)
    }
}
