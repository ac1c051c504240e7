//! Generic table operations shared by [`super::EntityStore`] and
//! [`super::StoreTransaction`].

use super::{ColumnOf, Record, time::to_epoch_millis};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    SqlErr, sea_query::IntoCondition,
};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Rows per INSERT statement; keeps well under SQLite's bound-parameter limit.
const INSERT_CHUNK: usize = 64;

pub(super) async fn get<R: Record, C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<R>> {
    R::Entity::find()
        .filter(R::id_column().eq(id))
        .one(db)
        .await?
        .map(R::from_row)
        .transpose()
}

pub(super) async fn all<R: Record, C: ConnectionTrait>(db: &C) -> Result<Vec<R>> {
    R::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(R::from_row)
        .collect()
}

pub(super) async fn find_where<R: Record, C: ConnectionTrait>(
    db: &C,
    condition: impl IntoCondition,
) -> Result<Vec<R>> {
    R::Entity::find()
        .filter(condition)
        .all(db)
        .await?
        .into_iter()
        .map(R::from_row)
        .collect()
}

pub(super) async fn find_between<R: Record, C: ConnectionTrait>(
    db: &C,
    column: ColumnOf<R>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<R>> {
    find_where(
        db,
        column.between(to_epoch_millis(start), to_epoch_millis(end)),
    )
    .await
}

pub(super) async fn count<R: Record, C: ConnectionTrait>(db: &C) -> Result<u64> {
    Ok(R::Entity::find().count(db).await?)
}

async fn exists<R: Record, C: ConnectionTrait>(db: &C, id: &str) -> Result<bool> {
    let n = R::Entity::find()
        .filter(R::id_column().eq(id))
        .count(db)
        .await?;
    Ok(n > 0)
}

pub(super) async fn add<R: Record, C: ConnectionTrait>(db: &C, record: &R) -> Result<R> {
    if exists::<R, _>(db, record.id()).await? {
        warn!("Rejected duplicate id {} in {}", record.id(), R::TABLE);
        return Err(duplicate::<R>(record.id()));
    }
    insert_one(db, record).await
}

pub(super) async fn put<R: Record, C: ConnectionTrait>(db: &C, record: &R) -> Result<R> {
    delete::<R, _>(db, record.id()).await?;
    insert_one(db, record).await
}

async fn insert_one<R: Record, C: ConnectionTrait>(db: &C, record: &R) -> Result<R> {
    let row = record.to_row()?;
    R::Entity::insert(active::<R>(row.clone()))
        .exec_without_returning(db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => duplicate::<R>(record.id()),
            _ => Error::Database(e),
        })?;
    debug!("Stored {} in {}", record.id(), R::TABLE);
    R::from_row(row)
}

pub(super) async fn delete<R: Record, C: ConnectionTrait>(db: &C, id: &str) -> Result<bool> {
    let res = R::Entity::delete_many()
        .filter(R::id_column().eq(id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

pub(super) async fn bulk_add<R: Record, C: ConnectionTrait>(db: &C, records: &[R]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(duplicate::<R>(record.id()));
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        if exists::<R, _>(db, record.id()).await? {
            return Err(duplicate::<R>(record.id()));
        }
        rows.push(record.to_row()?);
    }

    for chunk in rows.chunks(INSERT_CHUNK) {
        R::Entity::insert_many(chunk.iter().cloned().map(active::<R>))
            .exec_without_returning(db)
            .await?;
    }
    debug!("Bulk-added {} rows to {}", records.len(), R::TABLE);
    Ok(())
}

pub(super) async fn clear<R: Record, C: ConnectionTrait>(db: &C) -> Result<u64> {
    let res = R::Entity::delete_many().exec(db).await?;
    debug!("Cleared {} rows from {}", res.rows_affected, R::TABLE);
    Ok(res.rows_affected)
}

fn active<R: Record>(row: R::Row) -> R::Active {
    row.into_active_model()
}

fn duplicate<R: Record>(id: &str) -> Error {
    Error::DuplicateKey {
        table: R::TABLE,
        id: id.to_string(),
    }
}
