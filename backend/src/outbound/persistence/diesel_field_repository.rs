//! PostgreSQL-backed `FieldRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::field::{Field, FieldSpec};
use crate::domain::ports::{FieldPersistenceError, FieldRepository};

use super::error_mapping::{map_diesel_error_into, map_pool_error_into};
use super::models::{FieldChanges, FieldRow, NewFieldRow};
use super::pool::{DbPool, PoolError};
use super::schema::fields;

/// Diesel-backed implementation of the field reference-data port.
#[derive(Clone)]
pub struct DieselFieldRepository {
    pool: DbPool,
}

impl DieselFieldRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FieldPersistenceError {
    map_pool_error_into(error, FieldPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> FieldPersistenceError {
    map_diesel_error_into(
        error,
        FieldPersistenceError::query,
        FieldPersistenceError::connection,
    )
}

fn row_to_field(row: FieldRow) -> Field {
    Field {
        id: row.id,
        name: row.name,
        available: row.available,
    }
}

#[async_trait]
impl FieldRepository for DieselFieldRepository {
    async fn list(&self) -> Result<Vec<Field>, FieldPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FieldRow> = fields::table
            .select(FieldRow::as_select())
            .order_by(fields::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_field).collect())
    }

    async fn create(&self, spec: FieldSpec) -> Result<Field, FieldPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: FieldRow = diesel::insert_into(fields::table)
            .values(NewFieldRow {
                name: &spec.name,
                available: spec.available,
            })
            .returning(FieldRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_field(row))
    }

    async fn update(&self, id: i64, spec: FieldSpec) -> Result<(), FieldPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(fields::table.find(id))
            .set(FieldChanges {
                name: &spec.name,
                available: spec.available,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(FieldPersistenceError::not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), FieldPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(fields::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(FieldPersistenceError::not_found());
        }
        Ok(())
    }
}
