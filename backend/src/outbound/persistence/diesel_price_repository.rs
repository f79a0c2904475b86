//! PostgreSQL-backed `PriceRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PricePersistenceError, PriceRepository};
use crate::domain::price::{Price, PriceSpec, PriceType};

use super::error_mapping::{map_diesel_error_into, map_pool_error_into};
use super::models::{NewPriceRow, PriceChanges, PriceRow};
use super::pool::{DbPool, PoolError};
use super::schema::prices;

/// Diesel-backed implementation of the price reference-data port.
#[derive(Clone)]
pub struct DieselPriceRepository {
    pool: DbPool,
}

impl DieselPriceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PricePersistenceError {
    map_pool_error_into(error, PricePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PricePersistenceError {
    map_diesel_error_into(
        error,
        PricePersistenceError::query,
        PricePersistenceError::connection,
    )
}

/// Convert a database row into a validated domain price.
fn row_to_price(row: PriceRow) -> Result<Price, PricePersistenceError> {
    let price_type = PriceType::new(row.price_type).map_err(|err| {
        PricePersistenceError::query(format!("stored price failed validation: {err}"))
    })?;
    Ok(Price {
        id: row.id,
        price_value: row.price_value,
        price_type,
        start_time: row.start_time,
        is_active: row.is_active,
    })
}

#[async_trait]
impl PriceRepository for DieselPriceRepository {
    async fn list(&self) -> Result<Vec<Price>, PricePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PriceRow> = prices::table
            .select(PriceRow::as_select())
            .order_by(prices::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_price).collect()
    }

    async fn create(&self, spec: PriceSpec) -> Result<Price, PricePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: PriceRow = diesel::insert_into(prices::table)
            .values(NewPriceRow {
                price_value: spec.price_value,
                price_type: spec.price_type.as_ref(),
                start_time: spec.start_time,
                is_active: spec.is_active,
            })
            .returning(PriceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_price(row)
    }

    async fn update(&self, id: i64, spec: PriceSpec) -> Result<(), PricePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(prices::table.find(id))
            .set(PriceChanges {
                price_value: spec.price_value,
                price_type: spec.price_type.as_ref(),
                start_time: spec.start_time,
                is_active: spec.is_active,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(PricePersistenceError::not_found());
        }
        Ok(())
    }
}
