//! PostgreSQL-backed `ReservationRepository` implementation using Diesel
//! ORM.
//!
//! Booking and rescheduling run inside transactions so the overlap check and
//! the write see the same state.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{ReservationPersistenceError, ReservationRepository, UsageCount};
use crate::domain::reservation::{
    CalendarWindow, Reservation, ReservationRequest, ReservationView,
};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error_into, map_pool_error_into};
use super::models::{NewReservationRow, ReservationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{fields, prices, reservations, users};

const TIME_FORMAT: &str = "%H:%M:%S";

/// Diesel-backed implementation of the reservation book port.
#[derive(Clone)]
pub struct DieselReservationRepository {
    pool: DbPool,
}

impl DieselReservationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReservationPersistenceError {
    map_pool_error_into(error, ReservationPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReservationPersistenceError {
    map_diesel_error_into(
        error,
        ReservationPersistenceError::query,
        ReservationPersistenceError::connection,
    )
}

/// Transaction-internal error: a Diesel failure or a booking-rule breach.
/// Both roll the transaction back.
enum BookingError {
    Diesel(diesel::result::Error),
    Domain(ReservationPersistenceError),
}

impl From<diesel::result::Error> for BookingError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<BookingError> for ReservationPersistenceError {
    fn from(error: BookingError) -> Self {
        match error {
            BookingError::Diesel(error) => map_diesel_error(error),
            BookingError::Domain(error) => error,
        }
    }
}

fn row_to_reservation(row: ReservationRow) -> Reservation {
    Reservation {
        id: row.id,
        user_id: UserId::from(row.user_id),
        field_id: row.field_id,
        price_id: row.price_id,
        starts_at: row.starts_at,
        ends_at: row.ends_at,
        cancelled: row.cancelled,
    }
}

/// Whether any uncancelled reservation on the field collides with the
/// half-open range, ignoring `exclude_id` when rescheduling.
async fn slot_taken(
    conn: &mut AsyncPgConnection,
    field_id: i64,
    starts_at: NaiveDateTime,
    ends_at: NaiveDateTime,
    exclude_id: Option<i64>,
) -> Result<bool, diesel::result::Error> {
    let mut query = reservations::table
        .filter(reservations::field_id.eq(field_id))
        .filter(reservations::cancelled.eq(false))
        .filter(reservations::starts_at.lt(ends_at))
        .filter(reservations::ends_at.gt(starts_at))
        .into_boxed();
    if let Some(id) = exclude_id {
        query = query.filter(reservations::id.ne(id));
    }
    let collisions: i64 = query.count().get_result(conn).await?;
    Ok(collisions > 0)
}

#[async_trait]
impl ReservationRepository for DieselReservationRepository {
    async fn create(
        &self,
        request: ReservationRequest,
    ) -> Result<Reservation, ReservationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = conn
            .transaction::<ReservationRow, BookingError, _>(|conn| {
                async move {
                    let available: Option<bool> = fields::table
                        .find(request.field_id)
                        .select(fields::available)
                        .first(conn)
                        .await
                        .optional()?;
                    match available {
                        None => {
                            return Err(BookingError::Domain(
                                ReservationPersistenceError::field_not_found(request.field_id),
                            ));
                        }
                        Some(false) => {
                            return Err(BookingError::Domain(
                                ReservationPersistenceError::field_unavailable(request.field_id),
                            ));
                        }
                        Some(true) => {}
                    }
                    let price_exists: Option<i64> = prices::table
                        .find(request.price_id)
                        .select(prices::id)
                        .first(conn)
                        .await
                        .optional()?;
                    if price_exists.is_none() {
                        return Err(BookingError::Domain(
                            ReservationPersistenceError::price_not_found(request.price_id),
                        ));
                    }
                    if slot_taken(conn, request.field_id, request.starts_at, request.ends_at, None)
                        .await?
                    {
                        return Err(BookingError::Domain(
                            ReservationPersistenceError::slot_taken(),
                        ));
                    }

                    let row: ReservationRow = diesel::insert_into(reservations::table)
                        .values(NewReservationRow {
                            user_id: request.user_id.get(),
                            field_id: request.field_id,
                            price_id: request.price_id,
                            starts_at: request.starts_at,
                            ends_at: request.ends_at,
                            cancelled: false,
                        })
                        .returning(ReservationRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;
        Ok(row_to_reservation(row))
    }

    async fn list_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, ReservationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + chrono::Duration::days(1);
        let rows: Vec<ReservationRow> = reservations::table
            .filter(reservations::starts_at.ge(day_start))
            .filter(reservations::starts_at.lt(day_end))
            .filter(reservations::cancelled.eq(false))
            .select(ReservationRow::as_select())
            .order_by(reservations::starts_at)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_reservation).collect())
    }

    async fn list_future(
        &self,
        now: NaiveDateTime,
    ) -> Result<Vec<ReservationView>, ReservationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ReservationRow, String, String, String, String)> = reservations::table
            .inner_join(users::table)
            .inner_join(fields::table)
            .inner_join(prices::table)
            .filter(reservations::starts_at.ge(now))
            .select((
                ReservationRow::as_select(),
                users::first_name,
                users::last_name,
                fields::name,
                prices::price_type,
            ))
            .order_by(reservations::starts_at)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, first, last, field, price)| ReservationView {
                id: row.id,
                client: format!("{first} {last}"),
                date: row.starts_at.date(),
                initial_time: row.starts_at.format(TIME_FORMAT).to_string(),
                end_time: row.ends_at.format(TIME_FORMAT).to_string(),
                field,
                price,
                cancelled: row.cancelled,
            })
            .collect())
    }

    async fn reschedule(
        &self,
        id: i64,
        caller: UserId,
        caller_is_admin: bool,
        new_start: NaiveDateTime,
    ) -> Result<(), ReservationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<(), BookingError, _>(|conn| {
            async move {
                let row: Option<ReservationRow> = reservations::table
                    .find(id)
                    .select(ReservationRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                let row = row.ok_or_else(|| {
                    BookingError::Domain(ReservationPersistenceError::not_found())
                })?;
                if row.user_id != caller.get() && !caller_is_admin {
                    return Err(BookingError::Domain(
                        ReservationPersistenceError::not_owner(),
                    ));
                }
                let new_end = new_start + (row.ends_at - row.starts_at);
                if slot_taken(conn, row.field_id, new_start, new_end, Some(id)).await? {
                    return Err(BookingError::Domain(
                        ReservationPersistenceError::slot_taken(),
                    ));
                }
                diesel::update(reservations::table.find(id))
                    .set((
                        reservations::starts_at.eq(new_start),
                        reservations::ends_at.eq(new_end),
                    ))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await?;
        Ok(())
    }

    async fn cancel(
        &self,
        id: i64,
        caller: UserId,
        caller_is_admin: bool,
    ) -> Result<(), ReservationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner_id: Option<i64> = reservations::table
            .find(id)
            .select(reservations::user_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let owner_id = owner_id.ok_or_else(ReservationPersistenceError::not_found)?;
        if owner_id != caller.get() && !caller_is_admin {
            return Err(ReservationPersistenceError::not_owner());
        }
        diesel::update(reservations::table.find(id))
            .set(reservations::cancelled.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn most_reserved_field(
        &self,
        since: NaiveDateTime,
    ) -> Result<Option<UsageCount>, ReservationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = chrono::Utc::now().naive_utc();
        let top: Option<(String, i64)> = reservations::table
            .inner_join(fields::table)
            .filter(reservations::cancelled.eq(false))
            .filter(reservations::starts_at.ge(since))
            .filter(reservations::starts_at.le(now))
            .group_by(fields::name)
            .select((fields::name, diesel::dsl::count_star()))
            .order_by((diesel::dsl::count_star().desc(), fields::name))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(top.map(|(label, count)| UsageCount { label, count }))
    }

    async fn most_frequent_start(
        &self,
        since: NaiveDateTime,
    ) -> Result<Option<UsageCount>, ReservationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = chrono::Utc::now().naive_utc();
        let starts: Vec<NaiveDateTime> = reservations::table
            .filter(reservations::cancelled.eq(false))
            .filter(reservations::starts_at.ge(since))
            .filter(reservations::starts_at.le(now))
            .select(reservations::starts_at)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for start in starts {
            *counts.entry(start.format("%H:%M").to_string()).or_insert(0) += 1;
        }
        // Ties resolve to the earliest slot.
        Ok(counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(label, count)| UsageCount { label, count }))
    }

    async fn unused_fields(
        &self,
        window: CalendarWindow,
    ) -> Result<Vec<String>, ReservationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let window_start = window.start.and_time(NaiveTime::MIN);
        let window_end = window.end.and_time(NaiveTime::MIN);
        let used = reservations::table
            .filter(reservations::cancelled.eq(false))
            .filter(reservations::starts_at.ge(window_start))
            .filter(reservations::starts_at.lt(window_end))
            .select(reservations::field_id);
        let names: Vec<String> = fields::table
            .filter(fields::id.ne_all(used))
            .select(fields::name)
            .order_by(fields::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(names)
    }
}
