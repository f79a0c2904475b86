//! Reservation book port: bookings, queries, and usage statistics.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::reservation::{
    CalendarWindow, Reservation, ReservationRequest, ReservationView,
};
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by reservation adapters.
    pub enum ReservationPersistenceError {
        /// Store connection could not be established or was lost.
        Connection { message: String } => "reservation store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "reservation store query failed: {message}",
        /// No reservation with the given id.
        NotFound => "reservation not found",
        /// The referenced field does not exist.
        FieldNotFound { field_id: i64 } => "field {field_id} does not exist",
        /// The referenced price does not exist.
        PriceNotFound { price_id: i64 } => "price {price_id} does not exist",
        /// The referenced field is flagged unavailable.
        FieldUnavailable { field_id: i64 } => "field {field_id} is not available",
        /// The requested range overlaps an uncancelled reservation.
        SlotTaken => "the requested slot is already reserved",
        /// The caller neither owns the reservation nor is an admin.
        NotOwner => "only the reservation owner may change it",
    }
}

/// A label with the number of reservations behind it, as returned by the
/// frequency statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageCount {
    pub label: String,
    pub count: i64,
}

/// Persists court reservations.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Book a slot. The field and price must exist, the field must be
    /// available, and the range must not overlap an uncancelled reservation
    /// on the same field.
    async fn create(
        &self,
        request: ReservationRequest,
    ) -> Result<Reservation, ReservationPersistenceError>;

    /// Reservations starting on the given calendar date, ordered by start.
    async fn list_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, ReservationPersistenceError>;

    /// Reservations starting at or after `now`, enriched with client, field,
    /// and price labels, ordered by start.
    async fn list_future(
        &self,
        now: NaiveDateTime,
    ) -> Result<Vec<ReservationView>, ReservationPersistenceError>;

    /// Move a reservation's start, shifting its end by the same delta. The
    /// overlap rule applies to the new range. Only the owner (or an admin)
    /// may reschedule.
    async fn reschedule(
        &self,
        id: i64,
        caller: UserId,
        caller_is_admin: bool,
        new_start: NaiveDateTime,
    ) -> Result<(), ReservationPersistenceError>;

    /// Set the cancelled flag. Idempotent; only the owner (or an admin) may
    /// cancel.
    async fn cancel(
        &self,
        id: i64,
        caller: UserId,
        caller_is_admin: bool,
    ) -> Result<(), ReservationPersistenceError>;

    /// The field with the most uncancelled reservations starting in
    /// `[since, now]`, if any reservation exists there.
    async fn most_reserved_field(
        &self,
        since: NaiveDateTime,
    ) -> Result<Option<UsageCount>, ReservationPersistenceError>;

    /// The most frequent start slot (HH:MM) among uncancelled reservations
    /// starting in `[since, now]`.
    async fn most_frequent_start(
        &self,
        since: NaiveDateTime,
    ) -> Result<Option<UsageCount>, ReservationPersistenceError>;

    /// Names of fields with zero uncancelled reservations starting inside
    /// the window.
    async fn unused_fields(
        &self,
        window: CalendarWindow,
    ) -> Result<Vec<String>, ReservationPersistenceError>;
}
