//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use super::schema::{fields, notifications, prices, reservations, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub nif: String,
    pub password_hash: String,
    pub role: String,
    #[expect(dead_code, reason = "schema field kept for audit queries")]
    pub created_at: NaiveDateTime,
}

/// Insertable struct for registering accounts. `id` and `created_at` are
/// assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub nif: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the notifications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub message: String,
    pub read: bool,
    #[expect(dead_code, reason = "schema field kept for audit queries")]
    pub created_at: NaiveDateTime,
}

/// Insertable struct for one fan-out row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub sender_id: i64,
    pub recipient_id: i64,
    pub message: &'a str,
    pub read: bool,
}

/// Row struct for reading from the fields table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = fields)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FieldRow {
    pub id: i64,
    pub name: String,
    pub available: bool,
}

/// Insertable struct for creating fields.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = fields)]
pub(crate) struct NewFieldRow<'a> {
    pub name: &'a str,
    pub available: bool,
}

/// Changeset struct for replacing a field's mutable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = fields)]
pub(crate) struct FieldChanges<'a> {
    pub name: &'a str,
    pub available: bool,
}

/// Row struct for reading from the prices table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PriceRow {
    pub id: i64,
    pub price_value: f64,
    pub price_type: String,
    pub start_time: NaiveDate,
    pub is_active: bool,
}

/// Insertable struct for creating price entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = prices)]
pub(crate) struct NewPriceRow<'a> {
    pub price_value: f64,
    pub price_type: &'a str,
    pub start_time: NaiveDate,
    pub is_active: bool,
}

/// Changeset struct for replacing a price entry's mutable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = prices)]
pub(crate) struct PriceChanges<'a> {
    pub price_value: f64,
    pub price_type: &'a str,
    pub start_time: NaiveDate,
    pub is_active: bool,
}

/// Row struct for reading from the reservations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReservationRow {
    pub id: i64,
    pub user_id: i64,
    pub field_id: i64,
    pub price_id: i64,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub cancelled: bool,
}

/// Insertable struct for booking a slot.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub(crate) struct NewReservationRow {
    pub user_id: i64,
    pub field_id: i64,
    pub price_id: i64,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub cancelled: bool,
}
