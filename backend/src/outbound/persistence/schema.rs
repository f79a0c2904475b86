//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, update this file to match
//! (`diesel print-schema` can regenerate it from a live database).

diesel::table! {
    /// Registered accounts.
    ///
    /// `email` carries a unique index; `role` holds the lowercase role name.
    users (id) {
        /// Primary key, assigned by the database.
        id -> Int8,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Varchar,
        phone_number -> Varchar,
        nif -> Varchar,
        /// Argon2id hash in PHC string form.
        password_hash -> Varchar,
        role -> Varchar,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// One row per recipient of a sent message.
    notifications (id) {
        id -> Int8,
        sender_id -> Int8,
        recipient_id -> Int8,
        message -> Text,
        read -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// Bookable courts.
    fields (id) {
        id -> Int8,
        name -> Varchar,
        available -> Bool,
    }
}

diesel::table! {
    /// Slot price entries.
    prices (id) {
        id -> Int8,
        price_value -> Float8,
        /// Slot descriptor such as `SEMANA_19H30_21H00`.
        price_type -> Varchar,
        start_time -> Date,
        is_active -> Bool,
    }
}

diesel::table! {
    /// Court bookings. Uncancelled rows on one field never overlap.
    reservations (id) {
        id -> Int8,
        user_id -> Int8,
        field_id -> Int8,
        price_id -> Int8,
        starts_at -> Timestamp,
        ends_at -> Timestamp,
        cancelled -> Bool,
    }
}

diesel::joinable!(reservations -> fields (field_id));
diesel::joinable!(reservations -> prices (price_id));
diesel::joinable!(reservations -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, notifications, fields, prices, reservations);
