//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: All database errors are mapped to the
//!   domain's port error types.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/booking")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_field_repository;
mod diesel_notification_repository;
mod diesel_price_repository;
mod diesel_reservation_repository;
mod diesel_user_repository;
mod error_mapping;
pub mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_field_repository::DieselFieldRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_price_repository::DieselPriceRepository;
pub use diesel_reservation_repository::DieselReservationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
