//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every route lives under `/api/v1`; protected handlers take the
//! [`auth::AuthContext`] extractor and consult the credential store for
//! authorisation decisions.

use actix_web::web;

pub mod auth;
pub mod clients;
pub mod error;
pub mod fields;
pub mod health;
pub mod notifications;
pub mod prices;
pub mod reservations;
pub mod state;
pub mod statistics;
pub mod validation;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, crate::domain::Error>;

/// Register every API handler on the given config.
///
/// The caller provides the surrounding scope (`/api/v1`) so the server and
/// handler tests assemble the same surface.
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(clients::register)
        .service(clients::login)
        .service(clients::logout)
        .service(clients::refresh_token)
        .service(clients::recover_password)
        .service(clients::reset_password)
        .service(clients::change_password)
        .service(clients::get_profile)
        .service(clients::update_profile)
        .service(clients::delete_account)
        .service(clients::delete_account_post)
        .service(clients::list_clients)
        .service(clients::promote_to_admin)
        .service(clients::demote_to_regular)
        .service(notifications::create_notification)
        .service(notifications::list_notifications)
        .service(notifications::mark_notification_read)
        .service(fields::unused_fields)
        .service(fields::list_fields)
        .service(fields::create_field)
        .service(fields::update_field)
        .service(fields::delete_field)
        .service(prices::list_prices)
        .service(prices::create_price)
        .service(prices::update_price)
        .service(reservations::create_reservation)
        .service(reservations::reservations_for_date)
        .service(reservations::future_reservations)
        .service(reservations::reschedule_reservation)
        .service(reservations::cancel_reservation)
        .service(statistics::frequent_field)
        .service(statistics::frequent_time);
}
