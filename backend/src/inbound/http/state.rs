//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::domain::ports::{
    FieldRepository, Mailer, NotificationRepository, PriceRepository, ReservationRepository,
    UserRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub fields: Arc<dyn FieldRepository>,
    pub prices: Arc<dyn PriceRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: Arc<TokenService>,
    /// Base URL the password-recovery mail points the user at; the reset
    /// token is appended as the final path segment.
    pub reset_url_base: String,
}
