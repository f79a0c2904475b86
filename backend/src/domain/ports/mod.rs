//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod field_repository;
mod mailer;
mod notification_repository;
mod price_repository;
mod reservation_repository;
mod user_repository;

pub use field_repository::{FieldPersistenceError, FieldRepository};
pub use mailer::{Mailer, MailerError};
pub use notification_repository::{NotificationPersistenceError, NotificationRepository};
pub use price_repository::{PricePersistenceError, PriceRepository};
pub use reservation_repository::{
    ReservationPersistenceError, ReservationRepository, UsageCount,
};
pub use user_repository::{UserPersistenceError, UserRepository};
