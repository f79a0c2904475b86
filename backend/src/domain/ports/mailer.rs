//! Outbound mail port used by the password reset flow.

use async_trait::async_trait;

use crate::domain::user::EmailAddress;

use super::macros::define_port_error;

define_port_error! {
    /// Failures raised by mail dispatch adapters.
    pub enum MailerError {
        /// The message could not be assembled.
        InvalidMessage { message: String } => "could not build mail message: {message}",
        /// The relay rejected or never received the message.
        Transport { message: String } => "mail transport failed: {message}",
    }
}

/// Sends the password-reset mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a reset mail pointing at `reset_url` to the given address.
    async fn send_password_reset(
        &self,
        to: &EmailAddress,
        reset_url: &str,
    ) -> Result<(), MailerError>;
}
