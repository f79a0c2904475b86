//! SMTP implementation of the [`Mailer`] port backed by `lettre`.
//!
//! The adapter holds a pooled async transport; message assembly failures and
//! relay failures surface as distinct [`MailerError`] variants so callers can
//! log them apart.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::domain::ports::{Mailer, MailerError};
use crate::domain::user::EmailAddress;

/// Connection settings for the outbound SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay hostname.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Optional relay credentials.
    pub credentials: Option<(String, String)>,
    /// Sender address placed in the `From` header.
    pub from: String,
}

/// Sends password-reset mail through an SMTP relay.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from relay settings.
    ///
    /// Fails when the relay host cannot be resolved into transport parameters
    /// or the configured sender address does not parse as a mailbox.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|err| MailerError::invalid_message(format!("bad sender address: {err}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|err| MailerError::transport(err.to_string()))?
            .port(config.port);
        if let Some((username, password)) = &config.credentials {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn reset_message(&self, to: &EmailAddress, reset_url: &str) -> Result<Message, MailerError> {
        let to: Mailbox = to
            .as_ref()
            .parse()
            .map_err(|err| MailerError::invalid_message(format!("bad recipient: {err}")))?;
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Password reset request")
            .header(lettre::message::header::ContentType::TEXT_PLAIN)
            .body(reset_body(reset_url))
            .map_err(|err| MailerError::invalid_message(err.to_string()))
    }
}

fn reset_body(reset_url: &str) -> String {
    format!(
        "Hello,\n\n\
        A password reset was requested for your account.\n\n\
        Follow this link to choose a new password:\n\n\
        {reset_url}\n\n\
        The link expires in 24 hours. If you did not request a reset you can\n\
        safely ignore this mail.\n"
    )
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(
        &self,
        to: &EmailAddress,
        reset_url: &str,
    ) -> Result<(), MailerError> {
        let message = self.reset_message(to, reset_url)?;
        self.transport
            .send(message)
            .await
            .map_err(|err| MailerError::transport(err.to_string()))?;
        debug!(recipient = to.as_ref(), "password reset mail dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            port: 465,
            credentials: Some(("mailer".into(), "secret".into())),
            from: "Bookings <noreply@example.com>".into(),
        }
    }

    #[test]
    fn body_carries_the_reset_link() {
        let body = reset_body("https://app.example.com/reset/abc+def");
        assert!(body.contains("https://app.example.com/reset/abc+def"));
        assert!(body.contains("expires in 24 hours"));
    }

    #[tokio::test]
    async fn builds_a_plain_text_reset_message() {
        let mailer = SmtpMailer::new(&config()).expect("mailer should build");
        let to = EmailAddress::new("client@example.com").expect("valid address");
        let message = mailer
            .reset_message(&to, "https://app.example.com/reset/tok")
            .expect("message should assemble");
        let rendered = String::from_utf8(message.formatted()).expect("utf8 message");
        assert!(rendered.contains("To: client@example.com"));
        assert!(rendered.contains("Subject: Password reset request"));
    }

    #[test]
    fn rejects_an_unparsable_sender() {
        let mut bad = config();
        bad.from = "not a mailbox".into();
        let err = SmtpMailer::new(&bad).expect_err("sender must be a mailbox");
        assert!(matches!(err, MailerError::InvalidMessage { .. }));
    }
}
