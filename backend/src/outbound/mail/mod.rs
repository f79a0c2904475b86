//! Outbound mail adapters.

mod smtp;

pub use smtp::{SmtpConfig, SmtpMailer};
