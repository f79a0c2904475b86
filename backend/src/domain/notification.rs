//! Notification records and recipient resolution.

use serde::{Deserialize, Serialize};

use super::user::{EmailAddress, UserId, UserValidationError};

/// Reserved recipient address fanning a message out to every user except the
/// sender.
pub const ALL_CLIENTS_ALIAS: &str = "all.clients@gmail.com";

/// A persisted notification row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: i64,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub message: String,
    pub read: bool,
}

/// A notification enriched with sender and recipient display data at read
/// time. The names and addresses come from a join, not denormalised columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: i64,
    pub sender: String,
    pub sender_email: String,
    pub receiver: String,
    pub receiver_email: String,
    pub message: String,
    pub is_read: bool,
}

/// Parsed recipient list for one send call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientSpec {
    /// Every user except the sender.
    AllClients,
    /// One or more explicit addresses, each of which must resolve to a user.
    Explicit(Vec<EmailAddress>),
}

/// Failures while parsing the raw recipient field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipientParseError {
    #[error("recipient list must not be empty")]
    Empty,
    #[error("invalid recipient address: {address}")]
    InvalidAddress { address: String },
}

impl RecipientSpec {
    /// Parse the raw recipient field: either the reserved alias or a
    /// comma-separated list of addresses.
    pub fn parse(raw: &str) -> Result<Self, RecipientParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RecipientParseError::Empty);
        }
        if trimmed.eq_ignore_ascii_case(ALL_CLIENTS_ALIAS) {
            return Ok(Self::AllClients);
        }

        let mut addresses = Vec::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let address = EmailAddress::new(part).map_err(|_: UserValidationError| {
                RecipientParseError::InvalidAddress {
                    address: part.to_owned(),
                }
            })?;
            addresses.push(address);
        }
        if addresses.is_empty() {
            return Err(RecipientParseError::Empty);
        }
        Ok(Self::Explicit(addresses))
    }
}
