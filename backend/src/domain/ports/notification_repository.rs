//! Notification relay port and its errors.

use async_trait::async_trait;

use crate::domain::notification::{NotificationView, RecipientSpec};
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by notification adapters.
    pub enum NotificationPersistenceError {
        /// Store connection could not be established or was lost.
        Connection { message: String } => "notification store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification store query failed: {message}",
        /// An explicit recipient email resolved to no user; the batch was
        /// rolled back.
        RecipientNotFound { email: String } => "recipient not found: {email}",
        /// No notification with the given id.
        NotFound => "notification not found",
        /// The caller is not the notification's recipient.
        NotRecipient => "only the recipient may update this notification",
    }
}

/// Persists notifications and answers the enriched read queries.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Fan a message out to the resolved recipients, one row per recipient,
    /// all within a single transaction. The alias resolves to every user
    /// except the sender; the first unresolvable explicit address aborts the
    /// whole batch with [`NotificationPersistenceError::RecipientNotFound`].
    ///
    /// Returns the number of rows created.
    async fn create_batch(
        &self,
        sender: UserId,
        recipients: &RecipientSpec,
        message: &str,
    ) -> Result<u32, NotificationPersistenceError>;

    /// Every notification the user sent or received, ordered by id, each
    /// enriched with sender and recipient display data.
    async fn list_for(
        &self,
        user: UserId,
    ) -> Result<Vec<NotificationView>, NotificationPersistenceError>;

    /// Set the read flag. Only the recipient may do this; anyone else gets
    /// [`NotificationPersistenceError::NotRecipient`] and the flag is
    /// unchanged.
    async fn mark_read(
        &self,
        notification_id: i64,
        caller: UserId,
        is_read: bool,
    ) -> Result<(), NotificationPersistenceError>;
}
