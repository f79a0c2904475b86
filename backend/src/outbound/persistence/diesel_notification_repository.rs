//! PostgreSQL-backed `NotificationRepository` implementation using Diesel
//! ORM.
//!
//! Fan-out runs inside a single transaction so an unresolvable recipient
//! leaves no partial batch behind.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::notification::{NotificationView, RecipientSpec};
use crate::domain::ports::{NotificationPersistenceError, NotificationRepository};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error_into, map_pool_error_into};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{notifications, users};

/// Diesel-backed implementation of the notification relay port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationPersistenceError {
    map_pool_error_into(error, NotificationPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationPersistenceError {
    map_diesel_error_into(
        error,
        NotificationPersistenceError::query,
        NotificationPersistenceError::connection,
    )
}

/// Transaction-internal error carrying either a Diesel failure or an
/// unresolvable recipient, so the batch rolls back in both cases.
enum FanOutError {
    Diesel(diesel::result::Error),
    RecipientNotFound(String),
}

impl From<diesel::result::Error> for FanOutError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<FanOutError> for NotificationPersistenceError {
    fn from(error: FanOutError) -> Self {
        match error {
            FanOutError::Diesel(error) => map_diesel_error(error),
            FanOutError::RecipientNotFound(email) => {
                NotificationPersistenceError::recipient_not_found(email)
            }
        }
    }
}

/// Display name in the `First Last` form the read views use.
fn display_name(first: &str, last: &str) -> String {
    format!("{first} {last}")
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn create_batch(
        &self,
        sender: UserId,
        recipients: &RecipientSpec,
        message: &str,
    ) -> Result<u32, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let recipients = recipients.clone();
        let created = conn
            .transaction::<u32, FanOutError, _>(|conn| {
                async move {
                    let recipient_ids: Vec<i64> = match &recipients {
                        RecipientSpec::AllClients => {
                            users::table
                                .filter(users::id.ne(sender.get()))
                                .select(users::id)
                                .order_by(users::id)
                                .load(conn)
                                .await?
                        }
                        RecipientSpec::Explicit(addresses) => {
                            let mut ids = Vec::with_capacity(addresses.len());
                            for address in addresses {
                                let id: Option<i64> = users::table
                                    .filter(users::email.eq(address.as_ref()))
                                    .select(users::id)
                                    .first(conn)
                                    .await
                                    .optional()?;
                                let id = id.ok_or_else(|| {
                                    FanOutError::RecipientNotFound(address.as_ref().to_owned())
                                })?;
                                ids.push(id);
                            }
                            ids
                        }
                    };

                    let rows: Vec<NewNotificationRow<'_>> = recipient_ids
                        .iter()
                        .map(|&recipient_id| NewNotificationRow {
                            sender_id: sender.get(),
                            recipient_id,
                            message,
                            read: false,
                        })
                        .collect();
                    let inserted = diesel::insert_into(notifications::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                    Ok(inserted as u32)
                }
                .scope_boxed()
            })
            .await?;
        Ok(created)
    }

    async fn list_for(
        &self,
        user: UserId,
    ) -> Result<Vec<NotificationView>, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NotificationRow> = notifications::table
            .filter(
                notifications::sender_id
                    .eq(user.get())
                    .or(notifications::recipient_id.eq(user.get())),
            )
            .select(NotificationRow::as_select())
            .order_by(notifications::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut involved: Vec<i64> = rows
            .iter()
            .flat_map(|row| [row.sender_id, row.recipient_id])
            .collect();
        involved.sort_unstable();
        involved.dedup();
        let people: Vec<(i64, String, String, String)> = users::table
            .filter(users::id.eq_any(&involved))
            .select((users::id, users::first_name, users::last_name, users::email))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let by_id: HashMap<i64, (String, String, String)> = people
            .into_iter()
            .map(|(id, first, last, email)| (id, (first, last, email)))
            .collect();

        let resolve = |id: i64| {
            by_id.get(&id).cloned().ok_or_else(|| {
                NotificationPersistenceError::query(format!("dangling user reference: {id}"))
            })
        };
        rows.into_iter()
            .map(|row| {
                let (sender_first, sender_last, sender_email) = resolve(row.sender_id)?;
                let (receiver_first, receiver_last, receiver_email) = resolve(row.recipient_id)?;
                Ok(NotificationView {
                    id: row.id,
                    sender: display_name(&sender_first, &sender_last),
                    sender_email,
                    receiver: display_name(&receiver_first, &receiver_last),
                    receiver_email,
                    message: row.message,
                    is_read: row.read,
                })
            })
            .collect()
    }

    async fn mark_read(
        &self,
        notification_id: i64,
        caller: UserId,
        is_read: bool,
    ) -> Result<(), NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let recipient_id: Option<i64> = notifications::table
            .find(notification_id)
            .select(notifications::recipient_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let recipient_id = recipient_id.ok_or_else(NotificationPersistenceError::not_found)?;
        if recipient_id != caller.get() {
            return Err(NotificationPersistenceError::not_recipient());
        }
        diesel::update(notifications::table.find(notification_id))
            .set(notifications::read.eq(is_read))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
