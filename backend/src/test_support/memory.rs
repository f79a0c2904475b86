//! In-memory port implementations backing handler tests.
//!
//! Each adapter keeps its rows behind a `tokio::sync::Mutex` and hands out
//! clones. Cross-store rules (recipient resolution, field availability, the
//! overlap check) are enforced the same way the database adapters enforce
//! them so handler tests observe realistic error paths. Account and field
//! deletes cascade into dependent rows the way the schema's foreign keys do.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, Weak};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::field::{Field, FieldSpec};
use crate::domain::notification::{Notification, NotificationView, RecipientSpec};
use crate::domain::ports::{
    FieldPersistenceError, FieldRepository, NotificationPersistenceError, NotificationRepository,
    PricePersistenceError, PriceRepository, ReservationPersistenceError, ReservationRepository,
    UsageCount, UserPersistenceError, UserRepository,
};
use crate::domain::price::{Price, PriceSpec};
use crate::domain::reservation::{
    CalendarWindow, Reservation, ReservationRequest, ReservationView,
};
use crate::domain::user::{EmailAddress, NewUser, ProfileUpdate, User, UserId};
use crate::domain::Role;

struct UserRows {
    rows: Vec<User>,
    next_id: i64,
}

/// Stores whose rows follow a deleted account, mirroring the
/// `ON DELETE CASCADE` constraints in the schema.
struct UserDependents {
    notifications: Weak<InMemoryNotifications>,
    reservations: Weak<InMemoryReservations>,
}

/// In-memory credential store.
pub struct InMemoryUsers {
    data: Mutex<UserRows>,
    dependents: OnceLock<UserDependents>,
}

impl Default for InMemoryUsers {
    fn default() -> Self {
        Self {
            data: Mutex::new(UserRows {
                rows: Vec::new(),
                next_id: 1,
            }),
            dependents: OnceLock::new(),
        }
    }
}

impl InMemoryUsers {
    /// Wires the stores that cascade when an account is deleted.
    pub fn cascade_into(
        &self,
        notifications: &Arc<InMemoryNotifications>,
        reservations: &Arc<InMemoryReservations>,
    ) {
        let _ = self.dependents.set(UserDependents {
            notifications: Arc::downgrade(notifications),
            reservations: Arc::downgrade(reservations),
        });
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        let mut data = self.data.lock().await;
        if data.rows.iter().any(|row| row.email() == &user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        let id = UserId(data.next_id);
        data.next_id += 1;
        let row = User::new(
            id,
            user.first_name,
            user.last_name,
            user.email,
            user.phone_number,
            user.nif,
            user.password_hash,
            user.role,
        );
        data.rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let data = self.data.lock().await;
        Ok(data.rows.iter().find(|row| row.email() == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let data = self.data.lock().await;
        Ok(data.rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let data = self.data.lock().await;
        Ok(data.rows.clone())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<(), UserPersistenceError> {
        let mut data = self.data.lock().await;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(UserPersistenceError::not_found)?;
        *row = User::new(
            row.id(),
            update.first_name.unwrap_or_else(|| row.first_name().clone()),
            update.last_name.unwrap_or_else(|| row.last_name().clone()),
            row.email().clone(),
            update
                .phone_number
                .unwrap_or_else(|| row.phone_number().clone()),
            row.nif().clone(),
            row.password_hash().to_owned(),
            row.role(),
        );
        Ok(())
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: String,
    ) -> Result<(), UserPersistenceError> {
        let mut data = self.data.lock().await;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(UserPersistenceError::not_found)?;
        *row = User::new(
            row.id(),
            row.first_name().clone(),
            row.last_name().clone(),
            row.email().clone(),
            row.phone_number().clone(),
            row.nif().clone(),
            password_hash,
            row.role(),
        );
        Ok(())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), UserPersistenceError> {
        let mut data = self.data.lock().await;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(UserPersistenceError::not_found)?;
        *row = User::new(
            row.id(),
            row.first_name().clone(),
            row.last_name().clone(),
            row.email().clone(),
            row.phone_number().clone(),
            row.nif().clone(),
            row.password_hash().to_owned(),
            role,
        );
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        {
            let mut data = self.data.lock().await;
            let before = data.rows.len();
            data.rows.retain(|row| row.id() != id);
            if data.rows.len() == before {
                return Err(UserPersistenceError::not_found());
            }
        }
        if let Some(dependents) = self.dependents.get() {
            if let Some(notifications) = dependents.notifications.upgrade() {
                let mut data = notifications.data.lock().await;
                data.rows
                    .retain(|row| row.sender_id != id && row.recipient_id != id);
            }
            if let Some(reservations) = dependents.reservations.upgrade() {
                let mut data = reservations.data.lock().await;
                data.rows.retain(|row| row.user_id != id);
            }
        }
        Ok(())
    }
}

struct NotificationRows {
    rows: Vec<Notification>,
    next_id: i64,
}

/// In-memory notification store. Recipient resolution goes through the
/// shared [`InMemoryUsers`] handle, like the database adapter's join.
pub struct InMemoryNotifications {
    users: Arc<InMemoryUsers>,
    data: Mutex<NotificationRows>,
}

impl InMemoryNotifications {
    pub fn new(users: Arc<InMemoryUsers>) -> Self {
        Self {
            users,
            data: Mutex::new(NotificationRows {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotifications {
    async fn create_batch(
        &self,
        sender: UserId,
        recipients: &RecipientSpec,
        message: &str,
    ) -> Result<u32, NotificationPersistenceError> {
        let recipient_ids = {
            let users = self.users.data.lock().await;
            match recipients {
                RecipientSpec::AllClients => users
                    .rows
                    .iter()
                    .map(User::id)
                    .filter(|id| *id != sender)
                    .collect::<Vec<_>>(),
                RecipientSpec::Explicit(addresses) => {
                    let mut ids = Vec::with_capacity(addresses.len());
                    for address in addresses {
                        let user = users
                            .rows
                            .iter()
                            .find(|row| row.email() == address)
                            .ok_or_else(|| {
                                NotificationPersistenceError::recipient_not_found(address.as_ref())
                            })?;
                        ids.push(user.id());
                    }
                    ids
                }
            }
        };

        let mut data = self.data.lock().await;
        for recipient_id in &recipient_ids {
            let id = data.next_id;
            data.next_id += 1;
            data.rows.push(Notification {
                id,
                sender_id: sender,
                recipient_id: *recipient_id,
                message: message.to_owned(),
                read: false,
            });
        }
        Ok(recipient_ids.len() as u32)
    }

    async fn list_for(
        &self,
        user: UserId,
    ) -> Result<Vec<NotificationView>, NotificationPersistenceError> {
        let users = self.users.data.lock().await;
        let data = self.data.lock().await;
        let mut views = Vec::new();
        for row in data
            .rows
            .iter()
            .filter(|row| row.sender_id == user || row.recipient_id == user)
        {
            // Inner-join semantics: rows pointing at deleted accounts vanish.
            let Some(sender) = users.rows.iter().find(|u| u.id() == row.sender_id) else {
                continue;
            };
            let Some(receiver) = users.rows.iter().find(|u| u.id() == row.recipient_id) else {
                continue;
            };
            views.push(NotificationView {
                id: row.id,
                sender: sender.display_name(),
                sender_email: sender.email().as_ref().to_owned(),
                receiver: receiver.display_name(),
                receiver_email: receiver.email().as_ref().to_owned(),
                message: row.message.clone(),
                is_read: row.read,
            });
        }
        Ok(views)
    }

    async fn mark_read(
        &self,
        notification_id: i64,
        caller: UserId,
        is_read: bool,
    ) -> Result<(), NotificationPersistenceError> {
        let mut data = self.data.lock().await;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row.id == notification_id)
            .ok_or_else(NotificationPersistenceError::not_found)?;
        if row.recipient_id != caller {
            return Err(NotificationPersistenceError::not_recipient());
        }
        row.read = is_read;
        Ok(())
    }
}

struct FieldRows {
    rows: Vec<Field>,
    next_id: i64,
}

/// In-memory field store.
pub struct InMemoryFields {
    data: Mutex<FieldRows>,
    reservations: OnceLock<Weak<InMemoryReservations>>,
}

impl Default for InMemoryFields {
    fn default() -> Self {
        Self {
            data: Mutex::new(FieldRows {
                rows: Vec::new(),
                next_id: 1,
            }),
            reservations: OnceLock::new(),
        }
    }
}

impl InMemoryFields {
    /// Wires the reservation book that cascades when a field is deleted.
    pub fn cascade_into(&self, reservations: &Arc<InMemoryReservations>) {
        let _ = self.reservations.set(Arc::downgrade(reservations));
    }
}

#[async_trait]
impl FieldRepository for InMemoryFields {
    async fn list(&self) -> Result<Vec<Field>, FieldPersistenceError> {
        let data = self.data.lock().await;
        Ok(data.rows.clone())
    }

    async fn create(&self, spec: FieldSpec) -> Result<Field, FieldPersistenceError> {
        let mut data = self.data.lock().await;
        let id = data.next_id;
        data.next_id += 1;
        let row = Field {
            id,
            name: spec.name,
            available: spec.available,
        };
        data.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, spec: FieldSpec) -> Result<(), FieldPersistenceError> {
        let mut data = self.data.lock().await;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(FieldPersistenceError::not_found)?;
        row.name = spec.name;
        row.available = spec.available;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), FieldPersistenceError> {
        {
            let mut data = self.data.lock().await;
            let before = data.rows.len();
            data.rows.retain(|row| row.id != id);
            if data.rows.len() == before {
                return Err(FieldPersistenceError::not_found());
            }
        }
        if let Some(reservations) = self.reservations.get().and_then(Weak::upgrade) {
            let mut data = reservations.data.lock().await;
            data.rows.retain(|row| row.field_id != id);
        }
        Ok(())
    }
}

struct PriceRows {
    rows: Vec<Price>,
    next_id: i64,
}

/// In-memory price store.
pub struct InMemoryPrices {
    data: Mutex<PriceRows>,
}

impl Default for InMemoryPrices {
    fn default() -> Self {
        Self {
            data: Mutex::new(PriceRows {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl PriceRepository for InMemoryPrices {
    async fn list(&self) -> Result<Vec<Price>, PricePersistenceError> {
        let data = self.data.lock().await;
        Ok(data.rows.clone())
    }

    async fn create(&self, spec: PriceSpec) -> Result<Price, PricePersistenceError> {
        let mut data = self.data.lock().await;
        let id = data.next_id;
        data.next_id += 1;
        let row = Price {
            id,
            price_value: spec.price_value,
            price_type: spec.price_type,
            start_time: spec.start_time,
            is_active: spec.is_active,
        };
        data.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, spec: PriceSpec) -> Result<(), PricePersistenceError> {
        let mut data = self.data.lock().await;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(PricePersistenceError::not_found)?;
        row.price_value = spec.price_value;
        row.price_type = spec.price_type;
        row.start_time = spec.start_time;
        row.is_active = spec.is_active;
        Ok(())
    }
}

struct ReservationRows {
    rows: Vec<Reservation>,
    next_id: i64,
}

/// In-memory reservation book. Referential checks and the read-time joins go
/// through the shared store handles.
pub struct InMemoryReservations {
    users: Arc<InMemoryUsers>,
    fields: Arc<InMemoryFields>,
    prices: Arc<InMemoryPrices>,
    data: Mutex<ReservationRows>,
}

impl InMemoryReservations {
    pub fn new(
        users: Arc<InMemoryUsers>,
        fields: Arc<InMemoryFields>,
        prices: Arc<InMemoryPrices>,
    ) -> Self {
        Self {
            users,
            fields,
            prices,
            data: Mutex::new(ReservationRows {
                rows: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservations {
    async fn create(
        &self,
        request: ReservationRequest,
    ) -> Result<Reservation, ReservationPersistenceError> {
        {
            let fields = self.fields.data.lock().await;
            let field = fields
                .rows
                .iter()
                .find(|field| field.id == request.field_id)
                .ok_or_else(|| {
                    ReservationPersistenceError::field_not_found(request.field_id)
                })?;
            if !field.available {
                return Err(ReservationPersistenceError::field_unavailable(
                    request.field_id,
                ));
            }
        }
        {
            let prices = self.prices.data.lock().await;
            if !prices.rows.iter().any(|price| price.id == request.price_id) {
                return Err(ReservationPersistenceError::price_not_found(
                    request.price_id,
                ));
            }
        }

        let mut data = self.data.lock().await;
        if data.rows.iter().any(|row| {
            row.field_id == request.field_id && row.overlaps(request.starts_at, request.ends_at)
        }) {
            return Err(ReservationPersistenceError::slot_taken());
        }
        let id = data.next_id;
        data.next_id += 1;
        let row = Reservation {
            id,
            user_id: request.user_id,
            field_id: request.field_id,
            price_id: request.price_id,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            cancelled: false,
        };
        data.rows.push(row.clone());
        Ok(row)
    }

    async fn list_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, ReservationPersistenceError> {
        let data = self.data.lock().await;
        let mut rows: Vec<Reservation> = data
            .rows
            .iter()
            .filter(|row| !row.cancelled && row.starts_at.date() == date)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.starts_at);
        Ok(rows)
    }

    async fn list_future(
        &self,
        now: NaiveDateTime,
    ) -> Result<Vec<ReservationView>, ReservationPersistenceError> {
        let users = self.users.data.lock().await;
        let fields = self.fields.data.lock().await;
        let prices = self.prices.data.lock().await;
        let data = self.data.lock().await;

        let mut rows: Vec<&Reservation> = data
            .rows
            .iter()
            .filter(|row| row.starts_at >= now)
            .collect();
        rows.sort_by_key(|row| row.starts_at);

        let mut views = Vec::new();
        for row in rows {
            let Some(client) = users.rows.iter().find(|u| u.id() == row.user_id) else {
                continue;
            };
            let Some(field) = fields.rows.iter().find(|f| f.id == row.field_id) else {
                continue;
            };
            let Some(price) = prices.rows.iter().find(|p| p.id == row.price_id) else {
                continue;
            };
            views.push(ReservationView {
                id: row.id,
                client: client.display_name(),
                date: row.starts_at.date(),
                initial_time: row.starts_at.format("%H:%M:%S").to_string(),
                end_time: row.ends_at.format("%H:%M:%S").to_string(),
                field: field.name.clone(),
                price: price.price_type.as_ref().to_owned(),
                cancelled: row.cancelled,
            });
        }
        Ok(views)
    }

    async fn reschedule(
        &self,
        id: i64,
        caller: UserId,
        caller_is_admin: bool,
        new_start: NaiveDateTime,
    ) -> Result<(), ReservationPersistenceError> {
        let mut data = self.data.lock().await;
        let current = data
            .rows
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or_else(ReservationPersistenceError::not_found)?;
        if current.user_id != caller && !caller_is_admin {
            return Err(ReservationPersistenceError::not_owner());
        }
        let new_end = new_start + (current.ends_at - current.starts_at);
        if data.rows.iter().any(|other| {
            other.id != id && other.field_id == current.field_id && other.overlaps(new_start, new_end)
        }) {
            return Err(ReservationPersistenceError::slot_taken());
        }
        if let Some(row) = data.rows.iter_mut().find(|row| row.id == id) {
            row.starts_at = new_start;
            row.ends_at = new_end;
        }
        Ok(())
    }

    async fn cancel(
        &self,
        id: i64,
        caller: UserId,
        caller_is_admin: bool,
    ) -> Result<(), ReservationPersistenceError> {
        let mut data = self.data.lock().await;
        let row = data
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(ReservationPersistenceError::not_found)?;
        if row.user_id != caller && !caller_is_admin {
            return Err(ReservationPersistenceError::not_owner());
        }
        row.cancelled = true;
        Ok(())
    }

    async fn most_reserved_field(
        &self,
        since: NaiveDateTime,
    ) -> Result<Option<UsageCount>, ReservationPersistenceError> {
        let now = Utc::now().naive_utc();
        let fields = self.fields.data.lock().await;
        let data = self.data.lock().await;
        let mut best: Option<UsageCount> = None;
        for field in &fields.rows {
            let count = data
                .rows
                .iter()
                .filter(|row| {
                    row.field_id == field.id
                        && !row.cancelled
                        && row.starts_at >= since
                        && row.starts_at <= now
                })
                .count() as i64;
            if count == 0 {
                continue;
            }
            let improves = match &best {
                None => true,
                Some(current) => count > current.count,
            };
            if improves {
                best = Some(UsageCount {
                    label: field.name.clone(),
                    count,
                });
            }
        }
        Ok(best)
    }

    async fn most_frequent_start(
        &self,
        since: NaiveDateTime,
    ) -> Result<Option<UsageCount>, ReservationPersistenceError> {
        let now = Utc::now().naive_utc();
        let data = self.data.lock().await;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for row in data
            .rows
            .iter()
            .filter(|row| !row.cancelled && row.starts_at >= since && row.starts_at <= now)
        {
            *counts
                .entry(row.starts_at.format("%H:%M").to_string())
                .or_insert(0) += 1;
        }
        // Ties resolve to the earliest slot.
        Ok(counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(label, count)| UsageCount { label, count }))
    }

    async fn unused_fields(
        &self,
        window: CalendarWindow,
    ) -> Result<Vec<String>, ReservationPersistenceError> {
        let fields = self.fields.data.lock().await;
        let data = self.data.lock().await;
        let mut names = Vec::new();
        for field in &fields.rows {
            let used = data.rows.iter().any(|row| {
                row.field_id == field.id
                    && !row.cancelled
                    && row.starts_at.date() >= window.start
                    && row.starts_at.date() < window.end
            });
            if !used {
                names.push(field.name.clone());
            }
        }
        Ok(names)
    }
}
