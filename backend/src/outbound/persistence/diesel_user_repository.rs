//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::{
    EmailAddress, NewUser, PersonName, PhoneNumber, ProfileUpdate, TaxId, User, UserId,
};
use crate::domain::Role;

use super::error_mapping::{map_diesel_error_into, map_pool_error_into};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the credential store port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error_into(error, UserPersistenceError::connection)
}

/// Map Diesel errors, turning unique violations on the email index into
/// [`UserPersistenceError::DuplicateEmail`].
fn map_diesel_error(email: &str) -> impl Fn(diesel::result::Error) -> UserPersistenceError + '_ {
    move |error| {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};
        if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
            return UserPersistenceError::duplicate_email(email);
        }
        map_basic(error)
    }
}

fn map_basic(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error_into(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a database row into a validated domain user.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let map_err = |err: &dyn std::fmt::Display| {
        UserPersistenceError::query(format!("stored user failed validation: {err}"))
    };
    let first_name = PersonName::new(row.first_name).map_err(|e| map_err(&e))?;
    let last_name = PersonName::new(row.last_name).map_err(|e| map_err(&e))?;
    let email = EmailAddress::new(row.email).map_err(|e| map_err(&e))?;
    let phone_number = PhoneNumber::new(row.phone_number).map_err(|e| map_err(&e))?;
    let nif = TaxId::new(row.nif).map_err(|e| map_err(&e))?;
    let role: Role = row.role.parse().map_err(|e: crate::domain::role::UnknownRole| map_err(&e))?;
    Ok(User::new(
        UserId::from(row.id),
        first_name,
        last_name,
        email,
        phone_number,
        nif,
        row.password_hash,
        role,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, new_user: NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            first_name: new_user.first_name.as_ref(),
            last_name: new_user.last_name.as_ref(),
            email: new_user.email.as_ref(),
            phone_number: new_user.phone_number.as_ref(),
            nif: new_user.nif.as_ref(),
            password_hash: &new_user.password_hash,
            role: new_user.role.as_str(),
        };
        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error(new_user.email.as_ref()))?;
        row_to_user(inserted)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_basic)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_basic)?;
        row.map(row_to_user).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by(users::id)
            .load(&mut conn)
            .await
            .map_err(map_basic)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Build the changeset from the optional parts; Diesel skips `None`.
        let changes = (
            update
                .first_name
                .as_ref()
                .map(|v| users::first_name.eq(v.as_ref().to_owned())),
            update
                .last_name
                .as_ref()
                .map(|v| users::last_name.eq(v.as_ref().to_owned())),
            update
                .phone_number
                .as_ref()
                .map(|v| users::phone_number.eq(v.as_ref().to_owned())),
        );
        let updated = diesel::update(users::table.find(id.get()))
            .set(changes)
            .execute(&mut conn)
            .await
            .map_err(map_basic)?;
        if updated == 0 {
            return Err(UserPersistenceError::not_found());
        }
        Ok(())
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: String,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(id.get()))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)
            .await
            .map_err(map_basic)?;
        if updated == 0 {
            return Err(UserPersistenceError::not_found());
        }
        Ok(())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(id.get()))
            .set(users::role.eq(role.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_basic)?;
        if updated == 0 {
            return Err(UserPersistenceError::not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_basic)?;
        if deleted == 0 {
            return Err(UserPersistenceError::not_found());
        }
        Ok(())
    }
}
