//! Credential store port and its errors.

use async_trait::async_trait;

use crate::domain::role::Role;
use crate::domain::user::{EmailAddress, NewUser, ProfileUpdate, User, UserId};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by credential store adapters.
    pub enum UserPersistenceError {
        /// Store connection could not be established or was lost.
        Connection { message: String } => "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
        /// The unique-email constraint rejected an insert.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// A mutation addressed a user id with no row behind it.
        NotFound => "user not found",
    }
}

/// Persists user accounts. Every operation is atomic per call: a failed
/// write leaves no partial state.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, returning it with its assigned id.
    ///
    /// A duplicate email yields [`UserPersistenceError::DuplicateEmail`].
    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Every registered account, ordered by id.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Apply a partial profile change.
    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<(), UserPersistenceError>;

    /// Overwrite the stored password hash.
    async fn update_password(
        &self,
        id: UserId,
        password_hash: String,
    ) -> Result<(), UserPersistenceError>;

    /// Set the account's role.
    async fn set_role(&self, id: UserId, role: Role) -> Result<(), UserPersistenceError>;

    /// Delete the account.
    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError>;
}
