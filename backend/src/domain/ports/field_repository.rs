//! Field reference-data port and its errors.

use async_trait::async_trait;

use crate::domain::field::{Field, FieldSpec};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by field adapters.
    pub enum FieldPersistenceError {
        /// Store connection could not be established or was lost.
        Connection { message: String } => "field store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "field store query failed: {message}",
        /// No field with the given id.
        NotFound => "field not found",
    }
}

/// Persists the bookable courts.
#[async_trait]
pub trait FieldRepository: Send + Sync {
    /// Every field, ordered by id.
    async fn list(&self) -> Result<Vec<Field>, FieldPersistenceError>;

    /// Create a field, returning it with its assigned id.
    async fn create(&self, spec: FieldSpec) -> Result<Field, FieldPersistenceError>;

    /// Replace a field's name and availability.
    async fn update(&self, id: i64, spec: FieldSpec) -> Result<(), FieldPersistenceError>;

    /// Delete a field.
    async fn delete(&self, id: i64) -> Result<(), FieldPersistenceError>;
}
