//! Price reference-data port and its errors.

use async_trait::async_trait;

use crate::domain::price::{Price, PriceSpec};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by price adapters.
    pub enum PricePersistenceError {
        /// Store connection could not be established or was lost.
        Connection { message: String } => "price store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "price store query failed: {message}",
        /// No price with the given id.
        NotFound => "price not found",
    }
}

/// Persists the slot price entries.
#[async_trait]
pub trait PriceRepository: Send + Sync {
    /// Every price entry, ordered by id.
    async fn list(&self) -> Result<Vec<Price>, PricePersistenceError>;

    /// Create a price entry, returning it with its assigned id.
    async fn create(&self, spec: PriceSpec) -> Result<Price, PricePersistenceError>;

    /// Replace a price entry's value, type, start date, and active flag.
    async fn update(&self, id: i64, spec: PriceSpec) -> Result<(), PricePersistenceError>;
}
