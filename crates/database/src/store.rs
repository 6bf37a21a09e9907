//! Unit-of-work contract for price storage.
//!
//! - [`PriceConnection`]: the row-level operations. Implemented by a bare Postgres
//!   connection (pooled or inside a transaction) and by the memory store's transaction.
//! - [`UnitOfWork`]: a connection with an open transaction that must be committed or
//!   rolled back.
//! - [`PriceStore`]: the shared handle the pipelines hold; opens units of work and runs
//!   read-only queries.
//!
//! Code that already holds a `&mut dyn PriceConnection` (e.g. [`crate::persist::persist_rows`])
//! runs inside whatever transaction the caller opened and never begins its own.

use async_trait::async_trait;
use pl_types::{PriceFilter, PriceRecord};
use pl_types::prices::Price;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("store: {0}")]
    Message(String),
}

impl StoreError {
    pub fn msg(message: impl Into<String>) -> Self {
        StoreError::Message(message.into())
    }
}

/// Store-wide totals: distinct categories and the sum of all prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreTotals {
    pub categories: u64,
    pub price_sum: Price,
}

#[async_trait]
pub trait PriceConnection: Send {
    /// Whether a record with the identical composite key is already stored.
    async fn exists(&mut self, record: &PriceRecord) -> Result<bool, StoreError>;

    async fn insert(&mut self, record: &PriceRecord) -> Result<(), StoreError>;

    /// Totals over every stored row, not just the current batch.
    async fn totals(&mut self) -> Result<StoreTotals, StoreError>;

    /// Records matching `filter`, ordered by ascending id.
    async fn select(&mut self, filter: &PriceFilter) -> Result<Vec<PriceRecord>, StoreError>;
}

#[async_trait]
pub trait UnitOfWork: PriceConnection {
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;

    /// Borrow as a plain connection so helpers can run inside this transaction.
    fn as_connection(&mut self) -> &mut dyn PriceConnection;
}

#[async_trait]
pub trait PriceStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    /// Read-only filtered query outside of any explicit transaction.
    async fn query(&self, filter: &PriceFilter) -> Result<Vec<PriceRecord>, StoreError>;
}
