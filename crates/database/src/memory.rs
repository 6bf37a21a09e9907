//! In-process [`PriceStore`] used by tests and the server's `--memory` mode.
//!
//! A unit of work holds the store's async mutex from `begin` until commit or rollback,
//! so transactions are fully serialized. Inserts are staged and only become visible to
//! other units of work on commit.

use async_trait::async_trait;
use pl_types::{Decimal, PriceFilter, PriceRecord};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::store::{PriceConnection, PriceStore, StoreError, StoreTotals, UnitOfWork};

/// Where an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// The n-th insert (1-based) of a unit of work fails.
    Insert(usize),
    Totals,
    Commit,
    Query,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<PriceRecord>>>,
    fail: Option<FailPoint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from already committed rows.
    pub fn with_rows(rows: Vec<PriceRecord>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
            fail: None,
        }
    }

    /// A handle on the same rows that fails at `point`.
    pub fn failing_at(&self, point: FailPoint) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            fail: Some(point),
        }
    }

    /// Snapshot of committed rows in insertion order.
    pub async fn rows(&self) -> Vec<PriceRecord> {
        self.rows.lock().await.clone()
    }

    pub async fn totals(&self) -> Result<StoreTotals, StoreError> {
        totals_of(self.rows.lock().await.iter())
    }
}

fn totals_of<'a>(rows: impl Iterator<Item = &'a PriceRecord>) -> Result<StoreTotals, StoreError> {
    let mut categories: HashSet<&str> = HashSet::new();
    let mut price_sum = Decimal::ZERO;
    for r in rows {
        categories.insert(&r.category);
        price_sum = price_sum
            .checked_add(r.price)
            .ok_or_else(|| StoreError::msg("price sum overflows numeric range"))?;
    }
    Ok(StoreTotals {
        categories: categories.len() as u64,
        price_sum,
    })
}

fn select_from<'a>(
    rows: impl Iterator<Item = &'a PriceRecord>,
    filter: &PriceFilter,
) -> Vec<PriceRecord> {
    let mut out: Vec<PriceRecord> = rows.filter(|r| filter.matches(r)).cloned().collect();
    // stable: equal ids stay in insertion order
    out.sort_by_key(|r| r.id);
    out
}

pub struct MemoryUnitOfWork {
    committed: OwnedMutexGuard<Vec<PriceRecord>>,
    staged: Vec<PriceRecord>,
    inserts: usize,
    fail: Option<FailPoint>,
}

impl MemoryUnitOfWork {
    fn visible(&self) -> impl Iterator<Item = &PriceRecord> {
        self.committed.iter().chain(self.staged.iter())
    }

    fn injected(&self, point: FailPoint) -> Result<(), StoreError> {
        if self.fail == Some(point) {
            return Err(StoreError::msg(format!("injected failure at {point:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl PriceConnection for MemoryUnitOfWork {
    async fn exists(&mut self, record: &PriceRecord) -> Result<bool, StoreError> {
        let key = record.key();
        Ok(self.visible().any(|r| r.key() == key))
    }

    async fn insert(&mut self, record: &PriceRecord) -> Result<(), StoreError> {
        self.inserts += 1;
        self.injected(FailPoint::Insert(self.inserts))?;
        self.staged.push(record.clone());
        Ok(())
    }

    async fn totals(&mut self) -> Result<StoreTotals, StoreError> {
        self.injected(FailPoint::Totals)?;
        totals_of(self.visible())
    }

    async fn select(&mut self, filter: &PriceFilter) -> Result<Vec<PriceRecord>, StoreError> {
        self.injected(FailPoint::Query)?;
        Ok(select_from(self.visible(), filter))
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.injected(FailPoint::Commit)?;
        let staged = std::mem::take(&mut self.staged);
        self.committed.extend(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }

    fn as_connection(&mut self) -> &mut dyn PriceConnection {
        self
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let committed = Arc::clone(&self.rows).lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            committed,
            staged: Vec::new(),
            inserts: 0,
            fail: self.fail,
        }))
    }

    async fn query(&self, filter: &PriceFilter) -> Result<Vec<PriceRecord>, StoreError> {
        if self.fail == Some(FailPoint::Query) {
            return Err(StoreError::msg("injected failure at Query"));
        }
        let rows = self.rows.lock().await;
        Ok(select_from(rows.iter(), filter))
    }
}
