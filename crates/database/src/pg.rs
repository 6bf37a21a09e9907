//! Postgres-backed [`PriceStore`].

use async_trait::async_trait;
use pl_types::prices::{NaiveDate, Price};
use pl_types::{PriceFilter, PriceRecord};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Pool, Postgres, Row, Transaction};

use crate::queries::{FilterArg, FilterQuery, INSERT_PRICE, SELECT_EXISTS, SELECT_TOTALS};
use crate::schema::ensure_schema;
use crate::store::{PriceConnection, PriceStore, StoreError, StoreTotals, UnitOfWork};

#[async_trait]
impl PriceConnection for PgConnection {
    async fn exists(&mut self, record: &PriceRecord) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(SELECT_EXISTS)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.category)
            .bind(record.price)
            .bind(record.create_date)
            .fetch_one(&mut *self)
            .await?;
        Ok(exists)
    }

    async fn insert(&mut self, record: &PriceRecord) -> Result<(), StoreError> {
        sqlx::query(INSERT_PRICE)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.category)
            .bind(record.price)
            .bind(record.create_date)
            .execute(&mut *self)
            .await?;
        Ok(())
    }

    async fn totals(&mut self) -> Result<StoreTotals, StoreError> {
        let row = sqlx::query(SELECT_TOTALS).fetch_one(&mut *self).await?;
        let categories: i64 = row.try_get("categories")?;
        let price_sum: Price = row.try_get("price_sum")?;
        Ok(StoreTotals {
            categories: categories.max(0) as u64,
            price_sum,
        })
    }

    async fn select(&mut self, filter: &PriceFilter) -> Result<Vec<PriceRecord>, StoreError> {
        let built = FilterQuery::build(filter);
        let mut query = sqlx::query(&built.sql);
        for arg in &built.args {
            query = match *arg {
                FilterArg::Date(d) => query.bind(d),
                FilterArg::Price(p) => query.bind(p),
            };
        }
        let rows = query.fetch_all(&mut *self).await?;
        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &PgRow) -> Result<PriceRecord, StoreError> {
    Ok(PriceRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price: row.try_get::<Price, _>("price")?,
        create_date: row.try_get::<NaiveDate, _>("create_date")?,
    })
}

/// An open Postgres transaction. Dropping it without commit rolls back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PriceConnection for PgUnitOfWork {
    async fn exists(&mut self, record: &PriceRecord) -> Result<bool, StoreError> {
        PriceConnection::exists(&mut *self.tx, record).await
    }

    async fn insert(&mut self, record: &PriceRecord) -> Result<(), StoreError> {
        PriceConnection::insert(&mut *self.tx, record).await
    }

    async fn totals(&mut self) -> Result<StoreTotals, StoreError> {
        PriceConnection::totals(&mut *self.tx).await
    }

    async fn select(&mut self, filter: &PriceFilter) -> Result<Vec<PriceRecord>, StoreError> {
        PriceConnection::select(&mut *self.tx, filter).await
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }

    fn as_connection(&mut self) -> &mut dyn PriceConnection {
        self
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    /// Wrap an existing pool and make sure the schema is present.
    pub async fn new(pool: Pool<Postgres>) -> anyhow::Result<Self> {
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl PriceStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn query(&self, filter: &PriceFilter) -> Result<Vec<PriceRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        PriceConnection::select(&mut *conn, filter).await
    }
}
