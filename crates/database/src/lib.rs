//! Price list database crate
//!
//! This crate owns everything between the raw bytes of an upload and the `prices` table:
//! - `archive`: zip/tar extraction of the single CSV entry, and packing for exports.
//! - `parser`: CSV rows to validated `PriceRecord`s plus a raw row count.
//! - `dedup`: in-batch duplicate removal on the composite identity key.
//! - `store`: the unit-of-work contract (`PriceConnection`, `UnitOfWork`, `PriceStore`).
//! - `pg` / `memory`: Postgres (sqlx) and in-process implementations of that contract.
//! - `persist`: per-row check-then-insert and store-wide totals in one transaction.
//! - `queries`: SQL text and the filtered export query builder.
//! - `ingest` / `export`: the two end-to-end pipelines.
//!
//! To get started, build a pool with `init::pool_from_env`, wrap it in `pg::PgStore::new`
//! (which creates the schema), then call `ingest::ingest_archive` / `export::export_archive`.

pub mod archive;
pub mod dedup;
pub mod export;
pub mod ingest;
pub mod init;
pub mod memory;
pub mod parser;
pub mod persist;
pub mod pg;
pub mod queries;
pub mod schema;
pub mod store;

pub use ingest::{ingest_archive, IngestError};
pub use export::{export_archive, ExportPipelineError};
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::{PriceConnection, PriceStore, StoreError, UnitOfWork};
