//! HTTP front end for the price list pipelines.
//!
//! The router exposes `POST /api/v0/prices` (upload) and `GET /api/v0/prices` (export)
//! over any `PriceStore`; `main.rs` wires it to Postgres or to the in-memory store.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::router;
pub use state::AppState;
