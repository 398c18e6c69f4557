//! Database layer for Melograph.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! embedded SQL migrations, and the [`Gateway`] through which request
//! handlers run their statements. Every table in Melograph is created by a
//! versioned migration owned by this crate; handlers never issue DDL.
//!
//! A [`Gateway`] is checked out of the pool for the duration of one batch of
//! statements and returns its connection when dropped, on success and error
//! paths alike.

mod gateway;
mod migrations;
mod pool;

pub use gateway::{Gateway, GatewayError};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
