//! Connection sources for sqlsyntax.
//!
//! A [`ConnectionSource`] hands out one SQLite connection per scope. Pooled
//! access goes through `r2d2`; [`DbPath`] opens a fresh connection each time.

mod connection;
mod pool;

pub use connection::{ConnectionSettings, ConnectionSource, DbPath};
pub use pool::{create_pool, DbPool, PoolConfig, PooledConnection, SqliteManager};
