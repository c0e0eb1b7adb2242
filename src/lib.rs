//! # sqlsyntax
//!
//! Small helpers for working directly with SQLite through `rusqlite`:
//! scoped sessions over pooled connections, positional parameter binding and
//! positional column reads.
//!
//! ```no_run
//! use sqlsyntax::{create_pool, ConnectionSource, PoolConfig};
//!
//! # fn main() -> sqlsyntax::Result<()> {
//! let pool = create_pool(&PoolConfig::file("app.db"))?;
//! let name = pool.connection(|s| {
//!     s.query_one_or_none_with(
//!         "SELECT name FROM users WHERE id = ?",
//!         |b| b.bind(1i64),
//!         |c| c.string(),
//!     )
//! })?;
//! # let _ = name;
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod error;
pub mod syntax;

pub use db::{create_pool, ConnectionSource, DbPath, DbPool, PoolConfig};
pub use error::{Error, Result};
pub use syntax::{connection, Bindable, Binder, Cursor, Session, SqlType};
