//! Positional query helpers.
//!
//! [`connection`] scopes one connection to a block; [`Session`] runs
//! statements on it, binding parameters through a [`Binder`] and reading rows
//! through a [`Cursor`]. Both advance an implicit position on every call, so
//! binds and reads must follow placeholder and column order.

mod binder;
mod cursor;
mod session;

pub use binder::{Bindable, Binder, SqlType};
pub use cursor::Cursor;
pub use session::{connection, Session};
