//! Positional column reads from a result row.

use crate::error::{Error, Result};
use rusqlite::types::FromSql;
use rusqlite::Row;

/// Reads a row's columns in order.
///
/// Every accessor consumes the next column, starting at 0. The `*_or_none`
/// forms return `None` for SQL NULL; the plain forms fail with
/// [`Error::UnexpectedNull`] instead.
pub struct Cursor<'a, 'stmt> {
    row: &'a Row<'stmt>,
    index: usize,
}

impl<'a, 'stmt> Cursor<'a, 'stmt> {
    pub(crate) fn new(row: &'a Row<'stmt>) -> Self {
        Self { row, index: 0 }
    }

    /// Read the next column as a non-null `i32`.
    pub fn int(&mut self) -> Result<i32> {
        let value = self.int_or_none()?;
        self.require(value, "i32")
    }

    /// Read the next column as non-null text.
    pub fn string(&mut self) -> Result<String> {
        let value = self.string_or_none()?;
        self.require(value, "String")
    }

    /// Read the next column as a non-null blob.
    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        let value = self.bytes_or_none()?;
        self.require(value, "Vec<u8>")
    }

    /// Read the next column as a non-null `i64`.
    pub fn long(&mut self) -> Result<i64> {
        let value = self.long_or_none()?;
        self.require(value, "i64")
    }

    /// Read the next column as a non-null `f64`.
    pub fn double(&mut self) -> Result<f64> {
        let value = self.double_or_none()?;
        self.require(value, "f64")
    }

    /// Read the next column as an `i32`, `None` if NULL.
    pub fn int_or_none(&mut self) -> Result<Option<i32>> {
        self.read()
    }

    /// Read the next column as text, `None` if NULL.
    pub fn string_or_none(&mut self) -> Result<Option<String>> {
        self.read()
    }

    /// Read the next column as a blob, `None` if NULL.
    pub fn bytes_or_none(&mut self) -> Result<Option<Vec<u8>>> {
        self.read()
    }

    /// Read the next column as an `i64`, `None` if NULL.
    pub fn long_or_none(&mut self) -> Result<Option<i64>> {
        self.read()
    }

    /// Read the next column as an `f64`, `None` if NULL.
    pub fn double_or_none(&mut self) -> Result<Option<f64>> {
        self.read()
    }

    /// Zero-based index of the next column to read.
    pub fn position(&self) -> usize {
        self.index
    }

    /// The wrapped row.
    pub fn row(&self) -> &'a Row<'stmt> {
        self.row
    }

    fn read<T: FromSql>(&mut self) -> Result<Option<T>> {
        let index = self.index;
        self.index += 1;
        Ok(self.row.get::<_, Option<T>>(index)?)
    }

    // Reports the column just consumed by `read`.
    fn require<T>(&self, value: Option<T>, expected: &'static str) -> Result<T> {
        value.ok_or(Error::UnexpectedNull {
            expected,
            index: self.index - 1,
        })
    }
}
