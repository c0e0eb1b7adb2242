//! Positional parameter binding for prepared statements.

use crate::error::Result;
use rusqlite::types::{Null, ToSqlOutput, Value, ValueRef};
use rusqlite::Statement;
use std::fmt;

/// SQL type a parameter is intended for. Used to tag NULL binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Blob,
    Integer,
    Real,
    Varchar,
}

impl SqlType {
    /// Standard SQL type code for this type.
    pub fn code(self) -> i32 {
        match self {
            SqlType::Blob => 2004,
            SqlType::Integer => 4,
            SqlType::Real => 7,
            SqlType::Varchar => 12,
        }
    }

    /// Type name as written in SQL.
    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Blob => "BLOB",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Varchar => "VARCHAR",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value that can be bound to a `?` placeholder.
///
/// `None` from [`Bindable::to_sql_output`] binds SQL NULL tagged with
/// [`Bindable::SQL_TYPE`].
pub trait Bindable {
    /// SQL type used when the value is absent.
    const SQL_TYPE: SqlType;

    /// Driver value to bind, or `None` for NULL.
    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>>;
}

macro_rules! bindable_integer {
    ($($t:ty),*) => {
        $(
            impl Bindable for $t {
                const SQL_TYPE: SqlType = SqlType::Integer;

                fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
                    Some(ToSqlOutput::Owned(Value::Integer(i64::from(*self))))
                }
            }
        )*
    };
}

bindable_integer!(i8, i16, i32, i64, u8, u16, u32);

impl Bindable for f64 {
    const SQL_TYPE: SqlType = SqlType::Real;

    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
        Some(ToSqlOutput::Owned(Value::Real(*self)))
    }
}

impl Bindable for f32 {
    const SQL_TYPE: SqlType = SqlType::Real;

    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
        Some(ToSqlOutput::Owned(Value::Real(f64::from(*self))))
    }
}

impl Bindable for char {
    const SQL_TYPE: SqlType = SqlType::Varchar;

    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
        Some(ToSqlOutput::Owned(Value::Text(self.to_string())))
    }
}

impl Bindable for str {
    const SQL_TYPE: SqlType = SqlType::Varchar;

    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
        Some(ToSqlOutput::Borrowed(ValueRef::Text(self.as_bytes())))
    }
}

impl Bindable for String {
    const SQL_TYPE: SqlType = SqlType::Varchar;

    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
        self.as_str().to_sql_output()
    }
}

impl Bindable for [u8] {
    const SQL_TYPE: SqlType = SqlType::Blob;

    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
        Some(ToSqlOutput::Borrowed(ValueRef::Blob(self)))
    }
}

impl Bindable for Vec<u8> {
    const SQL_TYPE: SqlType = SqlType::Blob;

    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
        self.as_slice().to_sql_output()
    }
}

impl<T: Bindable + ?Sized> Bindable for &T {
    const SQL_TYPE: SqlType = T::SQL_TYPE;

    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
        (**self).to_sql_output()
    }
}

impl<T: Bindable> Bindable for Option<T> {
    const SQL_TYPE: SqlType = T::SQL_TYPE;

    fn to_sql_output(&self) -> Option<ToSqlOutput<'_>> {
        self.as_ref().and_then(|value| value.to_sql_output())
    }
}

/// Binds values to a prepared statement's `?` placeholders in order.
///
/// Every call consumes the next placeholder, starting at 1.
pub struct Binder<'a, 'conn> {
    statement: &'a mut Statement<'conn>,
    index: usize,
}

impl<'a, 'conn> Binder<'a, 'conn> {
    pub(crate) fn new(statement: &'a mut Statement<'conn>) -> Self {
        Self {
            statement,
            index: 1,
        }
    }

    /// Bind a value, or NULL when it is absent.
    pub fn bind<V: Bindable>(&mut self, value: V) -> Result<()> {
        match value.to_sql_output() {
            Some(output) => {
                let index = self.advance();
                self.statement.raw_bind_parameter(index, output)?;
                Ok(())
            }
            None => self.bind_null(V::SQL_TYPE),
        }
    }

    /// Bind SQL NULL intended for a column of the given type.
    pub fn bind_null(&mut self, sql_type: SqlType) -> Result<()> {
        let index = self.advance();
        tracing::trace!(
            index,
            sql_type = %sql_type,
            code = sql_type.code(),
            "Binding NULL"
        );
        self.statement.raw_bind_parameter(index, Null)?;
        Ok(())
    }

    /// One-based index of the next placeholder to bind.
    pub fn position(&self) -> usize {
        self.index
    }

    /// The wrapped statement.
    pub fn statement(&self) -> &Statement<'conn> {
        &*self.statement
    }

    fn advance(&mut self) -> usize {
        let index = self.index;
        self.index += 1;
        index
    }
}
