//! Connection-scoped sessions.

use crate::db::ConnectionSource;
use crate::error::{Error, Result};
use crate::syntax::{Binder, Cursor};
use rusqlite::{Connection as SqliteConnection, Statement};

/// Run `block` with a session over one connection taken from `source`.
///
/// The connection is released when this returns, whichever way the block
/// exits. If acquisition fails the block never runs.
pub fn connection<S, F, A, E>(source: &S, block: F) -> std::result::Result<A, E>
where
    S: ConnectionSource + ?Sized,
    F: FnOnce(&Session<'_>) -> std::result::Result<A, E>,
    E: From<Error>,
{
    let handle = source.acquire()?;
    tracing::debug!("Acquired connection");

    let result = block(&Session::new(&handle));

    drop(handle);
    tracing::debug!(ok = result.is_ok(), "Released connection");
    result
}

/// Positional query helpers over a borrowed connection.
pub struct Session<'c> {
    conn: &'c SqliteConnection,
}

impl<'c> Session<'c> {
    /// Wrap an already open connection.
    pub fn new(conn: &'c SqliteConnection) -> Self {
        Self { conn }
    }

    /// The wrapped connection.
    pub fn connection(&self) -> &'c SqliteConnection {
        self.conn
    }

    /// Run a statement that returns no rows (`INSERT`, `UPDATE`, `DELETE`,
    /// `CREATE TABLE`, ...). Returns the number of rows changed.
    pub fn update(&self, sql: &str) -> Result<usize> {
        self.update_with(sql, |_| Ok(()))
    }

    /// Like [`Session::update`], binding parameters first.
    pub fn update_with<B>(&self, sql: &str, binders: B) -> Result<usize>
    where
        B: FnOnce(&mut Binder<'_, '_>) -> Result<()>,
    {
        let mut statement = self.prepare(sql, binders)?;
        let changed = statement.raw_execute()?;
        tracing::debug!(sql, changed, "Executed update");
        Ok(changed)
    }

    /// Map the first row of a query, or `None` if it returned no rows.
    /// Later rows are never fetched.
    pub fn query_one_or_none<A, M>(&self, sql: &str, mapper: M) -> Result<Option<A>>
    where
        M: FnOnce(&mut Cursor<'_, '_>) -> Result<A>,
    {
        self.query_one_or_none_with(sql, |_| Ok(()), mapper)
    }

    /// Like [`Session::query_one_or_none`], binding parameters first.
    pub fn query_one_or_none_with<A, B, M>(
        &self,
        sql: &str,
        binders: B,
        mapper: M,
    ) -> Result<Option<A>>
    where
        B: FnOnce(&mut Binder<'_, '_>) -> Result<()>,
        M: FnOnce(&mut Cursor<'_, '_>) -> Result<A>,
    {
        let mut statement = self.prepare(sql, binders)?;
        let mut rows = statement.raw_query();
        let value = match rows.next()? {
            Some(row) => Some(mapper(&mut Cursor::new(row))?),
            None => None,
        };
        tracing::debug!(sql, found = value.is_some(), "Queried one row");
        Ok(value)
    }

    /// Map every row of a query in order. Rows the mapper returns `None`
    /// for are left out.
    pub fn query_as_list<A, M>(&self, sql: &str, mapper: M) -> Result<Vec<A>>
    where
        M: FnMut(&mut Cursor<'_, '_>) -> Result<Option<A>>,
    {
        self.query_as_list_with(sql, |_| Ok(()), mapper)
    }

    /// Like [`Session::query_as_list`], binding parameters first.
    pub fn query_as_list_with<A, B, M>(
        &self,
        sql: &str,
        binders: B,
        mut mapper: M,
    ) -> Result<Vec<A>>
    where
        B: FnOnce(&mut Binder<'_, '_>) -> Result<()>,
        M: FnMut(&mut Cursor<'_, '_>) -> Result<Option<A>>,
    {
        let mut statement = self.prepare(sql, binders)?;
        let mut rows = statement.raw_query();
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            if let Some(value) = mapper(&mut Cursor::new(row))? {
                values.push(value);
            }
        }
        tracing::debug!(sql, rows = values.len(), "Queried rows");
        Ok(values)
    }

    /// Execute one prepared statement once per item.
    ///
    /// Each item gets a fresh [`Binder`] starting at the first placeholder.
    /// With `return_generated_keys` set, returns the row ids generated by
    /// the batch in execution order; otherwise each item's changed-row count.
    /// An item only yields keys when it moves the connection's last insert
    /// rowid, so `UPDATE` and `DELETE` items yield none. An item inserting
    /// `n` rows yields the `n` ids ending at the new last rowid, which
    /// assumes the rows got consecutive ids.
    ///
    /// Bindings carry over between items, so every item should bind every
    /// placeholder. A failing item stops the batch. Items executed before it
    /// stay applied.
    pub fn execute_batch<T, I, B>(
        &self,
        sql: &str,
        values: I,
        return_generated_keys: bool,
        mut binders: B,
    ) -> Result<Vec<i64>>
    where
        I: IntoIterator<Item = T>,
        B: FnMut(&mut Binder<'_, '_>, T) -> Result<()>,
    {
        let mut statement = self.conn.prepare(sql)?;
        let mut results = Vec::new();
        for value in values {
            binders(&mut Binder::new(&mut statement), value)?;
            let previous_rowid = self.conn.last_insert_rowid();
            // SQLite counts changes in a signed 64-bit integer, so this never wraps.
            let changed = statement.raw_execute()? as i64;
            if !return_generated_keys {
                results.push(changed);
                continue;
            }
            let last_rowid = self.conn.last_insert_rowid();
            if changed > 0 && last_rowid != previous_rowid {
                results.extend(last_rowid - changed + 1..=last_rowid);
            }
        }
        tracing::debug!(
            sql,
            items = results.len(),
            return_generated_keys,
            "Executed batch"
        );
        Ok(results)
    }

    fn prepare<B>(&self, sql: &str, binders: B) -> Result<Statement<'c>>
    where
        B: FnOnce(&mut Binder<'_, 'c>) -> Result<()>,
    {
        let mut statement = self.conn.prepare(sql)?;
        binders(&mut Binder::new(&mut statement))?;
        Ok(statement)
    }
}
