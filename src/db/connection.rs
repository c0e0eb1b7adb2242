//! Connection sources.

use crate::error::{Error, Result};
use crate::syntax::Session;
use rusqlite::Connection as SqliteConnection;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Something that hands out SQLite connections one scope at a time.
///
/// Dropping the returned handle releases the connection back to the source.
pub trait ConnectionSource {
    /// Live connection handle. Release happens on drop.
    type Handle: Deref<Target = SqliteConnection>;

    /// Acquire one connection.
    fn acquire(&self) -> Result<Self::Handle>;

    /// Run `block` with a session over one connection from this source.
    /// See [`crate::syntax::connection`].
    fn connection<A, E, F>(&self, block: F) -> std::result::Result<A, E>
    where
        F: FnOnce(&Session<'_>) -> std::result::Result<A, E>,
        E: From<Error>,
    {
        crate::syntax::connection(self, block)
    }
}

/// Pragmas applied to every freshly opened connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub foreign_keys: bool,
    pub busy_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            foreign_keys: true,
            busy_timeout: Duration::from_millis(5_000),
        }
    }
}

impl ConnectionSettings {
    /// Apply these settings to an open connection.
    pub fn apply(&self, conn: &SqliteConnection) -> rusqlite::Result<()> {
        let foreign_keys = if self.foreign_keys { "ON" } else { "OFF" };
        conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys}"))?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(())
    }
}

/// Path to a database file. Opens a fresh, unpooled connection per scope.
#[derive(Debug, Clone)]
pub struct DbPath {
    path: PathBuf,
    settings: ConnectionSettings,
}

impl DbPath {
    /// Create a DbPath from a string path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            settings: ConnectionSettings::default(),
        }
    }

    /// Override the pragmas applied on open.
    pub fn with_settings(mut self, settings: ConnectionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Get the path as a reference.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Check if the database file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl ConnectionSource for DbPath {
    type Handle = Box<SqliteConnection>;

    fn acquire(&self) -> Result<Self::Handle> {
        let conn = SqliteConnection::open(&self.path)
            .and_then(|conn| self.settings.apply(&conn).map(|()| conn))
            .map_err(|e| Error::Acquire(Box::new(e)))?;
        Ok(Box::new(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_new() {
        let path = DbPath::new("custom.db");
        assert_eq!(path.as_path(), Path::new("custom.db"));
    }

    #[test]
    fn test_db_path_exists() {
        let path = DbPath::new("nonexistent.db");
        assert!(!path.exists());

        let temp = tempfile::NamedTempFile::new().unwrap();
        let existing = DbPath::new(temp.path());
        assert!(existing.exists());
    }

    #[test]
    fn test_acquire_applies_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = DbPath::new(dir.path().join("test.db"));

        let conn = source.acquire().unwrap();
        let fk_status: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_status, 1);

        let source = source.with_settings(ConnectionSettings {
            foreign_keys: false,
            ..ConnectionSettings::default()
        });
        let conn = source.acquire().unwrap();
        let fk_status: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_status, 0);
    }

    #[test]
    fn test_acquire_missing_directory_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = DbPath::new(dir.path().join("missing").join("test.db"));

        assert!(matches!(source.acquire(), Err(Error::Acquire(_))));
    }
}
