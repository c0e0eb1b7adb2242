//! Pooled connection source built on `r2d2`.

use crate::db::connection::{ConnectionSettings, ConnectionSource};
use crate::error::{Error, Result};
use rusqlite::Connection as SqliteConnection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection pool handing out SQLite connections.
pub type DbPool = r2d2::Pool<SqliteManager>;

/// A connection checked out of a [`DbPool`].
pub type PooledConnection = r2d2::PooledConnection<SqliteManager>;

/// Pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// Maximum number of pooled connections.
    pub max_size: u32,
    /// How long `acquire` waits for a free connection.
    pub connection_timeout_ms: u64,
    /// SQLite busy timeout applied to each connection.
    pub busy_timeout_ms: u64,
    /// Enforce foreign key constraints.
    pub foreign_keys: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_size: 8,
            connection_timeout_ms: 30_000,
            busy_timeout_ms: 5_000,
            foreign_keys: true,
        }
    }
}

impl PoolConfig {
    /// Config for a file-backed database with default settings.
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    fn settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            foreign_keys: self.foreign_keys,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}

/// `r2d2` connection manager for SQLite.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    path: Option<PathBuf>,
    settings: ConnectionSettings,
}

impl SqliteManager {
    /// Manager opening connections to a database file.
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            settings: ConnectionSettings::default(),
        }
    }

    /// Manager opening in-memory databases.
    pub fn memory() -> Self {
        Self {
            path: None,
            settings: ConnectionSettings::default(),
        }
    }

    /// Override the pragmas applied to each new connection.
    pub fn with_settings(mut self, settings: ConnectionSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl r2d2::ManageConnection for SqliteManager {
    type Connection = SqliteConnection;
    type Error = rusqlite::Error;

    fn connect(&self) -> std::result::Result<SqliteConnection, rusqlite::Error> {
        let conn = match &self.path {
            Some(path) => SqliteConnection::open(path)?,
            None => SqliteConnection::open_in_memory()?,
        };
        self.settings.apply(&conn)?;
        Ok(conn)
    }

    fn is_valid(&self, conn: &mut SqliteConnection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch("")
    }

    fn has_broken(&self, _conn: &mut SqliteConnection) -> bool {
        false
    }
}

/// Build a pool from the given config.
///
/// In-memory databases are private to their connection, so an in-memory
/// pool is capped at a single connection.
pub fn create_pool(config: &PoolConfig) -> Result<DbPool> {
    let (manager, max_size) = match &config.path {
        Some(path) => (SqliteManager::file(path), config.max_size.max(1)),
        None => (SqliteManager::memory(), 1),
    };
    let manager = manager.with_settings(config.settings());

    tracing::debug!(
        path = ?config.path,
        max_size,
        "Creating SQLite connection pool"
    );

    r2d2::Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
        .build(manager)
        .map_err(Error::Pool)
}

impl ConnectionSource for DbPool {
    type Handle = PooledConnection;

    fn acquire(&self) -> Result<Self::Handle> {
        self.get().map_err(|e| Error::Acquire(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.path, None);
        assert_eq!(config.max_size, 8);
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_config_from_toml_partial() {
        let config = PoolConfig::from_toml(
            r#"
            path = "app.db"
            max_size = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.path, Some(PathBuf::from("app.db")));
        assert_eq!(config.max_size, 2);
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_config_from_toml_invalid() {
        let result = PoolConfig::from_toml("max_size = \"lots\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_load_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("db.toml");
        fs::write(&file, "foreign_keys = false\n").unwrap();

        let config = PoolConfig::load(&file).unwrap();
        assert!(!config.foreign_keys);

        let missing = PoolConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }

    #[test]
    fn test_memory_pool_shares_one_connection() {
        let pool = create_pool(&PoolConfig::default()).unwrap();
        assert_eq!(pool.max_size(), 1);

        pool.acquire()
            .unwrap()
            .execute("CREATE TABLE t (x INTEGER)", [])
            .unwrap();

        let count: i64 = pool
            .acquire()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_file_pool_applies_pragmas() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = create_pool(&PoolConfig::file(dir.path().join("pool.db"))).unwrap();

        let conn = pool.acquire().unwrap();
        let fk_status: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_status, 1);
    }

    #[test]
    fn test_acquire_times_out_when_exhausted() {
        let config = PoolConfig {
            connection_timeout_ms: 50,
            ..PoolConfig::default()
        };
        let pool = create_pool(&config).unwrap();

        let _held = pool.acquire().unwrap();
        assert!(matches!(pool.acquire(), Err(Error::Acquire(_))));
    }
}
