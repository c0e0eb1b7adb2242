//! Error types for sqlsyntax.

use std::io;

/// Result type alias for sqlsyntax operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for sqlsyntax.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Could not obtain a connection from the source.
    #[error("Failed to acquire connection: {0}")]
    Acquire(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Could not build the connection pool.
    #[error("Failed to build connection pool: {0}")]
    Pool(#[source] r2d2::Error),

    /// Driver error while preparing, binding, executing or reading.
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// A required column read found SQL NULL.
    #[error("Expected non-null {expected} at index {index} but was null.")]
    UnexpectedNull {
        expected: &'static str,
        index: usize,
    },

    /// Invalid pool configuration.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_null_message() {
        let err = Error::UnexpectedNull {
            expected: "i64",
            index: 2,
        };
        assert_eq!(
            err.to_string(),
            "Expected non-null i64 at index 2 but was null."
        );
    }

    #[test]
    fn test_db_error_from_rusqlite() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Db(rusqlite::Error::QueryReturnedNoRows)));
        assert!(err.to_string().starts_with("Database error:"));
    }
}
