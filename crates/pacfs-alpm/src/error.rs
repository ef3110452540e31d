use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading the package database.
#[derive(Debug, Error)]
pub enum Error {
    /// The local database directory does not exist.
    #[error("package database not found: {0}")]
    DatabaseNotFound(PathBuf),

    /// A `desc` file could not be parsed.
    #[error("invalid package description in {path}: {reason}")]
    InvalidDesc { path: PathBuf, reason: String },

    /// A numeric field held something other than a number.
    #[error("invalid value for %{key}%: {value}")]
    InvalidNumber { key: String, value: String },

    /// `pacman.conf` could not be read.
    #[error("cannot read pacman configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for package database operations.
pub type Result<T> = std::result::Result<T, Error>;
