use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single filesystem request.
///
/// None of these are fatal to the mount; the catalog is never touched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// Unknown inode, unknown name or unresolved dependency target.
    #[error("no such entry: inode {0}")]
    NotFound(u64),

    /// The inode is not in the package directory range.
    #[error("inode {0} is not a directory")]
    NotADirectory(u64),

    /// The inode is not in the virtual entry range.
    #[error("inode {0} is not a virtual entry")]
    NotVirtual(u64),

    /// The ordinal does not fit below the inode radix.
    #[error("ordinal {0} exceeds the per-package entry limit")]
    OrdinalOverflow(u64),

    /// Directories cannot be opened as files.
    #[error("inode {0} is a directory")]
    IsADirectory(u64),

    /// Any request with write intent.
    #[error("read-only filesystem: inode {0}")]
    PermissionDenied(u64),
}

/// Result type for filesystem requests.
pub type FsResult<T> = std::result::Result<T, FsError>;

/// Errors raised before the filesystem starts serving requests.
#[derive(Debug, Error)]
pub enum Error {
    /// The package database could not be loaded.
    #[error("package catalog unavailable: {0}")]
    CatalogUnavailable(#[from] pacfs_alpm::Error),

    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be parsed.
    #[error("cannot parse configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for startup operations.
pub type Result<T> = std::result::Result<T, Error>;
