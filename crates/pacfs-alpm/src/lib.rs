//! # pacfs-alpm
//!
//! Read-only access to the pacman package database.
//!
//! This crate provides:
//! - `desc` / `files` parsing for the local database (`/var/lib/pacman/local`)
//! - Repository membership from the sync databases listed in `pacman.conf`
//! - The [`PackageSource`] trait consumed by the filesystem layer
//!
//! ## Example
//!
//! ```ignore
//! use pacfs_alpm::{DbConfig, LocalDb, PackageSource};
//!
//! let db = LocalDb::open(DbConfig::default())?;
//! for pkg in db.load()? {
//!     println!("{} {} [{}]", pkg.name, pkg.version, pkg.repository);
//! }
//! ```

mod conf;
mod desc;
mod error;
mod local;
mod package;
mod sync_db;

pub use conf::{parse_repositories, repositories_from_conf};
pub use desc::Sections;
pub use error::{Error, Result};
pub use local::{DbConfig, LocalDb, PackageSource};
pub use package::{dependency_name, InstallReason, PackageRecord};
pub use sync_db::RepoIndex;
