//! # pacfs
//!
//! Read-only virtual filesystem over the installed pacman packages.
//!
//! Every installed package becomes a directory holding:
//! - synthetic files for its metadata (`<version>.version`, `<name>.txt`,
//!   `<repo>.db`, `explicit.install`, `<base>.base`, a backup file, ...)
//! - one `<dependency>.dep` symlink per installed dependency
//!
//! Nothing is stored: every inode encodes what it refers to, and file content
//! is rendered from the package record on each read.
//!
//! ## Example
//!
//! ```ignore
//! use pacfs::{MountConfig, PackageTree, ROOT_INODE};
//!
//! let tree = PackageTree::load(&MountConfig::default())?;
//! for entry in tree.entries_after(ROOT_INODE, 0)? {
//!     println!("{} (inode {})", entry.name, entry.attr.ino);
//! }
//! ```
//!
//! ## FUSE Support
//!
//! Enable the `fuse` feature to mount the tree:
//!
//! ```ignore
//! use pacfs::fuse::mount;
//!
//! mount(tree, "/mnt/packages", config.attr_ttl(), false)?;
//! ```

mod attr;
mod catalog;
mod config;
mod error;
mod fields;
pub mod inode;
mod projector;
mod reader;
mod tree;

#[cfg(feature = "fuse")]
pub mod fuse;

pub use attr::{EntryAttr, EntryKind};
pub use catalog::{Catalog, Package};
pub use config::MountConfig;
pub use error::{Error, FsError, FsResult, Result};
pub use fields::{FieldCatalog, FieldKind, FieldOptions};
pub use inode::{Inode, RADIX, ROOT_INODE};
pub use projector::{Batch, DirEntry, Entries};
pub use tree::{AccessMode, PackageTree, Slot};

// Re-export database types for convenience
pub use pacfs_alpm::{DbConfig, InstallReason, PackageRecord};
