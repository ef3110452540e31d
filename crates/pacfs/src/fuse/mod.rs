//! FUSE binding for the package tree.
//!
//! Mounts the tree read-only. Requests are answered straight from the
//! in-memory catalog; the only disk access after startup is reading backup
//! files on demand.
//!
//! # Example
//!
//! ```ignore
//! use pacfs::fuse::mount;
//! use pacfs::{MountConfig, PackageTree};
//!
//! let config = MountConfig { mount_path: "/mnt/packages".into(), ..Default::default() };
//! let tree = PackageTree::load(&config)?;
//! mount(tree, &config.mount_path, config.attr_ttl(), false)?;
//! ```

mod adapter;

pub use adapter::*;
