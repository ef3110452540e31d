use crate::attr::{EntryAttr, EntryKind};
use crate::catalog::{Catalog, Package};
use crate::config::MountConfig;
use crate::error::{FsError, FsResult, Result};
use crate::fields::{FieldCatalog, FieldKind, FieldOptions};
use crate::inode::{directory_inode, Inode, ROOT_INODE};
use log::{debug, warn};
use pacfs_alpm::{dependency_name, LocalDb};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

/// One addressable entry inside a package directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Field(FieldKind),
    /// Link to the directory of the package at `target`.
    Dependency { target: usize },
}

/// Access mode requested by an `open` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    /// Decode the `O_ACCMODE` bits of open(2) flags.
    pub fn from_flags(flags: i32) -> Self {
        match flags & 0o3 {
            0 => AccessMode::ReadOnly,
            1 => AccessMode::WriteOnly,
            _ => AccessMode::ReadWrite,
        }
    }

    pub fn wants_write(self) -> bool {
        self != AccessMode::ReadOnly
    }
}

/// The package hierarchy: root, one directory per package, virtual entries.
///
/// Every method takes `&self` and derives its answer from the inode number and
/// the immutable catalog, so the tree can be shared freely between threads.
#[derive(Debug)]
pub struct PackageTree {
    catalog: Arc<Catalog>,
    fields: FieldCatalog,
    mount_path: PathBuf,
    link_suffix: String,
    entry_limit: usize,
    mount_time: SystemTime,
    overflowed: Vec<usize>,
}

impl PackageTree {
    /// Build a tree over an already loaded catalog.
    pub fn new(catalog: Arc<Catalog>, config: &MountConfig) -> Result<Self> {
        config.validate()?;

        let mut tree = Self {
            catalog,
            fields: FieldCatalog::new(FieldOptions::from(config)),
            mount_path: config.mount_path.clone(),
            link_suffix: config.link_suffix.clone(),
            entry_limit: config.max_entries_per_package as usize,
            mount_time: SystemTime::now(),
            overflowed: Vec::new(),
        };

        let mut overflowed = Vec::new();
        for pkg in tree.catalog.packages() {
            let count = tree.all_slots(pkg).len();
            if count > tree.entry_limit {
                warn!(
                    "package '{}' has {} entries, listing only the first {}",
                    pkg.name(),
                    count,
                    tree.entry_limit
                );
                overflowed.push(pkg.index);
            }
        }
        tree.overflowed = overflowed;

        Ok(tree)
    }

    /// Load the local package database and build a tree over it.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::CatalogUnavailable`] if the database cannot be read.
    pub fn load(config: &MountConfig) -> Result<Self> {
        let db = LocalDb::open(config.db.clone())?;
        let catalog = Catalog::load(&db)?;
        Self::new(Arc::new(catalog), config)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn fields(&self) -> &FieldCatalog {
        &self.fields
    }

    pub fn link_suffix(&self) -> &str {
        &self.link_suffix
    }

    /// Indices of packages whose listing was truncated at the entry limit.
    pub fn overflowed_packages(&self) -> &[usize] {
        &self.overflowed
    }

    /// Applicable fields followed by resolvable dependencies, untruncated.
    ///
    /// Dependency links stop at the first constraint naming a package that is
    /// not installed.
    fn all_slots(&self, pkg: &Package) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self.fields.applicable(pkg).map(Slot::Field).collect();

        for constraint in &pkg.record.depends {
            let name = dependency_name(constraint);
            match self.catalog.by_name(name) {
                Some(target) => {
                    let slot = Slot::Dependency {
                        target: target.index,
                    };
                    // `foo` and `foo>=2` would otherwise share a link name.
                    if !slots.contains(&slot) {
                        slots.push(slot);
                    }
                }
                None => {
                    debug!(
                        "'{}': dependency '{}' is not installed, links stop here",
                        pkg.name(),
                        constraint
                    );
                    break;
                }
            }
        }

        slots
    }

    /// Entries of a package directory; the position of a slot is its ordinal.
    pub fn slots(&self, pkg: &Package) -> Vec<Slot> {
        let mut slots = self.all_slots(pkg);
        slots.truncate(self.entry_limit);
        slots
    }

    /// Resolve a virtual inode to its package and slot.
    pub(crate) fn slot_at(
        &self,
        ino: u64,
        package: usize,
        ordinal: usize,
    ) -> FsResult<(&Package, Slot)> {
        let pkg = self
            .catalog
            .by_index(package)
            .map_err(|_| FsError::NotFound(ino))?;
        let slot = self
            .slots(pkg)
            .get(ordinal)
            .copied()
            .ok_or(FsError::NotFound(ino))?;
        Ok((pkg, slot))
    }

    /// Package addressed by a directory inode.
    pub(crate) fn package_dir(&self, ino: u64, index: usize) -> FsResult<&Package> {
        self.catalog
            .by_index(index)
            .map_err(|_| FsError::NotFound(ino))
    }

    /// Name of the entry for `slot` inside the directory of `pkg`.
    pub fn slot_name(&self, pkg: &Package, slot: Slot) -> String {
        match slot {
            Slot::Field(kind) => self.fields.filename(kind, pkg),
            Slot::Dependency { target } => {
                let target = &self.catalog.packages()[target];
                format!("{}{}", target.name(), self.link_suffix)
            }
        }
    }

    /// Absolute path of a package directory below the mount point.
    pub fn package_path(&self, pkg: &Package) -> PathBuf {
        self.mount_path.join(pkg.name())
    }

    pub(crate) fn root_attr(&self) -> EntryAttr {
        EntryAttr {
            ino: ROOT_INODE,
            size: 0,
            kind: EntryKind::Directory,
            perm: 0o555,
            nlink: 2,
            time: self.mount_time,
        }
    }

    pub(crate) fn dir_attr(&self, pkg: &Package) -> EntryAttr {
        EntryAttr {
            ino: directory_inode(pkg.index),
            size: pkg.record.size,
            kind: EntryKind::Directory,
            perm: 0o555,
            nlink: 2,
            time: pkg.install_time(),
        }
    }

    pub(crate) fn slot_attr(&self, ino: u64, pkg: &Package, slot: Slot) -> EntryAttr {
        match slot {
            Slot::Field(kind) => self.fields.attributes(kind, pkg, ino),
            Slot::Dependency { target } => {
                let target = &self.catalog.packages()[target];
                let target_ino = directory_inode(target.index);
                EntryAttr {
                    ino,
                    size: self.package_path(target).as_os_str().len() as u64,
                    kind: EntryKind::Symlink,
                    perm: 0o555,
                    nlink: u32::try_from(target_ino).unwrap_or(u32::MAX),
                    time: target.install_time(),
                }
            }
        }
    }

    /// Attributes of any inode in the tree.
    pub fn get_attributes(&self, ino: u64) -> FsResult<EntryAttr> {
        match Inode::classify(ino)? {
            Inode::Root => Ok(self.root_attr()),
            Inode::Directory(index) => Ok(self.dir_attr(self.package_dir(ino, index)?)),
            Inode::Virtual { package, ordinal } => {
                let (pkg, slot) = self.slot_at(ino, package, ordinal)?;
                Ok(self.slot_attr(ino, pkg, slot))
            }
        }
    }

    /// Check that `ino` may be opened with `mode`; handles are stateless.
    pub fn open(&self, ino: u64, mode: AccessMode) -> FsResult<u64> {
        let attr = self.get_attributes(ino)?;
        if mode.wants_write() {
            return Err(FsError::PermissionDenied(ino));
        }
        if attr.is_dir() {
            return Err(FsError::IsADirectory(ino));
        }
        Ok(0)
    }

    /// Check that `ino` is a directory that can be listed.
    pub fn open_dir(&self, ino: u64, mode: AccessMode) -> FsResult<u64> {
        let attr = self.get_attributes(ino)?;
        if !attr.is_dir() {
            return Err(FsError::NotADirectory(ino));
        }
        if mode.wants_write() {
            return Err(FsError::PermissionDenied(ino));
        }
        Ok(0)
    }
}
