use crate::attr::EntryAttr;
use crate::error::{FsError, FsResult};
use crate::inode::{virtual_inode, Inode};
use crate::tree::{PackageTree, Slot};
use log::trace;
use std::path::PathBuf;

/// The part of `content` starting at `offset`, at most `size` bytes long.
fn clamp_range(content: &[u8], offset: u64, size: usize) -> &[u8] {
    let len = content.len() as u64;
    if offset >= len {
        return &[];
    }
    let start = offset as usize;
    let end = start.saturating_add(size).min(content.len());
    &content[start..end]
}

impl PackageTree {
    /// Read `size` bytes at `offset` from a virtual file.
    ///
    /// Content is rendered afresh on every call. Reading past the end yields
    /// an empty buffer.
    pub fn read(&self, ino: u64, offset: u64, size: usize) -> FsResult<Vec<u8>> {
        trace!("read(ino={}, offset={}, size={})", ino, offset, size);

        match Inode::classify(ino)? {
            Inode::Root | Inode::Directory(_) => Err(FsError::IsADirectory(ino)),
            Inode::Virtual { package, ordinal } => match self.slot_at(ino, package, ordinal)? {
                (pkg, Slot::Field(kind)) => {
                    let content = self.fields().render(kind, pkg);
                    Ok(clamp_range(&content, offset, size).to_vec())
                }
                (_, Slot::Dependency { .. }) => Err(FsError::NotFound(ino)),
            },
        }
    }

    /// Target of a dependency link, or the path of a package directory.
    pub fn read_link(&self, ino: u64) -> FsResult<PathBuf> {
        trace!("read_link(ino={})", ino);

        match Inode::classify(ino)? {
            Inode::Directory(index) => Ok(self.package_path(self.package_dir(ino, index)?)),
            Inode::Virtual { package, ordinal } => match self.slot_at(ino, package, ordinal)? {
                (_, Slot::Dependency { target }) => {
                    Ok(self.package_path(&self.catalog().packages()[target]))
                }
                (_, Slot::Field(_)) => Err(FsError::NotFound(ino)),
            },
            Inode::Root => Err(FsError::NotFound(ino)),
        }
    }

    /// Look up `name` inside directory `parent`.
    ///
    /// Inside a package directory the directory's own entries are matched
    /// first. Otherwise the link suffix is stripped and the name is matched
    /// against every installed package, resolving to its directory.
    pub fn lookup(&self, parent: u64, name: &str) -> FsResult<EntryAttr> {
        trace!("lookup(parent={}, name='{}')", parent, name);

        match Inode::classify(parent)? {
            Inode::Root => {}
            Inode::Directory(index) => {
                let pkg = self.package_dir(parent, index)?;
                for (ordinal, slot) in self.slots(pkg).into_iter().enumerate() {
                    if self.slot_name(pkg, slot) == name {
                        let ino = virtual_inode(index, ordinal)?;
                        return Ok(self.slot_attr(ino, pkg, slot));
                    }
                }
            }
            Inode::Virtual { .. } => return Err(FsError::NotADirectory(parent)),
        }

        let bare = name.strip_suffix(self.link_suffix()).unwrap_or(name);
        self.catalog()
            .by_name(bare)
            .map(|pkg| self.dir_attr(pkg))
            .ok_or(FsError::NotFound(parent))
    }
}
