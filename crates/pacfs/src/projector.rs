//! Resumable directory listings.
//!
//! A listing is driven entirely by the caller's cursor: every entry carries
//! its own inode as cursor, and a listing resumes with the entries whose
//! inode is strictly greater. Root entries are package directories in index
//! order; package entries are virtual inodes in ordinal order. Both sequences
//! are increasing, so no entry is skipped or repeated between calls.

use crate::attr::EntryAttr;
use crate::error::{FsError, FsResult};
use crate::inode::{
    decode_virtual, directory_inode, virtual_inode, Inode, ROOT_INODE, VIRTUAL_BASE,
};
use crate::tree::PackageTree;
use log::trace;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub attr: EntryAttr,
    /// Pass this back to resume the listing after this entry.
    pub cursor: u64,
}

/// A bounded slice of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub entries: Vec<DirEntry>,
    /// Cursor of the last entry, or the requested cursor if the batch is empty.
    pub next_cursor: u64,
}

/// Lazily produced entries of one directory.
pub enum Entries<'a> {
    Root { tree: &'a PackageTree, next: usize },
    Package(std::vec::IntoIter<DirEntry>),
}

impl Iterator for Entries<'_> {
    type Item = DirEntry;

    fn next(&mut self) -> Option<DirEntry> {
        match self {
            Entries::Root { tree, next } => {
                let pkg = tree.catalog().packages().get(*next)?;
                *next += 1;
                Some(DirEntry {
                    name: pkg.name().to_string(),
                    attr: tree.dir_attr(pkg),
                    cursor: directory_inode(pkg.index),
                })
            }
            Entries::Package(items) => items.next(),
        }
    }
}

/// First package index whose directory inode is greater than `cursor`.
fn root_start(cursor: u64) -> usize {
    if cursor >= VIRTUAL_BASE {
        usize::MAX
    } else {
        cursor.saturating_sub(ROOT_INODE) as usize
    }
}

impl PackageTree {
    /// Entries of directory `ino` that come after `cursor`.
    ///
    /// The caller stops pulling when its buffer is full and resumes later with
    /// the cursor of the last entry it accepted.
    pub fn entries_after(&self, ino: u64, cursor: u64) -> FsResult<Entries<'_>> {
        trace!("entries_after(ino={}, cursor={})", ino, cursor);

        match Inode::classify(ino)? {
            Inode::Root => Ok(Entries::Root {
                tree: self,
                next: root_start(cursor),
            }),
            Inode::Directory(index) => {
                let pkg = self.package_dir(ino, index)?;
                // Ordinal of the first entry whose inode is greater than the cursor.
                let first = match decode_virtual(cursor) {
                    Ok((package, ordinal)) if package == index => ordinal + 1,
                    Ok((package, _)) if package > index => usize::MAX,
                    Ok(_) => 0,
                    Err(_) if cursor >= VIRTUAL_BASE => usize::MAX,
                    Err(_) => 0,
                };

                let mut entries = Vec::new();
                for (ordinal, slot) in self.slots(pkg).into_iter().enumerate().skip(first) {
                    let vino = virtual_inode(index, ordinal)?;
                    entries.push(DirEntry {
                        name: self.slot_name(pkg, slot),
                        attr: self.slot_attr(vino, pkg, slot),
                        cursor: vino,
                    });
                }
                Ok(Entries::Package(entries.into_iter()))
            }
            Inode::Virtual { .. } => Err(FsError::NotADirectory(ino)),
        }
    }

    /// Up to `limit` entries of directory `ino` after `cursor`.
    pub fn enumerate(&self, ino: u64, cursor: u64, limit: usize) -> FsResult<Batch> {
        let entries: Vec<DirEntry> = self.entries_after(ino, cursor)?.take(limit).collect();
        let next_cursor = entries.last().map(|e| e.cursor).unwrap_or(cursor);
        Ok(Batch {
            entries,
            next_cursor,
        })
    }
}
