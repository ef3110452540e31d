//! Inode address space.
//!
//! The 64-bit inode space is split into three disjoint parts:
//!
//! | Range | Meaning |
//! |---|---|
//! | `ROOT_INODE` | mount root |
//! | `ROOT_INODE + 1 .. VIRTUAL_BASE` | package directory `ino - ROOT_INODE - 1` |
//! | `VIRTUAL_BASE ..` | virtual entry `(package, ordinal)` of a package directory |
//!
//! Virtual inodes are `VIRTUAL_BASE + package * RADIX + ordinal`. Ordinals at
//! or above [`RADIX`] are rejected instead of spilling into the next package.

use crate::error::{FsError, FsResult};

/// Inode of the mount root (same value as FUSE's root id).
pub const ROOT_INODE: u64 = 1;

/// First inode of the virtual entry range.
pub const VIRTUAL_BASE: u64 = 1 << 40;

/// Number of virtual inodes reserved per package directory.
pub const RADIX: u64 = 1 << 12;

/// Largest number of packages the directory range can address.
pub const MAX_PACKAGES: usize = (VIRTUAL_BASE - ROOT_INODE - 1) as usize;

/// What an inode number refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inode {
    Root,
    Directory(usize),
    Virtual { package: usize, ordinal: usize },
}

impl Inode {
    /// Classify a raw inode number. Inode 0 is invalid.
    pub fn classify(ino: u64) -> FsResult<Self> {
        if ino == ROOT_INODE {
            return Ok(Inode::Root);
        }
        if let Ok(index) = package_index_of(ino) {
            return Ok(Inode::Directory(index));
        }
        decode_virtual(ino)
            .map(|(package, ordinal)| Inode::Virtual { package, ordinal })
            .map_err(|_| FsError::NotFound(ino))
    }
}

/// Inode of the directory for package `index`.
pub fn directory_inode(index: usize) -> u64 {
    debug_assert!(index < MAX_PACKAGES);
    ROOT_INODE + index as u64 + 1
}

/// Package index addressed by a directory inode.
pub fn package_index_of(ino: u64) -> FsResult<usize> {
    if ino > ROOT_INODE && ino < VIRTUAL_BASE {
        Ok((ino - ROOT_INODE - 1) as usize)
    } else {
        Err(FsError::NotADirectory(ino))
    }
}

/// Inode of the `ordinal`-th entry inside package `index`.
pub fn virtual_inode(index: usize, ordinal: usize) -> FsResult<u64> {
    let ordinal = ordinal as u64;
    if ordinal >= RADIX {
        return Err(FsError::OrdinalOverflow(ordinal));
    }
    debug_assert!(index < MAX_PACKAGES);
    Ok(VIRTUAL_BASE + index as u64 * RADIX + ordinal)
}

/// Recover `(package, ordinal)` from a virtual inode.
pub fn decode_virtual(ino: u64) -> FsResult<(usize, usize)> {
    if ino < VIRTUAL_BASE {
        return Err(FsError::NotVirtual(ino));
    }
    let offset = ino - VIRTUAL_BASE;
    let index = offset / RADIX;
    if index >= MAX_PACKAGES as u64 {
        return Err(FsError::NotVirtual(ino));
    }
    Ok((index as usize, (offset % RADIX) as usize))
}
