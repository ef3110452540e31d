//! FUSE adapter implementation for the package tree.
//!
//! This module implements the `fuser::Filesystem` trait for `PacFuseFS`,
//! translating kernel requests into [`PackageTree`] calls.

use crate::attr::{EntryAttr, EntryKind};
use crate::error::FsError;
use crate::tree::{AccessMode, PackageTree};
use fuser::{
    FileAttr, FileType, Filesystem, MountOption, ReplyAttr, ReplyData, ReplyDirectory, ReplyEntry,
    ReplyOpen, Request,
};
use libc::{EACCES, EISDIR, ENOENT};
use log::{debug, trace, warn};
use std::ffi::OsStr;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::Duration;

/// Block size reported in attributes.
const BLOCK_SIZE: u32 = 512;

/// Map a request failure to the errno handed back to the kernel.
pub fn errno(err: &FsError) -> i32 {
    match err {
        FsError::NotFound(_)
        | FsError::NotADirectory(_)
        | FsError::NotVirtual(_)
        | FsError::OrdinalOverflow(_) => ENOENT,
        FsError::IsADirectory(_) => EISDIR,
        FsError::PermissionDenied(_) => EACCES,
    }
}

/// FUSE filesystem over a [`PackageTree`].
pub struct PacFuseFS {
    tree: PackageTree,
    /// Attribute and entry cache lifetime.
    ttl: Duration,
    /// User ID for file ownership (the mounting user).
    uid: u32,
    /// Group ID for file ownership (the mounting group).
    gid: u32,
}

impl PacFuseFS {
    pub fn new(tree: PackageTree, ttl: Duration) -> Self {
        // Get current user/group IDs
        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };

        Self {
            tree,
            ttl,
            uid,
            gid,
        }
    }

    /// Number of package directories.
    pub fn package_count(&self) -> usize {
        self.tree.catalog().len()
    }

    fn file_attr(&self, attr: &EntryAttr) -> FileAttr {
        FileAttr {
            ino: attr.ino,
            size: attr.size,
            blocks: attr.size.div_ceil(BLOCK_SIZE as u64),
            atime: attr.time,
            mtime: attr.time,
            ctime: attr.time,
            crtime: attr.time,
            kind: file_type(attr.kind),
            perm: attr.perm,
            nlink: attr.nlink,
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        }
    }
}

fn file_type(kind: EntryKind) -> FileType {
    match kind {
        EntryKind::Directory => FileType::Directory,
        EntryKind::RegularFile => FileType::RegularFile,
        EntryKind::Symlink => FileType::Symlink,
    }
}

impl Filesystem for PacFuseFS {
    /// Get file attributes.
    fn getattr(&mut self, _req: &Request, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        trace!("getattr(ino={})", ino);

        match self.tree.get_attributes(ino) {
            Ok(attr) => reply.attr(&self.ttl, &self.file_attr(&attr)),
            Err(e) => {
                debug!("getattr: {}", e);
                reply.error(errno(&e));
            }
        }
    }

    /// Look up a directory entry by name.
    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(name) = name.to_str() else {
            reply.error(ENOENT);
            return;
        };

        match self.tree.lookup(parent, name) {
            Ok(attr) => reply.entry(&self.ttl, &self.file_attr(&attr), 0),
            Err(e) => {
                debug!("lookup: '{}' under {}: {}", name, parent, e);
                reply.error(errno(&e));
            }
        }
    }

    /// Open a directory for listing.
    fn opendir(&mut self, _req: &Request, ino: u64, flags: i32, reply: ReplyOpen) {
        trace!("opendir(ino={})", ino);

        match self.tree.open_dir(ino, AccessMode::from_flags(flags)) {
            Ok(fh) => reply.opened(fh, 0),
            Err(e) => reply.error(errno(&e)),
        }
    }

    /// Read directory entries.
    ///
    /// `offset` is the cursor of the last entry the kernel accepted.
    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        trace!("readdir(ino={}, offset={})", ino, offset);

        let entries = match self.tree.entries_after(ino, offset.max(0) as u64) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("readdir: {}", e);
                reply.error(errno(&e));
                return;
            }
        };

        for entry in entries {
            let full = reply.add(
                entry.attr.ino,
                entry.cursor as i64,
                file_type(entry.attr.kind),
                &entry.name,
            );
            if full {
                break;
            }
        }

        reply.ok();
    }

    /// Open a file. Any write intent is refused.
    fn open(&mut self, _req: &Request, ino: u64, flags: i32, reply: ReplyOpen) {
        trace!("open(ino={}, flags={:#o})", ino, flags);

        match self.tree.open(ino, AccessMode::from_flags(flags)) {
            Ok(fh) => reply.opened(fh, 0),
            Err(e) => {
                if matches!(e, FsError::PermissionDenied(_)) {
                    warn!("open: write access refused for inode {}", ino);
                }
                reply.error(errno(&e));
            }
        }
    }

    /// Read file data rendered from package metadata.
    fn read(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        match self.tree.read(ino, offset.max(0) as u64, size as usize) {
            Ok(data) => reply.data(&data),
            Err(e) => {
                debug!("read: {}", e);
                reply.error(errno(&e));
            }
        }
    }

    /// Resolve a dependency link.
    fn readlink(&mut self, _req: &Request, ino: u64, reply: ReplyData) {
        match self.tree.read_link(ino) {
            Ok(target) => reply.data(target.as_os_str().as_bytes()),
            Err(e) => {
                debug!("readlink: {}", e);
                reply.error(errno(&e));
            }
        }
    }
}

fn mount_options(fuse_debug: bool) -> Vec<MountOption> {
    let mut options = vec![
        MountOption::RO,
        MountOption::FSName("pacfs".to_string()),
        MountOption::Subtype("pacfs".to_string()),
        MountOption::DefaultPermissions,
    ];
    if fuse_debug {
        options.push(MountOption::CUSTOM("debug".to_string()));
    }
    options
}

/// Mount the package tree at `mount_point`.
///
/// This function blocks until the filesystem is unmounted.
///
/// # Errors
///
/// Returns an error if the mount point is invalid or FUSE mounting fails.
///
/// # Example
///
/// ```ignore
/// use pacfs::fuse::mount;
/// use pacfs::{MountConfig, PackageTree};
///
/// let config = MountConfig::default();
/// let tree = PackageTree::load(&config)?;
/// mount(tree, "/mnt/packages", config.attr_ttl(), false)?;
/// ```
pub fn mount<P: AsRef<Path>>(
    tree: PackageTree,
    mount_point: P,
    ttl: Duration,
    fuse_debug: bool,
) -> io::Result<()> {
    let fs = PacFuseFS::new(tree, ttl);
    let mount_point = mount_point.as_ref();

    debug!(
        "Mounting {} packages at {}",
        fs.package_count(),
        mount_point.display()
    );

    fuser::mount2(fs, mount_point, &mount_options(fuse_debug))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("FUSE mount failed: {}", e)))
}

/// Mount the package tree in the background and return a session handle.
///
/// The filesystem will remain mounted until the returned `BackgroundSession`
/// is dropped or `unmount()` is called on it.
pub fn mount_background<P: AsRef<Path>>(
    tree: PackageTree,
    mount_point: P,
    ttl: Duration,
) -> io::Result<fuser::BackgroundSession> {
    let fs = PacFuseFS::new(tree, ttl);
    let mount_point = mount_point.as_ref();

    debug!(
        "Mounting {} packages at {} (background)",
        fs.package_count(),
        mount_point.display()
    );

    fuser::spawn_mount2(fs, mount_point, &mount_options(false))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("FUSE mount failed: {}", e)))
}
