use std::time::SystemTime;

/// Type of a node in the package tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    RegularFile,
    Symlink,
}

/// Attributes of one node, independent of the FUSE binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryAttr {
    pub ino: u64,
    pub size: u64,
    pub kind: EntryKind,
    /// Permission bits, e.g. `0o444`.
    pub perm: u16,
    /// Link count. Dependency links carry the target's directory inode here.
    pub nlink: u32,
    /// Used for access, modification and change time alike.
    pub time: SystemTime,
}

impl EntryAttr {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
