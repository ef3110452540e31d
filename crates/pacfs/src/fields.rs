//! Virtual files synthesised from package metadata.
//!
//! Each [`FieldKind`] knows its file name, when it applies, and how to render
//! its content. Kinds are listed in [`FieldKind::ALL`] order, which is also the
//! order their ordinals are assigned in.

use crate::attr::{EntryAttr, EntryKind};
use crate::catalog::Package;
use crate::config::MountConfig;
use chrono::{DateTime, Local};
use log::debug;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

const DEFAULT_ICON: &str = "package";

/// One kind of virtual file inside a package directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `.directory`, the icon hint read by Dolphin.
    DesktopEntry,
    Version,
    Packager,
    Description,
    Repository,
    InstallReason,
    BuildBase,
    /// `url.desktop`, a launcher opening the upstream URL.
    Url,
    Backup,
}

impl FieldKind {
    pub const ALL: [FieldKind; 9] = [
        FieldKind::DesktopEntry,
        FieldKind::Version,
        FieldKind::Packager,
        FieldKind::Description,
        FieldKind::Repository,
        FieldKind::InstallReason,
        FieldKind::BuildBase,
        FieldKind::Url,
        FieldKind::Backup,
    ];

    /// Permission bits; launchers are marked executable.
    pub fn perm(self) -> u16 {
        match self {
            FieldKind::Url | FieldKind::Packager => 0o555,
            _ => 0o444,
        }
    }
}

/// Options that shape the field set, taken from [`MountConfig`].
#[derive(Debug, Clone)]
pub struct FieldOptions {
    pub desktop_entries: bool,
    pub icon_lookup: bool,
    pub icon_dirs: Vec<PathBuf>,
    /// Installation root that backup paths are relative to.
    pub root_dir: PathBuf,
}

impl From<&MountConfig> for FieldOptions {
    fn from(config: &MountConfig) -> Self {
        Self {
            desktop_entries: config.desktop_entries,
            icon_lookup: config.icon_lookup,
            icon_dirs: config.icon_dirs.clone(),
            root_dir: config.db.root_dir.clone(),
        }
    }
}

impl Default for FieldOptions {
    fn default() -> Self {
        FieldOptions::from(&MountConfig::default())
    }
}

/// Renders the virtual files of a package.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    options: FieldOptions,
}

impl FieldCatalog {
    pub fn new(options: FieldOptions) -> Self {
        Self { options }
    }

    /// Applicable kinds for `pkg`, in ordinal order.
    pub fn applicable<'a>(&'a self, pkg: &'a Package) -> impl Iterator<Item = FieldKind> + 'a {
        FieldKind::ALL
            .into_iter()
            .filter(move |kind| self.is_applicable(*kind, pkg))
    }

    pub fn is_applicable(&self, kind: FieldKind, pkg: &Package) -> bool {
        let record = &pkg.record;
        match kind {
            FieldKind::DesktopEntry => self.options.desktop_entries,
            FieldKind::Url => self.options.desktop_entries && !record.url.is_empty(),
            FieldKind::Packager => !record.packager.trim().is_empty(),
            FieldKind::BuildBase => record.base != record.name,
            FieldKind::Backup => !record.backup.is_empty(),
            FieldKind::Version
            | FieldKind::Description
            | FieldKind::Repository
            | FieldKind::InstallReason => true,
        }
    }

    /// File name of `kind` inside the directory of `pkg`.
    pub fn filename(&self, kind: FieldKind, pkg: &Package) -> String {
        let record = &pkg.record;
        let name = match kind {
            FieldKind::DesktopEntry => ".directory".to_string(),
            FieldKind::Version => format!("{}.version", record.version),
            FieldKind::Packager => format!("{}.packager", packager_label(&record.packager)),
            FieldKind::Description => format!("{}.txt", record.name),
            FieldKind::Repository => format!("{}.db", record.repository),
            FieldKind::InstallReason => format!("{}.install", record.reason.label()),
            FieldKind::BuildBase => format!("{}.base", record.base),
            FieldKind::Url => "url.desktop".to_string(),
            FieldKind::Backup => {
                let path = record.backup.first().map(String::as_str).unwrap_or_default();
                format!("{}.backup", path.trim_start_matches('/').replace('/', " "))
            }
        };
        name.replace('/', " ")
    }

    /// Full content of `kind` for `pkg`.
    pub fn render(&self, kind: FieldKind, pkg: &Package) -> Vec<u8> {
        let record = &pkg.record;
        match kind {
            FieldKind::DesktopEntry => {
                format!("[Desktop Entry]\nIcon={}\n", self.icon_for(pkg)).into_bytes()
            }
            FieldKind::Version => record.version.clone().into_bytes(),
            FieldKind::Packager => record.packager.clone().into_bytes(),
            FieldKind::Description => describe(pkg).into_bytes(),
            FieldKind::Repository | FieldKind::InstallReason | FieldKind::BuildBase => Vec::new(),
            FieldKind::Url => format!(
                "[Desktop Entry]\nName={} url\nIcon={}\nTerminal=false\n\
                 Type=Application\nExec=xdg-open \"{}\"\n",
                record.name,
                self.icon_for(pkg),
                record.url
            )
            .into_bytes(),
            FieldKind::Backup => self.read_backup(pkg),
        }
    }

    /// Attributes of `kind` for `pkg`, addressed by `ino`.
    pub fn attributes(&self, kind: FieldKind, pkg: &Package, ino: u64) -> EntryAttr {
        EntryAttr {
            ino,
            size: self.render(kind, pkg).len() as u64,
            kind: EntryKind::RegularFile,
            perm: kind.perm(),
            nlink: 1,
            time: pkg.install_time(),
        }
    }

    fn icon_for(&self, pkg: &Package) -> String {
        if !self.options.icon_lookup {
            return DEFAULT_ICON.to_string();
        }
        for dir in &self.options.icon_dirs {
            for ext in ["png", "svg"] {
                let candidate = dir.join(format!("{}.{}", pkg.name(), ext));
                if candidate.is_file() {
                    return candidate.display().to_string();
                }
            }
        }
        DEFAULT_ICON.to_string()
    }

    fn read_backup(&self, pkg: &Package) -> Vec<u8> {
        let Some(path) = pkg.record.backup.first() else {
            return Vec::new();
        };
        let full = self.options.root_dir.join(path.trim_start_matches('/'));
        match fs::read(&full) {
            Ok(data) => data,
            Err(e) => {
                debug!("backup file {} unreadable: {}", full.display(), e);
                Vec::new()
            }
        }
    }
}

/// Packager name without the e-mail part.
fn packager_label(packager: &str) -> &str {
    let label = packager.split('<').next().unwrap_or_default().trim();
    if label.is_empty() {
        packager.trim()
    } else {
        label
    }
}

fn format_install_date(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%a %d %b %Y %X %Z")
            .to_string(),
        None => secs.to_string(),
    }
}

/// Multi-line summary shown in `<name>.txt`.
fn describe(pkg: &Package) -> String {
    let r = &pkg.record;
    let mut text = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(text, "{}\n{}\n{}\n{}\n", r.name, r.version, r.description, r.url);
    let _ = writeln!(text, "installdate: {}", format_install_date(r.install_date));
    let _ = writeln!(text, "Db: {}", r.repository);
    let _ = writeln!(text, "Install reason: {}", r.reason.describe());
    let _ = writeln!(text, "Dependencies:");
    for dep in &r.depends {
        let _ = writeln!(text, "\t{}", dep);
    }
    if !r.optdepends.is_empty() {
        let _ = writeln!(text, "\nOptionals:");
        for opt in &r.optdepends {
            let _ = writeln!(text, "\t{}", opt);
        }
    }
    if !r.backup.is_empty() {
        let _ = writeln!(text, "\nBackups:");
        for backup in &r.backup {
            let _ = writeln!(text, "\t/{}", backup.trim_start_matches('/'));
        }
    }
    text
}
