use crate::error::{Error, Result};
use crate::inode::RADIX;
use pacfs_alpm::DbConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for mounting the package tree.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// mount_path = "/mnt/packages"
/// icon_lookup = false
///
/// [database]
/// db_path = "/var/lib/pacman"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MountConfig {
    /// Absolute path the tree is mounted at; symlink targets start with it.
    pub mount_path: PathBuf,
    /// Where the package database lives.
    #[serde(rename = "database")]
    pub db: DbConfig,
    /// Expose `.directory` and `url.desktop` files for file managers.
    pub desktop_entries: bool,
    /// Search `icon_dirs` for a per-package icon.
    pub icon_lookup: bool,
    /// Directories searched for `<name>.png` / `<name>.svg`.
    pub icon_dirs: Vec<PathBuf>,
    /// Suffix appended to dependency link names.
    pub link_suffix: String,
    /// Upper bound on entries listed in one package directory.
    pub max_entries_per_package: u64,
    /// Attribute cache lifetime handed to the kernel, in seconds.
    pub attr_ttl_secs: u64,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            mount_path: PathBuf::from("/"),
            db: DbConfig::default(),
            desktop_entries: true,
            icon_lookup: true,
            icon_dirs: vec![
                PathBuf::from("/usr/share/pixmaps"),
                PathBuf::from("/usr/share/icons/hicolor/64x64/apps"),
            ],
            link_suffix: ".dep".to_string(),
            max_entries_per_package: RADIX,
            attr_ttl_secs: 10,
        }
    }
}

impl MountConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text, path)
    }

    /// Reject values the inode layout cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries_per_package == 0 || self.max_entries_per_package > RADIX {
            return Err(Error::InvalidConfig(format!(
                "max_entries_per_package must be within 1..={}, got {}",
                RADIX, self.max_entries_per_package
            )));
        }
        if self.link_suffix.is_empty() || self.link_suffix.contains('/') {
            return Err(Error::InvalidConfig(format!(
                "link_suffix '{}' must be non-empty and contain no '/'",
                self.link_suffix
            )));
        }
        Ok(())
    }

    pub fn attr_ttl(&self) -> Duration {
        Duration::from_secs(self.attr_ttl_secs)
    }
}
