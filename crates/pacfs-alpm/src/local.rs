use crate::conf::repositories_from_conf;
use crate::desc::{record_from_sections, Sections};
use crate::error::{Error, Result};
use crate::package::PackageRecord;
use crate::sync_db::RepoIndex;
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Anything able to produce the set of installed packages.
pub trait PackageSource {
    /// Load every installed package, in a deterministic order.
    fn load(&self) -> Result<Vec<PackageRecord>>;
}

impl PackageSource for Vec<PackageRecord> {
    fn load(&self) -> Result<Vec<PackageRecord>> {
        Ok(self.clone())
    }
}

/// Location of the package database on disk.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DbConfig {
    /// Installation root; backup paths are relative to it.
    pub root_dir: PathBuf,
    /// Database directory containing `local/` and `sync/`.
    pub db_path: PathBuf,
    /// pacman configuration listing the repositories.
    pub pacman_conf: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("/"),
            db_path: PathBuf::from("/var/lib/pacman"),
            pacman_conf: PathBuf::from("/etc/pacman.conf"),
        }
    }
}

/// The pacman local database (`<dbpath>/local`).
#[derive(Debug, Clone)]
pub struct LocalDb {
    config: DbConfig,
}

impl LocalDb {
    /// Open the local database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatabaseNotFound`] if `<db_path>/local` is not a directory.
    pub fn open(config: DbConfig) -> Result<Self> {
        let local = config.db_path.join("local");
        if !local.is_dir() {
            return Err(Error::DatabaseNotFound(local));
        }
        Ok(Self { config })
    }

    /// The configuration this database was opened with.
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    fn local_dir(&self) -> PathBuf {
        self.config.db_path.join("local")
    }

    fn repo_index(&self) -> RepoIndex {
        let repositories = match repositories_from_conf(&self.config.pacman_conf) {
            Ok(repos) => repos,
            Err(e) => {
                warn!("{}; every package is reported as local", e);
                Vec::new()
            }
        };
        RepoIndex::scan(&self.config.db_path.join("sync"), &repositories)
    }

    fn read_entry(&self, dir: &Path) -> Result<Option<PackageRecord>> {
        let desc_path = dir.join("desc");
        if !desc_path.is_file() {
            return Ok(None);
        }
        let desc = Sections::parse(&fs::read_to_string(&desc_path)?);
        let files = match fs::read_to_string(dir.join("files")) {
            Ok(text) => Some(Sections::parse(&text)),
            Err(_) => None,
        };
        record_from_sections(&desc_path, &desc, files.as_ref()).map(Some)
    }
}

impl PackageSource for LocalDb {
    fn load(&self) -> Result<Vec<PackageRecord>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(self.local_dir())? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            match self.read_entry(&path) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => debug!("no desc file in {}", path.display()),
                Err(e) => warn!("skipping {}: {}", path.display(), e),
            }
        }

        let repos = self.repo_index();
        for record in &mut records {
            record.repository = repos.repository_of(&record.name).to_string();
        }

        records.sort_by(|a, b| a.name.cmp(&b.name));
        info!(
            "loaded {} packages from {}",
            records.len(),
            self.local_dir().display()
        );
        Ok(records)
    }
}
