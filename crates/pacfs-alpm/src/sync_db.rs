//! Repository membership from sync databases.
//!
//! A sync database (`<dbpath>/sync/<repo>.db`) is a gzip-compressed tar
//! archive holding one `<name>-<version>/desc` entry per package.

use crate::desc::Sections;
use crate::error::Result;
use flate2::read::GzDecoder;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Package names contained in a single sync database.
pub fn package_names(db_file: &Path) -> Result<HashSet<String>> {
    let file = File::open(db_file)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut names = HashSet::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let is_desc = entry
            .path()?
            .file_name()
            .map(|n| n == "desc")
            .unwrap_or(false);
        if !is_desc {
            continue;
        }
        let mut text = String::new();
        entry.read_to_string(&mut text)?;
        if let Some(name) = Sections::parse(&text).first("NAME") {
            names.insert(name.to_string());
        }
    }

    Ok(names)
}

/// Maps package names to the first repository that carries them.
#[derive(Debug, Default, Clone)]
pub struct RepoIndex {
    owners: HashMap<String, String>,
}

impl RepoIndex {
    /// Scan `<sync_dir>/<repo>.db` for every repository, in priority order.
    ///
    /// Missing or unreadable databases are skipped.
    pub fn scan(sync_dir: &Path, repositories: &[String]) -> Self {
        let mut index = Self::default();
        for repo in repositories {
            let db_file = sync_dir.join(format!("{}.db", repo));
            match package_names(&db_file) {
                Ok(names) => {
                    debug!("sync db '{}': {} packages", repo, names.len());
                    for name in names {
                        index.insert(name, repo);
                    }
                }
                Err(e) => warn!("skipping sync db {}: {}", db_file.display(), e),
            }
        }
        index
    }

    /// Record `name` as provided by `repo` unless an earlier repo already does.
    pub fn insert(&mut self, name: impl Into<String>, repo: &str) {
        self.owners
            .entry(name.into())
            .or_insert_with(|| repo.to_string());
    }

    /// The owning repository, or `local` for foreign packages.
    pub fn repository_of(&self, name: &str) -> &str {
        self.owners.get(name).map(String::as_str).unwrap_or("local")
    }
}
