use crate::error::{Error, FsError, FsResult, Result};
use crate::inode::MAX_PACKAGES;
use log::{info, warn};
use pacfs_alpm::{PackageRecord, PackageSource};
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A package together with its stable catalog index.
#[derive(Debug, Clone)]
pub struct Package {
    /// Position in the catalog, fixed for the life of the mount.
    pub index: usize,
    /// Database record.
    pub record: PackageRecord,
}

impl Package {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Install time as a `SystemTime`.
    pub fn install_time(&self) -> SystemTime {
        if self.record.install_date >= 0 {
            UNIX_EPOCH + Duration::from_secs(self.record.install_date as u64)
        } else {
            UNIX_EPOCH
        }
    }
}

/// The installed packages, loaded once and never mutated.
#[derive(Debug)]
pub struct Catalog {
    packages: Vec<Package>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Load the catalog from a package source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogUnavailable`] if the source fails.
    pub fn load<S: PackageSource + ?Sized>(source: &S) -> Result<Self> {
        let records = source.load()?;
        let catalog = Self::from_records(records)?;
        info!("catalog ready with {} packages", catalog.len());
        Ok(catalog)
    }

    /// Build a catalog from records in their final order.
    ///
    /// A repeated name keeps its first occurrence.
    pub fn from_records(records: Vec<PackageRecord>) -> Result<Self> {
        if records.len() > MAX_PACKAGES {
            return Err(Error::InvalidConfig(format!(
                "{} packages exceed the addressable {}",
                records.len(),
                MAX_PACKAGES
            )));
        }

        let mut packages = Vec::with_capacity(records.len());
        let mut by_name = HashMap::with_capacity(records.len());

        for record in records {
            if by_name.contains_key(&record.name) {
                warn!("duplicate package '{}' ignored", record.name);
                continue;
            }
            let index = packages.len();
            by_name.insert(record.name.clone(), index);
            packages.push(Package { index, record });
        }

        Ok(Self { packages, by_name })
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// All packages in index order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Package at `index`. The error carries the index as seen by the caller.
    pub fn by_index(&self, index: usize) -> FsResult<&Package> {
        self.packages
            .get(index)
            .ok_or(FsError::NotFound(index as u64))
    }

    /// Package with exactly this name.
    pub fn by_name(&self, name: &str) -> Option<&Package> {
        self.by_name.get(name).map(|&i| &self.packages[i])
    }
}
