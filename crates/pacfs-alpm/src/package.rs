/// Why a package is present on the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallReason {
    /// Installed on request.
    #[default]
    Explicit,
    /// Pulled in to satisfy another package.
    AsDependency,
}

impl InstallReason {
    /// Parse the numeric `%REASON%` value of a `desc` file.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => InstallReason::AsDependency,
            _ => InstallReason::Explicit,
        }
    }

    /// Short label used in file names.
    pub fn label(self) -> &'static str {
        match self {
            InstallReason::Explicit => "explicit",
            InstallReason::AsDependency => "asdependency",
        }
    }

    /// Human-readable label.
    pub fn describe(self) -> &'static str {
        match self {
            InstallReason::Explicit => "Explicitly installed",
            InstallReason::AsDependency => "Installed as a dependency",
        }
    }
}

/// One installed package as recorded in the local database.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageRecord {
    /// Package name (unique within the database).
    pub name: String,
    /// Full version string, e.g. `1.2.3-1`.
    pub version: String,
    /// One-line description.
    pub description: String,
    /// Upstream URL.
    pub url: String,
    /// Packager identity, e.g. `Jane Doe <jane@example.org>`.
    pub packager: String,
    /// Installed size in bytes.
    pub size: u64,
    /// Install time as seconds since the Unix epoch.
    pub install_date: i64,
    /// Install reason.
    pub reason: InstallReason,
    /// Repository that provides the package, or `local`.
    pub repository: String,
    /// Name of the split-package base.
    pub base: String,
    /// Dependency constraints in declared order (`glibc`, `zlib>=1.2`).
    pub depends: Vec<String>,
    /// Optional dependency descriptors in declared order.
    pub optdepends: Vec<String>,
    /// Backup file paths, relative to the installation root.
    pub backup: Vec<String>,
}

impl PackageRecord {
    /// Build a record with the given name and version, everything else empty.
    ///
    /// The build base defaults to the package's own name and the repository
    /// to `local`.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            base: name.clone(),
            name,
            version: version.into(),
            repository: "local".to_string(),
            ..Default::default()
        }
    }
}

/// Extract the package name a dependency constraint refers to.
///
/// The name is everything before the first version comparator, so
/// `zlib>=1.2.11` yields `zlib`.
pub fn dependency_name(constraint: &str) -> &str {
    let end = constraint
        .find(['<', '>', '='])
        .unwrap_or(constraint.len());
    constraint[..end].trim()
}
