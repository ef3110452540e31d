//! Parser for the `%SECTION%` block format used by `desc` and `files`.
//!
//! ```text
//! %NAME%
//! zlib
//!
//! %DEPENDS%
//! glibc
//! ```

use crate::error::{Error, Result};
use crate::package::{InstallReason, PackageRecord};
use std::collections::HashMap;
use std::path::Path;

/// Sections of one database file, keyed by name without the `%` markers.
#[derive(Debug, Default)]
pub struct Sections {
    values: HashMap<String, Vec<String>>,
}

impl Sections {
    /// Parse the text of a `desc` or `files` file.
    pub fn parse(text: &str) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                current = None;
                continue;
            }
            if line.len() > 2 && line.starts_with('%') && line.ends_with('%') {
                let key = line[1..line.len() - 1].to_string();
                values.entry(key.clone()).or_default();
                current = Some(key);
                continue;
            }
            if let Some(key) = &current {
                values.entry(key.clone()).or_default().push(line.to_string());
            }
        }

        Self { values }
    }

    /// All lines of a section, empty if absent.
    pub fn list(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First line of a section.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.list(key).first().map(String::as_str)
    }

    fn number(&self, key: &str) -> Result<Option<i64>> {
        match self.first(key) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| Error::InvalidNumber {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
        }
    }
}

/// Build a record from a parsed `desc` file and its optional `files` sibling.
///
/// The repository is left as `local`; the caller assigns it afterwards.
pub fn record_from_sections(
    path: &Path,
    desc: &Sections,
    files: Option<&Sections>,
) -> Result<PackageRecord> {
    let invalid = |reason: &str| Error::InvalidDesc {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let name = desc.first("NAME").ok_or_else(|| invalid("missing %NAME%"))?;
    let version = desc
        .first("VERSION")
        .ok_or_else(|| invalid("missing %VERSION%"))?;

    let mut record = PackageRecord::new(name, version);
    if let Some(base) = desc.first("BASE") {
        record.base = base.to_string();
    }
    record.description = desc.first("DESC").unwrap_or_default().to_string();
    record.url = desc.first("URL").unwrap_or_default().to_string();
    record.packager = desc.first("PACKAGER").unwrap_or_default().to_string();
    record.size = desc.number("SIZE")?.unwrap_or(0).max(0) as u64;
    record.install_date = desc.number("INSTALLDATE")?.unwrap_or(0);
    record.reason = desc
        .first("REASON")
        .map(InstallReason::from_code)
        .unwrap_or_default();
    record.depends = desc.list("DEPENDS").to_vec();
    record.optdepends = desc.list("OPTDEPENDS").to_vec();

    if let Some(files) = files {
        record.backup = files
            .list("BACKUP")
            .iter()
            .filter_map(|line| line.split('\t').next())
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const DESC: &str = "%NAME%\nzlib\n\n%VERSION%\n1:1.3.1-2\n\n%BASE%\nzlib\n\n\
%DESC%\nCompression library\n\n%URL%\nhttps://www.zlib.net/\n\n\
%PACKAGER%\nJane Doe <jane@example.org>\n\n%SIZE%\n394244\n\n\
%INSTALLDATE%\n1700000000\n\n%REASON%\n1\n\n%DEPENDS%\nglibc\nbash>=5\n\n\
%OPTDEPENDS%\nminizip: extras\n\n";

    #[test]
    fn parses_desc_sections() {
        let sections = Sections::parse(DESC);
        let record = record_from_sections(&PathBuf::from("desc"), &sections, None).unwrap();

        assert_eq!(record.name, "zlib");
        assert_eq!(record.version, "1:1.3.1-2");
        assert_eq!(record.size, 394244);
        assert_eq!(record.install_date, 1700000000);
        assert_eq!(record.reason, InstallReason::AsDependency);
        assert_eq!(record.depends, vec!["glibc", "bash>=5"]);
        assert_eq!(record.optdepends, vec!["minizip: extras"]);
        assert!(record.backup.is_empty());
    }

    #[test]
    fn backup_paths_drop_checksums() {
        let files = Sections::parse(
            "%FILES%\netc/\netc/foo.conf\n\n%BACKUP%\netc/foo.conf\t0123abcd\n",
        );
        let desc = Sections::parse("%NAME%\nfoo\n\n%VERSION%\n1-1\n");
        let record =
            record_from_sections(&PathBuf::from("desc"), &desc, Some(&files)).unwrap();
        assert_eq!(record.backup, vec!["etc/foo.conf"]);
    }

    #[test]
    fn missing_version_is_rejected() {
        let desc = Sections::parse("%NAME%\nfoo\n");
        let err = record_from_sections(&PathBuf::from("desc"), &desc, None).unwrap_err();
        assert!(matches!(err, Error::InvalidDesc { .. }));
    }

    #[test]
    fn bad_size_is_rejected() {
        let desc = Sections::parse("%NAME%\nfoo\n\n%VERSION%\n1\n\n%SIZE%\nbig\n");
        let err = record_from_sections(&PathBuf::from("desc"), &desc, None).unwrap_err();
        assert!(matches!(err, Error::InvalidNumber { .. }));
    }
}
