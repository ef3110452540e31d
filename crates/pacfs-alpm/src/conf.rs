use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Repository names declared in a `pacman.conf`, in declaration order.
pub fn repositories_from_conf(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_repositories(&text))
}

/// Extract `[section]` names other than `[options]`.
pub fn parse_repositories(text: &str) -> Vec<String> {
    let mut repos = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if !(line.starts_with('[') && line.ends_with(']')) {
            continue;
        }
        let name = line[1..line.len() - 1].trim();
        if name.is_empty() || name == "options" || repos.iter().any(|r| r == name) {
            continue;
        }
        repos.push(name.to_string());
    }
    repos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_options_and_comments() {
        let conf = "\
[options]
HoldPkg = pacman glibc
#[testing]
#Include = /etc/pacman.d/mirrorlist

[core]
Include = /etc/pacman.d/mirrorlist

[extra]
Include = /etc/pacman.d/mirrorlist
";
        assert_eq!(parse_repositories(conf), vec!["core", "extra"]);
    }
}
