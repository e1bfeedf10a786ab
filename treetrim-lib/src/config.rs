// --- FILE: treetrim-lib/src/config.rs ---

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Configuration for a treetrim scan.
///
/// Built once by the calling application (e.g., the CLI) from defaults,
/// config files and flags, then only ever borrowed by the scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Lowercased file names and extensions (with their leading dot, e.g.
    /// `".jpg"`) whose files are left out of the snapshot.
    pub ignore_types: HashSet<String>,

    /// Substrings matched against directory names. A directory whose name
    /// contains any of them is skipped together with its whole subtree.
    pub ignore_patterns: Vec<String>,

    /// Merge runs of single-child, file-empty directories into one line.
    pub collapse_chains: bool,

    /// Leave out files and directories whose names start with `.`.
    pub ignore_hidden: bool,

    /// Leave out the invisible `Icon\r` files macOS drops into folders with
    /// custom icons.
    pub eliminate_icon_files: bool,

    /// Maximum number of regular files listed per directory before they are
    /// replaced by a single summary line. `0` shows folders only.
    pub max_files_per_directory: usize,

    /// Maximum recursion depth below the root. `0` means unlimited.
    pub max_depth: usize,

    /// Repository detection settings.
    pub repo: RepoConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore_types: HashSet::new(),
            ignore_patterns: Vec::new(),
            collapse_chains: true,
            ignore_hidden: true,
            eliminate_icon_files: true,
            max_files_per_directory: 0,
            max_depth: 0,
            repo: RepoConfig::default(),
        }
    }
}

impl ScanConfig {
    /// True if the name is hidden and hidden entries are being ignored.
    pub fn hides(&self, name: &str) -> bool {
        self.ignore_hidden && name.starts_with('.')
    }

    /// True if the directory name contains one of the ignore patterns.
    pub fn matches_ignore_pattern(&self, dir_name: &str) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && dir_name.contains(pattern.as_str()))
    }
}

/// Settings for repository mode.
#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Report version-control repositories (and archives containing one)
    /// with marker lines.
    pub enable_detection: bool,

    /// Keep listing folders and files inside a detected repository. When
    /// false only nested repositories are reported below it.
    pub show_files_inside_repo: bool,

    /// Marker names per repository kind, checked in declaration order.
    pub markers: Vec<RepoMarkerSet>,

    /// Lowercased extensions (without dot) of archives whose entry index is
    /// searched for repository markers.
    pub archive_extensions: Vec<String>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            enable_detection: false,
            show_files_inside_repo: false,
            markers: default_repo_markers(),
            archive_extensions: vec!["zip".to_string()],
        }
    }
}

impl RepoConfig {
    /// True if the file name carries one of the configured archive extensions.
    pub fn is_archive_name(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_lowercase();
                self.archive_extensions.iter().any(|known| *known == ext)
            }
            _ => false,
        }
    }
}

/// The marker names identifying one kind of repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMarkerSet {
    pub kind: RepoKind,
    pub names: Vec<String>,
}

impl RepoMarkerSet {
    pub fn new(kind: RepoKind, names: &[&str]) -> Self {
        Self {
            kind,
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// The built-in marker table.
pub fn default_repo_markers() -> Vec<RepoMarkerSet> {
    vec![
        RepoMarkerSet::new(RepoKind::Git, &[".git"]),
        RepoMarkerSet::new(RepoKind::Mercurial, &[".hg"]),
        RepoMarkerSet::new(RepoKind::Subversion, &[".svn"]),
        RepoMarkerSet::new(RepoKind::Bazaar, &[".bzr"]),
        RepoMarkerSet::new(RepoKind::Fossil, &[".fslckout", "_FOSSIL_"]),
    ]
}

/// Version-control systems recognised by the repository detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoKind {
    Git,
    Mercurial,
    Subversion,
    Bazaar,
    Fossil,
}

impl RepoKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RepoKind::Git => "git",
            RepoKind::Mercurial => "mercurial",
            RepoKind::Subversion => "subversion",
            RepoKind::Bazaar => "bazaar",
            RepoKind::Fossil => "fossil",
        }
    }
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepoKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "git" => Ok(RepoKind::Git),
            "mercurial" | "hg" => Ok(RepoKind::Mercurial),
            "subversion" | "svn" => Ok(RepoKind::Subversion),
            "bazaar" | "bzr" => Ok(RepoKind::Bazaar),
            "fossil" => Ok(RepoKind::Fossil),
            other => Err(format!("Unknown repository kind '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_patterns_use_substring_containment() {
        let config = ScanConfig {
            ignore_patterns: vec!["node_modules".to_string(), "cache".to_string()],
            ..ScanConfig::default()
        };
        assert!(config.matches_ignore_pattern("node_modules"));
        assert!(config.matches_ignore_pattern("my_cache_dir"));
        assert!(!config.matches_ignore_pattern("src"));
        // Not a glob: the star is matched literally.
        let globby = ScanConfig {
            ignore_patterns: vec!["*.tmp".to_string()],
            ..ScanConfig::default()
        };
        assert!(!globby.matches_ignore_pattern("build.tmp"));
    }

    #[test]
    fn archive_names_are_matched_case_insensitively() {
        let repo = RepoConfig::default();
        assert!(repo.is_archive_name("backup.zip"));
        assert!(repo.is_archive_name("Backup.ZIP"));
        assert!(!repo.is_archive_name(".zip"));
        assert!(!repo.is_archive_name("notes.txt"));
        assert!(!repo.is_archive_name("zip"));
    }

    #[test]
    fn repo_kind_parses_aliases() {
        assert_eq!("git".parse::<RepoKind>(), Ok(RepoKind::Git));
        assert_eq!("HG".parse::<RepoKind>(), Ok(RepoKind::Mercurial));
        assert_eq!(" svn ".parse::<RepoKind>(), Ok(RepoKind::Subversion));
        assert!("cvs".parse::<RepoKind>().is_err());
        assert_eq!(RepoKind::Fossil.to_string(), "fossil");
    }
}
