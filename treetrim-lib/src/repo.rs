// --- FILE: treetrim-lib/src/repo.rs ---

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use log::debug;

use crate::config::{RepoConfig, RepoKind};
use crate::errors::{TrimError, TrimResult};

/// Lists the entry names stored in an archive without extracting anything.
///
/// Keeps the repository detector independent of the archive format.
pub trait ArchiveIndex {
    fn list_entry_names(&self, archive_path: &Path) -> TrimResult<Vec<String>>;
}

/// [`ArchiveIndex`] over zip files. Only the central directory is read.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipIndex;

impl ArchiveIndex for ZipIndex {
    fn list_entry_names(&self, archive_path: &Path) -> TrimResult<Vec<String>> {
        let file = File::open(archive_path).map_err(|e| TrimError::IoError {
            path: archive_path.to_path_buf(),
            source: e,
        })?;
        let archive =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|e| TrimError::ArchiveError {
                path: archive_path.to_path_buf(),
                source: e,
            })?;
        Ok(archive.file_names().map(str::to_string).collect())
    }
}

/// Returns the kind of repository rooted at `dir`, if any configured marker
/// exists as a direct child. Kinds and markers are tried in declaration
/// order; the first hit wins.
pub fn is_repository(dir: &Path, repo: &RepoConfig) -> Option<RepoKind> {
    for set in &repo.markers {
        for marker in &set.names {
            if fs::symlink_metadata(dir.join(marker)).is_ok() {
                debug!("{:?} is a {} repository (found {})", dir, set.kind, marker);
                return Some(set.kind);
            }
        }
    }
    None
}

/// Returns the kind of repository stored inside an archive, if any path
/// component of any entry in its index is a configured marker.
///
/// Files without a configured archive extension are never inspected. Any
/// failure to read the index counts as "not a repository archive".
pub fn is_repository_archive(
    file: &Path,
    repo: &RepoConfig,
    index: &dyn ArchiveIndex,
) -> Option<RepoKind> {
    let name = file.file_name()?.to_string_lossy();
    if !repo.is_archive_name(&name) {
        return None;
    }

    let entries = match index.list_entry_names(file) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Treating {:?} as a plain file: {}", file, e);
            return None;
        }
    };

    let components: HashSet<&str> = entries
        .iter()
        .flat_map(|entry| entry.split(['/', '\\']))
        .filter(|part| !part.is_empty())
        .collect();

    for set in &repo.markers {
        for marker in &set.names {
            if components.contains(marker.as_str()) {
                debug!(
                    "{:?} contains a {} repository (entry component {})",
                    file, set.kind, marker
                );
                return Some(set.kind);
            }
        }
    }
    None
}

/// Bundles the repository settings with an archive index for the walker.
pub(crate) struct RepoDetector<'a> {
    pub(crate) config: &'a RepoConfig,
    pub(crate) index: &'a dyn ArchiveIndex,
}

impl RepoDetector<'_> {
    pub(crate) fn enabled(&self) -> bool {
        self.config.enable_detection
    }

    pub(crate) fn directory(&self, dir: &Path) -> Option<RepoKind> {
        if !self.enabled() {
            return None;
        }
        is_repository(dir, self.config)
    }

    pub(crate) fn archive(&self, file: &Path) -> Option<RepoKind> {
        if !self.enabled() {
            return None;
        }
        is_repository_archive(file, self.config, self.index)
    }
}

/// An [`ArchiveIndex`] that always fails.
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NoArchives;

#[cfg(test)]
impl ArchiveIndex for NoArchives {
    fn list_entry_names(&self, archive_path: &Path) -> TrimResult<Vec<String>> {
        Err(TrimError::IoError {
            path: archive_path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "archive inspection disabled",
            ),
        })
    }
}
