// --- FILE: treetrim-lib/src/collapse.rs ---

use std::path::{Path, PathBuf};

use log::trace;

use crate::classify::classify;
use crate::config::ScanConfig;
use crate::listing::{entry_name, list_directory};
use crate::repo::{RepoDetector, ZipIndex};

/// A run of directories merged into one display segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Basenames from the starting directory down to the terminal one.
    pub segments: Vec<String>,
    /// The directory whose children are actually rendered.
    pub terminal: PathBuf,
}

impl Chain {
    /// The slash-joined chain, e.g. `"A/B/C"`.
    pub fn label(&self) -> String {
        self.segments.join("/")
    }
}

/// Follows single-child, file-empty directories starting at `start`.
///
/// Stops at the first directory that has zero or several subdirectories or
/// at least one kept file. A hidden directory (when hidden entries are
/// ignored) truncates the chain before it; if `start` itself is hidden there
/// is no chain at all.
///
/// The chain never descends into a directory matching an ignore pattern, nor
/// into a detected repository, so the walker can still skip or mark it.
pub(crate) fn collapse_chain(
    start: &Path,
    config: &ScanConfig,
    repos: &RepoDetector<'_>,
) -> Option<Chain> {
    let mut segments = Vec::new();
    let mut current = start.to_path_buf();

    loop {
        let name = entry_name(&current);
        if config.hides(&name) {
            if segments.is_empty() {
                return None;
            }
            let terminal = current
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start.to_path_buf());
            return Some(Chain { segments, terminal });
        }

        let listing = list_directory(&current);
        let has_kept_files = listing
            .files
            .iter()
            .any(|file| classify(file, config).is_kept());
        segments.push(name);

        if let [only_dir] = listing.dirs.as_slice() {
            if !has_kept_files {
                let child = current.join(only_dir);
                if can_descend(only_dir, &child, config, repos) {
                    trace!("Collapsing {:?} into {:?}", current, child);
                    current = child;
                    continue;
                }
            }
        }

        return Some(Chain {
            segments,
            terminal: current,
        });
    }
}

/// Public entry point for [`collapse_chain`] using the zip archive index.
pub fn collapse(start: &Path, config: &ScanConfig) -> Option<Chain> {
    let repos = RepoDetector {
        config: &config.repo,
        index: &ZipIndex,
    };
    collapse_chain(start, config, &repos)
}

fn can_descend(name: &str, child: &Path, config: &ScanConfig, repos: &RepoDetector<'_>) -> bool {
    if config.matches_ignore_pattern(name) {
        return false;
    }
    repos.directory(child).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoConfig;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn chain_of_single_children_ends_at_branching_directory() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("A");
        fs::create_dir_all(a.join("B/C/D1"))?;
        fs::create_dir_all(a.join("B/C/D2"))?;

        let chain = collapse(&a, &ScanConfig::default()).expect("chain");
        assert_eq!(chain.label(), "A/B/C");
        assert_eq!(chain.terminal, a.join("B/C"));
        Ok(())
    }

    #[test]
    fn directory_with_a_file_is_never_collapsed() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("A");
        fs::create_dir_all(a.join("B"))?;
        fs::write(a.join("keep.txt"), "x")?;

        let chain = collapse(&a, &ScanConfig::default()).expect("chain");
        assert_eq!(chain.segments, vec!["A"]);
        assert_eq!(chain.terminal, a);
        Ok(())
    }

    #[test]
    fn leaf_folder_is_a_chain_of_one() -> Result<()> {
        let dir = tempdir()?;
        let leaf = dir.path().join("leaf");
        fs::create_dir(&leaf)?;

        let chain = collapse(&leaf, &ScanConfig::default()).expect("chain");
        assert_eq!(chain.segments, vec!["leaf"]);
        assert_eq!(chain.terminal, leaf);
        Ok(())
    }

    #[test]
    fn ignored_files_do_not_stop_the_chain() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("A");
        fs::create_dir_all(a.join("B"))?;
        fs::write(a.join(".DS_Store"), "")?;
        fs::write(a.join("Icon\r"), "")?;
        fs::write(a.join("B").join("file.txt"), "")?;

        let chain = collapse(&a, &ScanConfig::default()).expect("chain");
        assert_eq!(chain.label(), "A/B");
        assert_eq!(chain.terminal, a.join("B"));
        Ok(())
    }

    #[test]
    fn hidden_child_truncates_the_chain() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("A");
        fs::create_dir_all(a.join(".cache/inner"))?;

        let chain = collapse(&a, &ScanConfig::default()).expect("chain");
        assert_eq!(chain.segments, vec!["A"]);
        assert_eq!(chain.terminal, a);

        let hidden = dir.path().join(".hidden");
        fs::create_dir(&hidden)?;
        assert_eq!(collapse(&hidden, &ScanConfig::default()), None);
        Ok(())
    }

    #[test]
    fn stops_before_ignored_pattern_and_repositories() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("A");
        fs::create_dir_all(a.join("node_modules/pkg"))?;
        let config = ScanConfig {
            ignore_patterns: vec!["node_modules".to_string()],
            ..ScanConfig::default()
        };
        let chain = collapse(&a, &config).expect("chain");
        assert_eq!(chain.segments, vec!["A"]);

        let w = dir.path().join("W");
        fs::create_dir_all(w.join("project/.git"))?;
        fs::create_dir_all(w.join("project/src"))?;
        let repo_mode = ScanConfig {
            repo: RepoConfig {
                enable_detection: true,
                ..RepoConfig::default()
            },
            ..ScanConfig::default()
        };
        assert_eq!(collapse(&w, &repo_mode).expect("chain").segments, vec!["W"]);
        assert_eq!(
            collapse(&w, &ScanConfig::default()).expect("chain").label(),
            "W/project"
        );
        Ok(())
    }
}
