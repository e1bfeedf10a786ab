// --- FILE: treetrim-lib/src/lib.rs ---

#![doc = include_str!("../README.md")]

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};

mod classify;
mod collapse;
mod config;
mod errors;
mod inventory;
mod listing;
mod ordering;
mod render;
mod repo;
mod stats;
mod walker;

pub use classify::{
    classify, is_alias, is_icon_file_name, AliasProbe, Classification, FinderInfoProbe,
    IgnoreReason,
};
pub use collapse::{collapse, Chain};
pub use config::{default_repo_markers, RepoConfig, RepoKind, RepoMarkerSet, ScanConfig};
pub use errors::{TrimError, TrimResult};
pub use inventory::{inventory, Inventory};
pub use ordering::{finder_cmp, sort_names, OrderingKey};
pub use render::{
    estimate_tokens, render_flat, render_tree, DEFAULT_CHARS_PER_TOKEN, DOCUMENT_HEADER,
};
pub use repo::{is_repository, is_repository_archive, ArchiveIndex, ZipIndex};
pub use stats::Counters;
pub use walker::{
    omitted_label, repo_archive_label, repo_label, Line, LineKind, ScanOutput, TreeWalker,
    ALIAS_SUFFIX,
};

/// Scans the directory tree below `root` according to `config`.
///
/// This is the primary entry point into the `treetrim-lib` core logic. It
/// walks the tree depth-first, collapsing single-child directory chains,
/// ordering entries the way Finder does, marking aliases, repositories and
/// repository archives, and capping the number of regular files listed per
/// directory.
///
/// The returned [`ScanOutput`] holds the line stream (render it with
/// [`render_tree`] or [`render_flat`]) and the aggregated [`Counters`].
///
/// # Errors
///
/// Only the root is checked strictly:
/// * [`TrimError::RootNotFound`]: `root` does not exist.
/// * [`TrimError::NotADirectory`]: `root` is not a directory.
/// * [`TrimError::IoError`]: `root` could not be inspected for another reason.
///
/// Problems below the root (unreadable directories, unreadable extended
/// attributes, broken archives) are logged and the scan continues.
///
/// # Examples
///
/// ```no_run
/// use treetrim_lib::{render_tree, scan, ScanConfig};
/// use std::path::Path;
///
/// let config = ScanConfig {
///     max_files_per_directory: 20,
///     ignore_patterns: vec!["node_modules".to_string()],
///     ..ScanConfig::default()
/// };
///
/// match scan(Path::new("./my_project"), &config) {
///     Ok(output) => {
///         println!("{}", render_tree(&output.lines));
///         println!("{} files shown", output.counters.filtered_total_files);
///     }
///     Err(e) => eprintln!("Error running treetrim: {}", e),
/// }
/// ```
pub fn scan(root: &Path, config: &ScanConfig) -> TrimResult<ScanOutput> {
    info!("Starting scan of {:?}", root);
    debug!("Scan config: {:?}", config);

    let metadata = fs::metadata(root).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            TrimError::RootNotFound(root.to_path_buf())
        } else {
            TrimError::IoError {
                path: root.to_path_buf(),
                source: e,
            }
        }
    })?;
    if !metadata.is_dir() {
        return Err(TrimError::NotADirectory(root.to_path_buf()));
    }

    let output = TreeWalker::new(config).walk(root);
    info!(
        "Scan finished: {} lines, {} folders, {} files seen",
        output.lines.len(),
        output.counters.raw_total_folders,
        output.counters.raw_total_files
    );
    Ok(output)
}
