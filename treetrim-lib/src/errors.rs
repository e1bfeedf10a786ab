// --- FILE: treetrim-lib/src/errors.rs ---

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during `treetrim` library operations.
///
/// Only problems with the scan root are fatal. Failures below the root
/// (unreadable directories, broken archives, missing metadata) are logged
/// and recovered from so that a best-effort snapshot is always produced.
#[derive(Error, Debug)]
pub enum TrimError {
    /// The root path handed to [`crate::scan`] does not exist or cannot be
    /// accessed.
    #[error("Scan root not found or not accessible: {0}")]
    RootNotFound(PathBuf),

    /// The root path exists but is not a directory.
    #[error("Scan root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a path.
    #[error("IO error accessing path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An archive's entry index could not be read. The repository detector
    /// treats this as "not a repository archive".
    #[error("Failed to read archive index '{path}': {source}")]
    ArchiveError {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// A convenience type alias for `Result<T, TrimError>`.
pub type TrimResult<T> = Result<T, TrimError>;
