// --- FILE: treetrim-lib/src/listing.rs ---

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::ordering::sort_names;

/// The children of one directory, split by type and sorted in Finder order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Listing {
    pub(crate) dirs: Vec<String>,
    pub(crate) files: Vec<String>,
}

/// Lists a directory once, following symlinks to decide between directory
/// and file. Entries that are neither (broken links, sockets) are dropped.
///
/// A directory that cannot be read (permission denied, vanished) yields an
/// empty listing so the walk can continue with its siblings.
pub(crate) fn list_directory(path: &Path) -> Listing {
    let read_dir = match fs::read_dir(path) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            warn!("Treating {:?} as empty, could not list it: {}", path, e);
            return Listing::default();
        }
    };

    let mut listing = Listing::default();
    for entry_result in read_dir {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", path, e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => listing.dirs.push(name),
            Ok(meta) if meta.is_file() => listing.files.push(name),
            Ok(_) => debug!("Skipping special file {:?}", entry.path()),
            Err(e) => debug!("Skipping {:?}: {}", entry.path(), e),
        }
    }

    sort_names(&mut listing.dirs);
    sort_names(&mut listing.files);
    listing
}

/// Display name of a directory: its final component, or the final component
/// of its canonical form for paths like `.`, or the path itself.
pub(crate) fn entry_name(path: &Path) -> String {
    if let Some(name) = path.file_name() {
        return name.to_string_lossy().into_owned();
    }
    path.canonicalize()
        .ok()
        .and_then(|canonical| {
            canonical
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| path.display().to_string())
}
