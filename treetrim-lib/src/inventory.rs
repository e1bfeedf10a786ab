// --- FILE: treetrim-lib/src/inventory.rs ---

use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::classify::is_icon_file_name;
use crate::config::ScanConfig;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".heic"];
const MARKDOWN_EXTENSION: &str = ".md";

/// Unfiltered baseline counts for everything below a root.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Inventory {
    pub total_folders: usize,
    pub total_files: usize,
    pub image_files: usize,
    pub markdown_files: usize,
    /// Only counted when icon elimination is enabled.
    pub icon_files: usize,
}

/// Counts every folder and file below `root` (the root itself excluded),
/// ignoring all filters. Entries that cannot be read are skipped with a
/// warning.
pub fn inventory(root: &Path, config: &ScanConfig) -> Inventory {
    debug!("Taking raw inventory of {:?}", root);
    let mut inventory = Inventory::default();

    for entry_result in WalkDir::new(root).min_depth(1) {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                let path_display = e.path().map_or_else(
                    || root.display().to_string(),
                    |p| p.display().to_string(),
                );
                warn!(
                    "Skipping path during inventory near {}: {}",
                    path_display, e
                );
                continue;
            }
        };

        // Links to folders count as folders but are not descended into.
        if entry.file_type().is_dir() || entry.path().is_dir() {
            inventory.total_folders += 1;
            continue;
        }

        inventory.total_files += 1;
        let lower_name = entry.file_name().to_string_lossy().to_lowercase();
        if IMAGE_EXTENSIONS.iter().any(|ext| lower_name.ends_with(ext)) {
            inventory.image_files += 1;
        } else if lower_name.ends_with(MARKDOWN_EXTENSION) {
            inventory.markdown_files += 1;
        } else if config.eliminate_icon_files && is_icon_file_name(&lower_name) {
            inventory.icon_files += 1;
        }
    }

    inventory
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn counts_everything_regardless_of_filters() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("photos/.thumbs"))?;
        fs::create_dir_all(root.join("node_modules"))?;
        fs::write(root.join("photos/a.JPG"), "")?;
        fs::write(root.join("photos/b.heic"), "")?;
        fs::write(root.join("photos/.thumbs/c.png"), "")?;
        fs::write(root.join("README.md"), "")?;
        fs::write(root.join("Icon\r"), "")?;
        fs::write(root.join("node_modules/index.js"), "")?;

        let config = ScanConfig {
            ignore_patterns: vec!["node_modules".to_string()],
            ..ScanConfig::default()
        };
        let counted = inventory(root, &config);
        assert_eq!(
            counted,
            Inventory {
                total_folders: 3,
                total_files: 6,
                image_files: 3,
                markdown_files: 1,
                icon_files: 1,
            }
        );

        let keep_icons = ScanConfig {
            eliminate_icon_files: false,
            ..ScanConfig::default()
        };
        assert_eq!(inventory(root, &keep_icons).icon_files, 0);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn linked_folders_count_as_folders() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("real"))?;
        fs::write(root.join("real/a.txt"), "")?;
        std::os::unix::fs::symlink(root.join("real"), root.join("link"))?;
        std::os::unix::fs::symlink(root.join("missing"), root.join("dangling"))?;

        let counted = inventory(&root, &ScanConfig::default());
        assert_eq!(counted.total_folders, 2);
        assert_eq!(counted.total_files, 2);
        Ok(())
    }
}
