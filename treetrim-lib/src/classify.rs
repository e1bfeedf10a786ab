// --- FILE: treetrim-lib/src/classify.rs ---

use std::path::Path;

use log::{debug, trace};

use crate::config::ScanConfig;

/// Names macOS uses for the invisible custom-icon file (`Icon\r`), as seen
/// after lowercasing and trimming by various tools.
const ICON_FILE_NAMES: &[&str] = &["icon", "icon\r", "icon?"];

/// Extended attribute holding Finder flags.
#[cfg(unix)]
const FINDER_INFO_ATTR: &str = "com.apple.FinderInfo";

/// Bit in the Finder flags word marking a file as an alias.
const ALIAS_FLAG: u16 = 0x8000;

/// Why a file was left out of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Hidden,
    Icon,
    Type,
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Keep,
    Ignore(IgnoreReason),
}

impl Classification {
    pub fn is_kept(self) -> bool {
        matches!(self, Classification::Keep)
    }
}

/// Decides whether a file name is kept. The first matching rule wins:
/// hidden, icon file, ignored type (full name or extension).
pub fn classify(file_name: &str, config: &ScanConfig) -> Classification {
    if config.hides(file_name) {
        return Classification::Ignore(IgnoreReason::Hidden);
    }

    if config.eliminate_icon_files && is_icon_file_name(file_name) {
        return Classification::Ignore(IgnoreReason::Icon);
    }

    let lowered = file_name.to_lowercase();
    if config.ignore_types.contains(&lowered) {
        return Classification::Ignore(IgnoreReason::Type);
    }
    if let Some(ext) = extension_of(&lowered) {
        if config.ignore_types.contains(ext) {
            return Classification::Ignore(IgnoreReason::Type);
        }
    }

    Classification::Keep
}

/// True for the reserved custom-icon file names.
pub fn is_icon_file_name(file_name: &str) -> bool {
    let trimmed = file_name
        .trim_matches(|c: char| c.is_whitespace() || c.is_control())
        .to_lowercase();
    ICON_FILE_NAMES.contains(&trimmed.as_str())
}

/// The extension of a file name including its dot, e.g. `".gz"` for
/// `"a.tar.gz"`. Leading dots do not start an extension, so `".bashrc"`
/// has none.
pub(crate) fn extension_of(file_name: &str) -> Option<&str> {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
    let idx = file_name.rfind('.')?;
    if idx <= stem_start {
        return None;
    }
    Some(&file_name[idx..])
}

/// Decides whether a file is a desktop alias (shortcut).
///
/// Implementations must never fail: anything that cannot be determined is
/// "not an alias".
pub trait AliasProbe {
    fn is_alias(&self, path: &Path) -> bool;
}

/// Reads the Finder flags from the `com.apple.FinderInfo` extended
/// attribute.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinderInfoProbe;

impl AliasProbe for FinderInfoProbe {
    fn is_alias(&self, path: &Path) -> bool {
        is_alias(path)
    }
}

/// True if the file's FinderInfo has the alias bit set. Missing attributes,
/// access errors and unsupported platforms all yield `false`.
pub fn is_alias(path: &Path) -> bool {
    match read_finder_info(path) {
        Some(info) => {
            let alias = finder_info_has_alias_flag(&info);
            if alias {
                debug!("Detected alias via FinderInfo: {:?}", path);
            }
            alias
        }
        None => false,
    }
}

#[cfg(unix)]
fn read_finder_info(path: &Path) -> Option<Vec<u8>> {
    match xattr::get(path, FINDER_INFO_ATTR) {
        Ok(value) => value,
        Err(e) => {
            trace!("Could not read FinderInfo for {:?}: {}", path, e);
            None
        }
    }
}

#[cfg(not(unix))]
fn read_finder_info(path: &Path) -> Option<Vec<u8>> {
    trace!("Extended attributes unsupported; {:?} is not an alias", path);
    None
}

/// Checks the alias bit in the big-endian flags word at bytes 8..10.
pub(crate) fn finder_info_has_alias_flag(info: &[u8]) -> bool {
    match info.get(8..10) {
        Some(&[hi, lo]) => u16::from_be_bytes([hi, lo]) & ALIAS_FLAG != 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn config_with_types(types: &[&str]) -> ScanConfig {
        ScanConfig {
            ignore_types: types.iter().map(|t| t.to_string()).collect(),
            ..ScanConfig::default()
        }
    }

    #[test]
    fn hidden_rule_wins_over_type_rule() {
        let config = config_with_types(&[".ds_store"]);
        assert_eq!(
            classify(".DS_Store", &config),
            Classification::Ignore(IgnoreReason::Hidden)
        );

        let show_hidden = ScanConfig {
            ignore_hidden: false,
            ..config_with_types(&[".ds_store"])
        };
        assert_eq!(
            classify(".DS_Store", &show_hidden),
            Classification::Ignore(IgnoreReason::Type)
        );
    }

    #[test]
    fn icon_files_are_detected_after_trimming() {
        let config = ScanConfig::default();
        for name in ["Icon\r", "ICON", " icon ", "Icon?"] {
            assert_eq!(
                classify(name, &config),
                Classification::Ignore(IgnoreReason::Icon),
                "{:?} should be an icon file",
                name
            );
        }
        assert!(classify("Icons", &config).is_kept());

        let keep_icons = ScanConfig {
            eliminate_icon_files: false,
            ..ScanConfig::default()
        };
        assert!(classify("Icon\r", &keep_icons).is_kept());
    }

    #[test]
    fn type_rule_matches_full_name_or_extension() {
        let config = config_with_types(&[".jpg", "thumbs.db", ".gz"]);
        assert_eq!(
            classify("Photo.JPG", &config),
            Classification::Ignore(IgnoreReason::Type)
        );
        assert_eq!(
            classify("Thumbs.db", &config),
            Classification::Ignore(IgnoreReason::Type)
        );
        assert_eq!(
            classify("logs.tar.gz", &config),
            Classification::Ignore(IgnoreReason::Type)
        );
        assert!(classify("notes.txt", &config).is_kept());
        assert!(classify("jpg", &config).is_kept());
    }

    #[test]
    fn extension_ignores_leading_dots() {
        assert_eq!(extension_of("a.tar.gz"), Some(".gz"));
        assert_eq!(extension_of("readme"), None);
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("..hidden.txt"), Some(".txt"));
        assert_eq!(extension_of("trailing."), Some("."));
    }

    #[test]
    fn alias_flag_is_read_from_bytes_eight_and_nine() {
        let mut info = vec![0u8; 32];
        assert!(!finder_info_has_alias_flag(&info));
        info[8] = 0x80;
        assert!(finder_info_has_alias_flag(&info));
        assert!(!finder_info_has_alias_flag(&info[..9]));
        assert!(!finder_info_has_alias_flag(&[]));
    }

    #[test]
    fn plain_files_and_missing_files_are_not_aliases() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("plain.txt");
        fs::write(&file, "text")?;
        assert!(!is_alias(&file));
        assert!(!is_alias(&dir.path().join("missing")));
        assert!(!FinderInfoProbe.is_alias(&file));
        Ok(())
    }
}
