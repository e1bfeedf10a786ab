// --- FILE: treetrim-lib/src/stats.rs ---

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::classify::IgnoreReason;

/// Tallies accumulated by a scan.
///
/// Every field starts at zero. Results of recursive visits are merged by
/// field-wise addition and nothing is ever decremented.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    /// Directories visited, including every directory of a collapsed chain.
    pub raw_total_folders: usize,
    /// Files seen in visited directories, before any filtering.
    pub raw_total_files: usize,
    /// Hidden directories skipped plus hidden files left out.
    pub ignored_hidden: usize,
    pub ignored_icons: usize,
    pub ignored_by_type: usize,
    pub detected_aliases: usize,
    pub detected_repos: usize,
    pub detected_repo_archives: usize,
    /// Files represented in the output, individually or by a summary line.
    pub filtered_total_files: usize,
}

impl Counters {
    /// The contribution of a hidden directory that was skipped.
    pub fn hidden_directory() -> Self {
        Self {
            ignored_hidden: 1,
            ..Self::default()
        }
    }

    pub(crate) fn record_ignored(&mut self, reason: IgnoreReason) {
        match reason {
            IgnoreReason::Hidden => self.ignored_hidden += 1,
            IgnoreReason::Icon => self.ignored_icons += 1,
            IgnoreReason::Type => self.ignored_by_type += 1,
        }
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, other: Self) {
        self.raw_total_folders += other.raw_total_folders;
        self.raw_total_files += other.raw_total_files;
        self.ignored_hidden += other.ignored_hidden;
        self.ignored_icons += other.ignored_icons;
        self.ignored_by_type += other.ignored_by_type;
        self.detected_aliases += other.detected_aliases;
        self.detected_repos += other.detected_repos;
        self.detected_repo_archives += other.detected_repo_archives;
        self.filtered_total_files += other.filtered_total_files;
    }
}

impl Add for Counters {
    type Output = Counters;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for Counters {
    fn sum<I: Iterator<Item = Counters>>(iter: I) -> Self {
        iter.fold(Counters::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_adds_every_field() {
        let a = Counters {
            raw_total_folders: 1,
            raw_total_files: 4,
            ignored_icons: 1,
            filtered_total_files: 3,
            ..Counters::default()
        };
        let b = Counters {
            raw_total_folders: 2,
            ignored_hidden: 1,
            detected_repos: 1,
            detected_repo_archives: 2,
            detected_aliases: 1,
            ignored_by_type: 5,
            ..Counters::default()
        };

        let merged = a + b;
        assert_eq!(merged.raw_total_folders, 3);
        assert_eq!(merged.raw_total_files, 4);
        assert_eq!(merged.ignored_hidden, 1);
        assert_eq!(merged.ignored_icons, 1);
        assert_eq!(merged.ignored_by_type, 5);
        assert_eq!(merged.detected_aliases, 1);
        assert_eq!(merged.detected_repos, 1);
        assert_eq!(merged.detected_repo_archives, 2);
        assert_eq!(merged.filtered_total_files, 3);

        let summed: Counters = vec![a, b, Counters::hidden_directory()].into_iter().sum();
        assert_eq!(summed.ignored_hidden, 2);
        assert_eq!(summed.raw_total_folders, 3);
    }

    #[test]
    fn ignore_reasons_map_to_their_counters() {
        let mut counters = Counters::default();
        counters.record_ignored(IgnoreReason::Hidden);
        counters.record_ignored(IgnoreReason::Icon);
        counters.record_ignored(IgnoreReason::Type);
        counters.record_ignored(IgnoreReason::Type);
        assert_eq!(counters.ignored_hidden, 1);
        assert_eq!(counters.ignored_icons, 1);
        assert_eq!(counters.ignored_by_type, 2);
        assert_eq!(counters.raw_total_files, 0);
    }
}
