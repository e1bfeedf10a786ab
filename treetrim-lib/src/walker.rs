// --- FILE: treetrim-lib/src/walker.rs ---

use std::path::{Component, Path, PathBuf};

use log::{debug, trace};

use crate::classify::{classify, AliasProbe, Classification, FinderInfoProbe};
use crate::collapse::collapse_chain;
use crate::config::{RepoKind, ScanConfig};
use crate::listing::{entry_name, list_directory};
use crate::repo::{ArchiveIndex, RepoDetector, ZipIndex};
use crate::stats::Counters;

/// Suffix appended to the label of alias files.
pub const ALIAS_SUFFIX: &str = ".alias";

/// What a [`Line`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    DirectoryOpen,
    File,
    Alias,
    RepoMarker,
    RepoArchiveMarker,
    OmittedSummary,
}

impl LineKind {
    /// Directory-like lines open a nesting level; the rest are leaves.
    pub fn opens_level(self) -> bool {
        matches!(self, LineKind::DirectoryOpen | LineKind::RepoMarker)
    }
}

/// One unit of scan output.
///
/// The tree stream and the flat stream are two projections of the same
/// lines, so they always agree on which entries were emitted and in what
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Indentation depth in the tree stream.
    pub depth: usize,
    /// Display label (collapsed chain, file name, or marker text).
    pub label: String,
    pub kind: LineKind,
    /// The entry on disk. For summaries, the directory being summarised.
    pub path: PathBuf,
}

impl Line {
    /// The indented tree-stream form, directories suffixed with `/`.
    pub fn tree_text(&self) -> String {
        let slash = if self.kind.opens_level() { "/" } else { "" };
        format!("{}{}{}", "  ".repeat(self.depth), self.label, slash)
    }

    /// The flat-stream form: the normalized path, directories suffixed with
    /// `/`. Summaries stand for no single path and have no flat form.
    pub fn flat_text(&self) -> Option<String> {
        let path = normalize(&self.path);
        match self.kind {
            LineKind::OmittedSummary => None,
            LineKind::DirectoryOpen | LineKind::RepoMarker => {
                Some(format!("{}/", path.display()))
            }
            LineKind::File | LineKind::Alias | LineKind::RepoArchiveMarker => {
                Some(path.display().to_string())
            }
        }
    }

    /// The on-disk name behind the label, with marker decorations removed.
    pub fn entry_name(&self) -> String {
        match self.kind {
            LineKind::OmittedSummary => self.label.clone(),
            _ => self
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.label.clone()),
        }
    }
}

/// Label of a directory recognised as a repository.
pub fn repo_label(name: &str, kind: RepoKind) -> String {
    format!("{} [{} repo]", name, kind)
}

/// Label of an archive that contains a repository.
pub fn repo_archive_label(name: &str, kind: RepoKind) -> String {
    format!("{} [{} repo archive]", name, kind)
}

/// Label replacing the regular files of a directory over the display cap.
pub fn omitted_label(count: usize) -> String {
    format!("[omitted {} files]", count)
}

/// Drops `.` components the way path normalization does; an empty result
/// becomes `.`.
fn normalize(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Lines and counters produced by a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub lines: Vec<Line>,
    pub counters: Counters,
}

impl ScanOutput {
    /// The indented tree stream.
    pub fn tree_lines(&self) -> Vec<String> {
        self.lines.iter().map(Line::tree_text).collect()
    }

    /// The flat path stream.
    pub fn flat_lines(&self) -> Vec<String> {
        self.lines.iter().filter_map(Line::flat_text).collect()
    }
}

/// Per-call state of the recursion. Each visit receives its own value and
/// derives the values for its children; nothing is mutated in place.
#[derive(Debug, Clone, Default)]
struct VisitContext {
    /// Tree depth of this directory's own line.
    depth: usize,
    /// Recursion level below the root, checked against `max_depth`.
    level: usize,
    /// Somewhere below a reported repository.
    inside_repo: bool,
    /// A repository marker line already stands for this directory.
    announced: bool,
    /// Labels of ancestors whose lines were suppressed, slash-joined.
    prefix: Option<String>,
}

impl VisitContext {
    fn prefixed(&self, label: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, label),
            None => label.to_string(),
        }
    }

    /// Context for the children of a directory. `shown` tells whether the
    /// directory has a line of its own the children can nest under.
    fn children(&self, shown: bool, label: &str) -> Self {
        Self {
            depth: if shown { self.depth + 1 } else { self.depth },
            level: self.level + 1,
            inside_repo: self.inside_repo,
            announced: false,
            prefix: if shown { None } else { Some(self.prefixed(label)) },
        }
    }

    /// Context for a repository whose marker line was just emitted.
    fn entering_repo(&self) -> Self {
        Self {
            inside_repo: true,
            announced: true,
            prefix: None,
            ..self.clone()
        }
    }
}

/// Depth-first directory walker producing the line stream and counters.
pub struct TreeWalker<'a> {
    config: &'a ScanConfig,
    aliases: &'a dyn AliasProbe,
    repos: RepoDetector<'a>,
}

impl<'a> TreeWalker<'a> {
    /// A walker reading Finder aliases from extended attributes and
    /// inspecting zip archives.
    pub fn new(config: &'a ScanConfig) -> Self {
        Self::with_probes(config, &FinderInfoProbe, &ZipIndex)
    }

    /// A walker with custom alias and archive capabilities.
    pub fn with_probes(
        config: &'a ScanConfig,
        aliases: &'a dyn AliasProbe,
        archives: &'a dyn ArchiveIndex,
    ) -> Self {
        Self {
            config,
            aliases,
            repos: RepoDetector {
                config: &config.repo,
                index: archives,
            },
        }
    }

    /// Walks the tree below `root` to completion.
    pub fn walk(&self, root: &Path) -> ScanOutput {
        let (lines, counters) = self.visit(root, &VisitContext::default());
        ScanOutput { lines, counters }
    }

    fn visit(&self, path: &Path, ctx: &VisitContext) -> (Vec<Line>, Counters) {
        let config = self.config;
        let name = entry_name(path);
        if config.hides(&name) {
            debug!("Skipping hidden directory {:?}", path);
            return (Vec::new(), Counters::hidden_directory());
        }

        let mut lines = Vec::new();
        let mut counters = Counters::default();
        let suppressed = ctx.inside_repo && !config.repo.show_files_inside_repo;

        let (dir, label, chain_len) = if config.collapse_chains && !ctx.announced {
            match collapse_chain(path, config, &self.repos) {
                Some(chain) if chain.terminal != path => {
                    trace!("Collapsed {:?} to {}", path, chain.label());
                    let len = chain.segments.len();
                    let label = chain.label();
                    (chain.terminal, label, len)
                }
                _ => (path.to_path_buf(), name, 1),
            }
        } else {
            (path.to_path_buf(), name, 1)
        };
        counters.raw_total_folders += chain_len;

        let emits_line = !ctx.announced && !suppressed;
        if emits_line {
            lines.push(Line {
                depth: ctx.depth,
                label: ctx.prefixed(&label),
                kind: LineKind::DirectoryOpen,
                path: dir.clone(),
            });
        }
        let child_ctx = ctx.children(emits_line || ctx.announced, &label);

        let listing = list_directory(&dir);
        counters.raw_total_files += listing.files.len();

        let mut pinned = Vec::new();
        let mut regular = Vec::new();
        for file in &listing.files {
            if let Classification::Ignore(reason) = classify(file, config) {
                trace!("Ignoring {:?} in {:?} ({:?})", file, dir, reason);
                counters.record_ignored(reason);
                continue;
            }

            let file_path = dir.join(file);
            if let Some(kind) = self.repos.archive(&file_path) {
                counters.detected_repo_archives += 1;
                pinned.push(Line {
                    depth: child_ctx.depth,
                    label: repo_archive_label(&child_ctx.prefixed(file), kind),
                    kind: LineKind::RepoArchiveMarker,
                    path: file_path,
                });
            } else if self.aliases.is_alias(&file_path) {
                counters.detected_aliases += 1;
                pinned.push(Line {
                    depth: child_ctx.depth,
                    label: format!("{}{}", child_ctx.prefixed(file), ALIAS_SUFFIX),
                    kind: LineKind::Alias,
                    path: file_path,
                });
            } else {
                regular.push(file_path);
            }
        }

        // Markers are shown even inside a repository whose contents are hidden.
        counters.filtered_total_files += pinned.len();
        lines.append(&mut pinned);

        if !suppressed {
            let cap = config.max_files_per_directory;
            if cap == 0 {
                trace!("Folders-only mode, hiding {} files in {:?}", regular.len(), dir);
            } else if regular.len() > cap {
                counters.filtered_total_files += regular.len();
                lines.push(Line {
                    depth: child_ctx.depth,
                    label: omitted_label(regular.len()),
                    kind: LineKind::OmittedSummary,
                    path: dir.clone(),
                });
            } else {
                counters.filtered_total_files += regular.len();
                lines.extend(regular.into_iter().map(|file_path| Line {
                    depth: child_ctx.depth,
                    label: entry_name(&file_path),
                    kind: LineKind::File,
                    path: file_path,
                }));
            }
        }

        if config.max_depth != 0 && ctx.level >= config.max_depth {
            debug!("Max depth {} reached at {:?}", config.max_depth, dir);
            return (lines, counters);
        }

        for sub in &listing.dirs {
            let sub_path = dir.join(sub);

            if config.hides(sub) {
                let (_, hidden) = self.visit(&sub_path, &child_ctx);
                counters += hidden;
                continue;
            }

            if let Some(kind) = self.repos.directory(&sub_path) {
                counters.detected_repos += 1;
                lines.push(Line {
                    depth: child_ctx.depth,
                    label: repo_label(&child_ctx.prefixed(sub), kind),
                    kind: LineKind::RepoMarker,
                    path: sub_path.clone(),
                });
                let (mut sub_lines, sub_counters) =
                    self.visit(&sub_path, &child_ctx.entering_repo());
                lines.append(&mut sub_lines);
                counters += sub_counters;
                continue;
            }

            if config.matches_ignore_pattern(sub) {
                debug!("Skipping {:?}: matches an ignore pattern", sub_path);
                continue;
            }

            let (mut sub_lines, sub_counters) = self.visit(&sub_path, &child_ctx);
            lines.append(&mut sub_lines);
            counters += sub_counters;
        }

        (lines, counters)
    }
}
