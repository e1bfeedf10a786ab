use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use log::{debug, warn};
use serde::Deserialize;

use treetrim_lib::{RepoConfig, RepoKind, RepoMarkerSet, ScanConfig, DEFAULT_CHARS_PER_TOKEN};

use crate::Cli;

pub const DEFAULT_TOKEN_LIMIT: usize = 75_000;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub scan: ScanConfig,
    pub output: OutputSettings,
    pub stats: StatsSettings,
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub format: OutputFormat,
    /// Directory receiving a timestamped snapshot file.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Nested, YAML-like document.
    Tree,
    /// One path per line.
    Flat,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Tree => "yaml",
            OutputFormat::Flat => "txt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tree => f.write_str("tree"),
            OutputFormat::Flat => f.write_str("flat"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tree" | "yaml" => Ok(OutputFormat::Tree),
            "flat" | "txt" => Ok(OutputFormat::Flat),
            other => Err(format!(
                "Unknown output format '{}'. Expected 'tree' or 'flat'.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatsSettings {
    pub enabled: bool,
    pub chars_per_token: f64,
    pub token_limit: usize,
}

pub fn build_run_settings(cli: &Cli, target_path: &Path) -> Result<RunSettings> {
    let mut flags = Flags::default();
    let mut stats_acc = StatsAccum::default();
    let mut types = ListAccumulator::lowercased("ignore type");
    let mut patterns = ListAccumulator::verbatim("ignore pattern");

    if !cli.no_config {
        if let Some(base_dirs) = BaseDirs::new() {
            let config_dir = base_dirs.config_dir().join("treetrim");
            apply_config_file(
                &config_dir.join("config.toml"),
                &mut flags,
                &mut stats_acc,
                &mut types,
                &mut patterns,
            )?;
            apply_list_file(&config_dir.join("ignore_types.txt"), &mut types)?;
            apply_list_file(&config_dir.join("ignore_patterns.txt"), &mut patterns)?;
        } else {
            debug!("No base directories available; skipping global config search");
        }

        apply_config_file(
            &target_path.join(".treetrim.toml"),
            &mut flags,
            &mut stats_acc,
            &mut types,
            &mut patterns,
        )?;
        apply_list_file(&target_path.join(".treetrim_types"), &mut types)?;
        apply_list_file(&target_path.join(".treetrimignore"), &mut patterns)?;

        if let Some(explicit_path) = cli.config_path.as_ref() {
            if !explicit_path.exists() {
                bail!("Config file {:?} does not exist", explicit_path);
            }
            apply_config_file(
                explicit_path,
                &mut flags,
                &mut stats_acc,
                &mut types,
                &mut patterns,
            )?;
        }
    } else if let Some(explicit_path) = cli.config_path.as_ref() {
        debug!(
            "--no-config specified; skipping explicitly requested config file {:?}",
            explicit_path
        );
    }

    // CLI overrides (highest precedence)
    if cli.no_collapse {
        flags.collapse_chains = false;
    }
    if cli.show_hidden {
        flags.ignore_hidden = false;
    }
    if cli.keep_icons {
        flags.eliminate_icons = false;
    }
    if let Some(max_files) = cli.max_files {
        flags.max_files = max_files;
    }
    if let Some(max_depth) = cli.max_depth {
        flags.max_depth = max_depth;
    }
    if cli.repos {
        flags.repo_enabled = true;
    }
    if cli.show_repo_files {
        flags.repo_enabled = true;
        flags.show_repo_files = true;
    }
    if cli.flat {
        flags.format = OutputFormat::Flat;
    }
    if let Some(dir) = cli.output_dir.as_ref() {
        flags.output_dir = Some(dir.clone());
    }
    if cli.no_stats {
        stats_acc.enabled = Some(false);
    }

    // Comma-separated values are accepted as well as repeated flags.
    for raw in &cli.ignore_types {
        types.merge(split_commas(raw));
    }
    for raw in &cli.ignore_patterns {
        patterns.merge(split_commas(raw));
    }

    let repo_defaults = RepoConfig::default();
    let repo = RepoConfig {
        enable_detection: flags.repo_enabled,
        show_files_inside_repo: flags.show_repo_files,
        markers: flags.markers.unwrap_or(repo_defaults.markers),
        archive_extensions: flags
            .archive_extensions
            .unwrap_or(repo_defaults.archive_extensions),
    };

    let scan = ScanConfig {
        ignore_types: types.into_vec().into_iter().collect(),
        ignore_patterns: patterns.into_vec(),
        collapse_chains: flags.collapse_chains,
        ignore_hidden: flags.ignore_hidden,
        eliminate_icon_files: flags.eliminate_icons,
        max_files_per_directory: flags.max_files,
        max_depth: flags.max_depth,
        repo,
    };

    let output = OutputSettings {
        format: flags.format,
        dir: flags.output_dir,
    };

    let stats = StatsSettings {
        enabled: stats_acc.enabled.unwrap_or(true),
        chars_per_token: stats_acc.chars_per_token.unwrap_or(DEFAULT_CHARS_PER_TOKEN),
        token_limit: stats_acc.token_limit.unwrap_or(DEFAULT_TOKEN_LIMIT),
    };

    Ok(RunSettings {
        scan,
        output,
        stats,
    })
}

fn split_commas(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|part| !part.is_empty())
}

#[derive(Debug)]
struct Flags {
    collapse_chains: bool,
    ignore_hidden: bool,
    eliminate_icons: bool,
    max_files: usize,
    max_depth: usize,
    repo_enabled: bool,
    show_repo_files: bool,
    archive_extensions: Option<Vec<String>>,
    markers: Option<Vec<RepoMarkerSet>>, // None -> built-in marker table
    format: OutputFormat,
    output_dir: Option<PathBuf>,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            collapse_chains: true,
            ignore_hidden: true,
            eliminate_icons: true,
            max_files: 0,
            max_depth: 0,
            repo_enabled: false,
            show_repo_files: false,
            archive_extensions: None,
            markers: None,
            format: OutputFormat::Tree,
            output_dir: None,
        }
    }
}

#[derive(Debug, Default)]
struct StatsAccum {
    enabled: Option<bool>,
    chars_per_token: Option<f64>,
    token_limit: Option<usize>,
}

/// Order-preserving, de-duplicating list of entries gathered across layers.
#[derive(Debug)]
struct ListAccumulator {
    what: &'static str,
    lowercase: bool,
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl ListAccumulator {
    fn lowercased(what: &'static str) -> Self {
        Self {
            what,
            lowercase: true,
            entries: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn verbatim(what: &'static str) -> Self {
        Self {
            lowercase: false,
            ..Self::lowercased(what)
        }
    }

    fn push<S: AsRef<str>>(&mut self, entry: S) {
        let candidate = entry.as_ref().trim();
        if candidate.is_empty() {
            return;
        }
        let normalized = if self.lowercase {
            candidate.to_lowercase()
        } else {
            candidate.to_string()
        };
        if self.seen.insert(normalized.clone()) {
            debug!("Adding {}: {}", self.what, normalized);
            self.entries.push(normalized);
        } else {
            debug!("Skipping duplicate {}: {}", self.what, normalized);
        }
    }

    fn merge<I>(&mut self, iter: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for item in iter {
            self.push(item);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

fn apply_config_file(
    path: &Path,
    flags: &mut Flags,
    stats: &mut StatsAccum,
    types: &mut ListAccumulator,
    patterns: &mut ListAccumulator,
) -> Result<()> {
    if !path.exists() {
        debug!("Config file {:?} not found; skipping", path);
        return Ok(());
    }

    debug!("Loading config from {:?}", path);
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;

    let parsed: FileConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {:?}", path))?;

    if let Some(scan_section) = parsed.scan {
        apply_scan_section(scan_section, flags, types, patterns);
    }
    if let Some(repo_section) = parsed.repo {
        apply_repo_section(repo_section, flags)
            .with_context(|| format!("Invalid [repo] section in {:?}", path))?;
    }
    if let Some(output_section) = parsed.output {
        apply_output_section(output_section, flags)
            .with_context(|| format!("Invalid [output] section in {:?}", path))?;
    }
    if let Some(stats_section) = parsed.stats {
        apply_stats_section(stats_section, stats)
            .with_context(|| format!("Invalid [stats] section in {:?}", path))?;
    }

    Ok(())
}

fn apply_scan_section(
    section: ScanSection,
    flags: &mut Flags,
    types: &mut ListAccumulator,
    patterns: &mut ListAccumulator,
) {
    if let Some(values) = section.ignore_types {
        types.merge(values);
    }
    if let Some(values) = section.ignore_patterns {
        patterns.merge(values);
    }
    if let Some(value) = section.collapse_chains {
        flags.collapse_chains = value;
    }
    if let Some(value) = section.ignore_hidden {
        flags.ignore_hidden = value;
    }
    if let Some(value) = section.eliminate_icons {
        flags.eliminate_icons = value;
    }
    if let Some(value) = section.max_files {
        flags.max_files = value;
    }
    if let Some(value) = section.max_depth {
        flags.max_depth = value;
    }
}

fn apply_repo_section(section: RepoSection, flags: &mut Flags) -> Result<()> {
    if let Some(value) = section.enabled {
        flags.repo_enabled = value;
    }
    if let Some(value) = section.show_files {
        flags.show_repo_files = value;
    }
    if let Some(values) = section.archive_extensions {
        let extensions: Vec<String> = values
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        flags.archive_extensions = Some(extensions);
    }
    if let Some(entries) = section.markers {
        let mut markers = Vec::with_capacity(entries.len());
        for entry in entries {
            let kind = RepoKind::from_str(&entry.kind).map_err(anyhow::Error::msg)?;
            if entry.names.is_empty() {
                warn!("Repository marker entry for '{}' has no names; ignoring", kind);
                continue;
            }
            markers.push(RepoMarkerSet {
                kind,
                names: entry.names,
            });
        }
        flags.markers = Some(markers);
    }
    Ok(())
}

fn apply_output_section(section: OutputSection, flags: &mut Flags) -> Result<()> {
    if let Some(raw) = section.format {
        flags.format = OutputFormat::from_str(&raw).map_err(anyhow::Error::msg)?;
    }
    if let Some(dir) = section.dir {
        flags.output_dir = Some(dir);
    }
    Ok(())
}

fn apply_stats_section(section: StatsSection, stats: &mut StatsAccum) -> Result<()> {
    if let Some(enabled) = section.enabled {
        stats.enabled = Some(enabled);
    }
    if let Some(ratio) = section.chars_per_token {
        if ratio <= 0.0 {
            bail!("stats.chars_per_token must be greater than 0");
        }
        stats.chars_per_token = Some(ratio);
    }
    if let Some(limit) = section.token_limit {
        stats.token_limit = Some(limit);
    }
    Ok(())
}

fn apply_list_file(path: &Path, list: &mut ListAccumulator) -> Result<()> {
    if !path.exists() {
        debug!("List file {:?} not found; skipping", path);
        return Ok(());
    }

    debug!("Loading {} entries from {:?}", list.what, path);
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        list.push(trimmed);
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    scan: Option<ScanSection>,
    #[serde(default)]
    repo: Option<RepoSection>,
    #[serde(default)]
    output: Option<OutputSection>,
    #[serde(default)]
    stats: Option<StatsSection>,
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    collapse_chains: Option<bool>,
    ignore_hidden: Option<bool>,
    eliminate_icons: Option<bool>,
    max_files: Option<usize>,
    max_depth: Option<usize>,
    ignore_types: Option<Vec<String>>,
    ignore_patterns: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RepoSection {
    enabled: Option<bool>,
    show_files: Option<bool>,
    archive_extensions: Option<Vec<String>>,
    markers: Option<Vec<MarkerEntry>>,
}

#[derive(Debug, Deserialize)]
struct MarkerEntry {
    kind: String,
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OutputSection {
    format: Option<String>,
    dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct StatsSection {
    enabled: Option<bool>,
    chars_per_token: Option<f64>,
    token_limit: Option<usize>,
}
