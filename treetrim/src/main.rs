use anyhow::{Context, Result}; // Use anyhow for easy error handling in the binary
use arboard::Clipboard;
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use log::{debug, error, info, LevelFilter};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use treetrim_lib::{estimate_tokens, inventory, render_flat, render_tree, scan};

mod config_loader;
mod report;

use config_loader::{build_run_settings, OutputFormat, RunSettings};
use report::Report;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Writes a trimmed, Finder-ordered snapshot of a directory tree.",
    long_about = "Treetrim walks a directory and prints a compact outline of its structure, sized to fit in a language model prompt. Single-child folder chains are collapsed into one line, hidden entries and Finder icon files are left out, and folders with many files are summarised.\n\nBy default only folders are listed; use --max-files to list files as well. Settings can also come from a global config.toml, a local .treetrim.toml, and the .treetrim_types / .treetrimignore list files."
)]
struct Cli {
    /// Optional path to the directory to snapshot.
    /// If not provided, the current working directory is used.
    #[arg(index = 1)]
    target_path: Option<PathBuf>,

    /// Write output to a file instead of stdout.
    #[arg(short = 'o', long, conflicts_with_all = ["clipboard", "output_dir"])]
    output: Option<PathBuf>,

    /// Write output to a timestamped file inside this directory.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Copy output to the system clipboard instead of stdout or a file.
    #[arg(short = 'c', long, conflicts_with = "output")]
    clipboard: bool,

    /// Emit a flat list of paths instead of the nested document.
    #[arg(long)]
    flat: bool,

    /// Maximum number of files listed per folder before they are summarised.
    /// 0 lists folders only.
    #[arg(long, value_name = "N")]
    max_files: Option<usize>,

    /// Maximum recursion depth below the root. 0 means unlimited.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Keep single-child folder chains on separate lines.
    #[arg(long)]
    no_collapse: bool,

    /// Include entries whose names start with '.'.
    #[arg(long)]
    show_hidden: bool,

    /// Keep Finder 'Icon\r' files in the listing.
    #[arg(long)]
    keep_icons: bool,

    /// Ignore files by extension or exact name (e.g. -t .jpg -t Thumbs.db).
    /// Can be used multiple times or comma separated. Case-insensitive.
    #[arg(short = 't', long = "ignore-type", value_name = "TYPE")]
    ignore_types: Vec<String>,

    /// Skip folders whose name contains PATTERN (e.g. -e node_modules).
    /// Can be used multiple times or comma separated.
    #[arg(short = 'e', long = "ignore-pattern", value_name = "PATTERN")]
    ignore_patterns: Vec<String>,

    /// Detect version-control repositories and zipped repositories.
    #[arg(long)]
    repos: bool,

    /// List the contents of detected repositories (implies --repos).
    #[arg(long)]
    show_repo_files: bool,

    /// Load an additional config file after the global and local ones.
    #[arg(long = "config", value_name = "FILE")]
    config_path: Option<PathBuf>,

    /// Ignore all config and list files.
    #[arg(long)]
    no_config: bool,

    /// Do not print the statistics report to stderr.
    #[arg(long)]
    no_stats: bool,

    /// Enable verbose output. Use -v for info, -vv for debug, -vvv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(test)]
impl Cli {
    pub(crate) fn test_default() -> Self {
        Self {
            target_path: None,
            output: None,
            output_dir: None,
            clipboard: false,
            flat: false,
            max_files: None,
            max_depth: None,
            no_collapse: false,
            show_hidden: false,
            keep_icons: false,
            ignore_types: Vec::new(),
            ignore_patterns: Vec::new(),
            repos: false,
            show_repo_files: false,
            config_path: None,
            no_config: false,
            no_stats: false,
            verbose: 0,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --- Initialize Logging ---
    let log_level = match cli.verbose {
        0 => LevelFilter::Warn,  // Default: Show warnings and errors
        1 => LevelFilter::Info,  // -v: Show info, warnings, errors
        2 => LevelFilter::Debug, // -vv: Show debug, info, warnings, errors
        _ => LevelFilter::Trace, // -vvv and more: Show everything
    };

    env_logger::Builder::new().filter_level(log_level).init();

    info!("Log level set to: {}", log_level);
    debug!("Parsed arguments: {:?}", cli);

    // --- Determine Target Path ---
    let target_path = match cli.target_path.clone() {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current working directory")?,
    };
    info!("Target path determined as: {:?}", target_path);

    let settings = build_run_settings(&cli, &target_path)?;
    debug!("Resolved settings: {:?}", settings);

    // --- Call Library ---
    let output = match scan(&target_path, &settings.scan) {
        Ok(output) => output,
        Err(e) => {
            error!("Error during treetrim operation: {}", e);
            return Err(e.into());
        }
    };

    let tree_document = render_tree(&output.lines);
    let mut document = match settings.output.format {
        OutputFormat::Tree => tree_document.clone(),
        OutputFormat::Flat => render_flat(&output.lines),
    };
    if !document.ends_with('\n') {
        document.push('\n');
    }

    deliver(&cli, &settings, &target_path, &document)?;

    if settings.stats.enabled {
        let report = Report {
            inventory: inventory(&target_path, &settings.scan),
            counters: output.counters,
            estimated_tokens: estimate_tokens(&tree_document, settings.stats.chars_per_token),
            output_bytes: document.len(),
            token_limit: settings.stats.token_limit,
        };
        report::print_report(&report).context("Failed to write statistics report")?;
    }

    Ok(())
}

/// Sends the finished document to the clipboard, a file, or stdout.
fn deliver(cli: &Cli, settings: &RunSettings, target_path: &Path, document: &str) -> Result<()> {
    if cli.clipboard {
        info!("Copying output to clipboard...");
        let mut clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        clipboard
            .set_text(document)
            .context("Failed to copy content to clipboard")?;
        info!("Successfully copied content to clipboard.");
    } else if let Some(output_path) = cli.output.as_ref() {
        write_file(output_path, document)?;
    } else if let Some(dir) = settings.output.dir.as_ref() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        let name = snapshot_file_name(
            &Local::now().naive_local(),
            &root_display_name(target_path),
            settings.output.format,
        );
        let output_path = dir.join(name);
        write_file(&output_path, document)?;
        println!("{}", output_path.display());
    } else {
        debug!("Writing output to stdout...");
        io::stdout()
            .write_all(document.as_bytes())
            .context("Failed to write content to stdout")?;
        io::stdout().flush().context("Failed to flush stdout")?;
        debug!("Finished writing to stdout.");
    }
    Ok(())
}

fn write_file(output_path: &Path, document: &str) -> Result<()> {
    info!("Writing output to file: {:?}", output_path);
    let mut file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {:?}", output_path))?;
    file.write_all(document.as_bytes())
        .with_context(|| format!("Failed to write content to file: {:?}", output_path))?;
    info!("Successfully wrote content to {:?}", output_path);
    Ok(())
}

/// Name of the scanned folder, resolving `.` and friends.
fn root_display_name(target_path: &Path) -> String {
    fs::canonicalize(target_path)
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| target_path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

fn snapshot_file_name(now: &NaiveDateTime, root_name: &str, format: OutputFormat) -> String {
    format!(
        "{} {} structure_snapshot.{}",
        now.format("%y%m%d-%H%M"),
        root_name,
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn snapshot_names_carry_timestamp_root_and_extension() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(14, 7, 0))
            .expect("valid timestamp");

        assert_eq!(
            snapshot_file_name(&now, "Projects", OutputFormat::Tree),
            "240305-1407 Projects structure_snapshot.yaml"
        );
        assert_eq!(
            snapshot_file_name(&now, "Projects", OutputFormat::Flat),
            "240305-1407 Projects structure_snapshot.txt"
        );
    }

    #[test]
    fn root_name_resolves_relative_components() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("Work Files");
        fs::create_dir_all(root.join("sub"))?;

        assert_eq!(root_display_name(&root), "Work Files");
        assert_eq!(root_display_name(&root.join("sub/..")), "Work Files");
        Ok(())
    }

    #[test]
    fn cli_parses_repeated_and_valued_flags() {
        let cli = Cli::parse_from([
            "treetrim",
            "some/dir",
            "--max-files",
            "12",
            "-t",
            ".jpg,.png",
            "-e",
            "node_modules",
            "-e",
            "target",
            "--flat",
            "-vv",
        ]);
        assert_eq!(cli.target_path, Some(PathBuf::from("some/dir")));
        assert_eq!(cli.max_files, Some(12));
        assert_eq!(cli.ignore_types, vec![".jpg,.png"]);
        assert_eq!(cli.ignore_patterns, vec!["node_modules", "target"]);
        assert!(cli.flat);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_rejects_conflicting_destinations() {
        assert!(Cli::try_parse_from(["treetrim", "-o", "out.yaml", "-c"]).is_err());
        assert!(
            Cli::try_parse_from(["treetrim", "-o", "out.yaml", "--output-dir", "snaps"]).is_err()
        );
    }
}
