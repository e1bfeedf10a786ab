// --- FILE: treetrim-lib/src/render.rs ---

use std::borrow::Cow;

use log::debug;

use crate::ordering::{sort_names, OrderingKey};
use crate::walker::Line;

/// Characters per token used by [`estimate_tokens`] when nothing else is
/// configured.
pub const DEFAULT_CHARS_PER_TOKEN: f64 = 4.0;

/// Comment lines opening every nested document.
pub const DOCUMENT_HEADER: &[&str] = &[
    "# Trimmed, structured snapshot of a directory tree.",
    "# Files may be left out by configuration (display cap, ignored types, hidden entries).",
    "# Folders shown as {} are not necessarily empty; they have no visible children in this snapshot.",
];

const FILES_KEY: &str = "files";

#[derive(Debug, Default)]
struct Level {
    name: String,
    dirs: Vec<usize>,
    files: Vec<String>,
}

/// Rebuilds nesting from the depth-annotated line stream.
///
/// Index 0 is a synthetic document root. `stack[d]` is the level opened by
/// the most recent directory line at depth `d`; a dedent truncates the
/// stack so following entries attach to the ancestor at the new depth.
/// Directory lines with a name already present under the same parent are
/// merged into it.
fn build_levels(lines: &[Line]) -> Vec<Level> {
    let mut arena = vec![Level::default()];
    let mut stack: Vec<usize> = Vec::new();

    for line in lines {
        stack.truncate(line.depth);
        let parent = stack.last().copied().unwrap_or(0);

        if line.kind.opens_level() {
            let existing = arena[parent]
                .dirs
                .iter()
                .copied()
                .find(|&idx| arena[idx].name == line.label);
            let idx = match existing {
                Some(idx) => idx,
                None => {
                    arena.push(Level {
                        name: line.label.clone(),
                        ..Level::default()
                    });
                    let idx = arena.len() - 1;
                    arena[parent].dirs.push(idx);
                    idx
                }
            };
            stack.push(idx);
        } else {
            arena[parent].files.push(line.label.clone());
        }
    }

    arena
}

/// Folder name as written in the document. A folder literally named `files`
/// is quoted so it cannot be mistaken for a level's file list.
fn folder_key(name: &str) -> Cow<'_, str> {
    if name == FILES_KEY {
        Cow::Owned(format!("\"{}\"", name))
    } else {
        Cow::Borrowed(name)
    }
}

fn write_level(arena: &[Level], idx: usize, indent_level: usize, out: &mut Vec<String>) {
    let level = &arena[idx];
    let indent = "  ".repeat(indent_level);

    let mut dirs = level.dirs.clone();
    dirs.sort_by_cached_key(|&child| OrderingKey::of(&arena[child].name));
    for child in dirs {
        let node = &arena[child];
        if node.dirs.is_empty() && node.files.is_empty() {
            out.push(format!("{}{}: {{}}", indent, folder_key(&node.name)));
        } else {
            out.push(format!("{}{}:", indent, folder_key(&node.name)));
            write_level(arena, child, indent_level + 1, out);
        }
    }

    if !level.files.is_empty() {
        let mut files = level.files.clone();
        sort_names(&mut files);
        out.push(format!("{}{}:", indent, FILES_KEY));
        for file in files {
            out.push(format!("{}  - {}", indent, file));
        }
    }
}

/// Renders the line stream as a nested, YAML-like document.
///
/// Folders become `name:` keys, ordered in Finder order before a trailing
/// `files:` list. A folder without visible children renders as `name: {}`.
pub fn render_tree(lines: &[Line]) -> String {
    let arena = build_levels(lines);
    debug!(
        "Rendering {} lines into {} nesting levels",
        lines.len(),
        arena.len() - 1
    );

    let mut out: Vec<String> = DOCUMENT_HEADER.iter().map(|s| s.to_string()).collect();
    out.push(String::new());
    write_level(&arena, 0, 0, &mut out);
    out.join("\n")
}

/// Renders the flat path list: one path per visible entry, directories
/// suffixed with `/`.
pub fn render_flat(lines: &[Line]) -> String {
    lines
        .iter()
        .filter_map(Line::flat_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rough token estimate: character count divided by `chars_per_token`,
/// rounded down. Non-positive ratios fall back to the default.
pub fn estimate_tokens(text: &str, chars_per_token: f64) -> usize {
    let ratio = if chars_per_token > 0.0 {
        chars_per_token
    } else {
        DEFAULT_CHARS_PER_TOKEN
    };
    (text.chars().count() as f64 / ratio) as usize
}
