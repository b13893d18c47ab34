//! Source file classification and tool grouping.
//!
//! A folder of sources either feeds a library/program build (flat list) or,
//! under tool rules, is grouped into one executable per shared basename
//! prefix: `foo.c foo_bar.c foo_baz.c` become a single tool `foo`.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Enumerate regular files under `folder` (recursively, at most `max_depth`
/// levels down) whose extension is in `exts`, in sorted order. Returns `None`
/// when the folder path itself is invalid; an empty list is a valid result.
pub fn classify(folder: &Path, exts: &[String], max_depth: usize) -> Option<Vec<PathBuf>> {
    let dir = if folder.as_os_str().is_empty() {
        Path::new(".")
    } else {
        folder
    };
    if !dir.is_dir() {
        return None;
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if exts.iter().any(|e| e == ext) {
            // keep paths in the caller's form; WalkDir roots "." entries
            // with a "./" prefix we do not want in command lines
            let clean = path.strip_prefix("./").unwrap_or(path);
            files.push(clean.to_path_buf());
        }
    }
    files.sort();
    Some(files)
}

/// One executable built from a group of source files sharing a prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub name: String,
    pub sources: Vec<PathBuf>,
}

/// File name up to the first dot, e.g. `test/foo_bar.c` -> `foo_bar`.
pub fn stem_of(path: &Path) -> String {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    name.split('.').next().unwrap_or_default().to_string()
}

/// Group a sorted source list into tools. Scanning left to right, each
/// unclaimed file opens a tool named after its stem and claims every other
/// unclaimed file whose path starts with that stem prefix.
pub fn group_into_tools(sources: &[PathBuf]) -> Vec<Tool> {
    let paths: Vec<String> = sources
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let mut used = vec![false; sources.len()];
    let mut tools = Vec::new();

    for i in 0..sources.len() {
        if used[i] {
            continue;
        }
        let name = stem_of(&sources[i]);
        let file_len = sources[i]
            .file_name()
            .map(|n| n.to_string_lossy().len())
            .unwrap_or(0);
        let prefix_len = paths[i].len() - file_len + name.len();
        let prefix = &paths[i][..prefix_len];

        let mut claimed = Vec::new();
        for j in i..sources.len() {
            if !used[j] && paths[j].starts_with(prefix) {
                used[j] = true;
                claimed.push(sources[j].clone());
            }
        }
        tools.push(Tool {
            name,
            sources: claimed,
        });
    }

    tools
}
