//! Filesystem scanning for the built-in picker.
//!
//! Only immediate sub-directories are listed; deeper levels are scanned lazily
//! when the user expands a node.  Listing goes through [`ignore`] so hidden
//! entries and `.gitignore` rules are honoured the same way `rg` and `fd` do.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use super::path::SelectedPath;
use super::tree::{DirTree, EntryMeta};
use crate::error::BrowseError;

/// Configuration knobs for directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Show hidden (dot-prefixed) directories.
    pub show_hidden: bool,
    /// Skip directories matched by `.gitignore`.
    pub respect_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            respect_gitignore: true,
        }
    }
}

/// List the immediate sub-directories of `dir`, sorted case-insensitively.
///
/// Symlinks pointing at directories are included.  Fails only if `dir` itself
/// cannot be read; unreadable children are skipped.
pub fn scan_subdirs(dir: &Path, config: &ScanConfig) -> Result<Vec<EntryMeta>, BrowseError> {
    // WalkBuilder swallows a root read error into its iterator. Read the root
    // directly first so the caller can tell "empty" from "permission denied".
    std::fs::read_dir(dir).map_err(|source| BrowseError::Scan {
        path: dir.to_path_buf(),
        source,
    })?;

    let walker = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .hidden(!config.show_hidden)
        .git_ignore(config.respect_gitignore)
        .follow_links(false)
        .build();

    let mut dirs = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if path == dir || !path.is_dir() {
            continue;
        }
        if let Ok(meta) = EntryMeta::from_path(path) {
            dirs.push(meta);
        }
    }

    dirs.sort_by_key(|m| m.name.to_lowercase());
    Ok(dirs)
}

/// Build a picker tree rooted at `root` with its first level loaded.
pub fn build_tree(root: &Path, config: &ScanConfig) -> Result<DirTree, BrowseError> {
    let root_meta = EntryMeta::from_path(root).map_err(|source| BrowseError::Scan {
        path: root.to_path_buf(),
        source,
    })?;
    let mut tree = DirTree::new(root_meta);
    let children = scan_subdirs(root, config)?;
    tree.attach_children(tree.root, children);
    Ok(tree)
}

/// Directory the picker opens in.
///
/// Prefers the current selection when it is an existing directory, then its
/// parent, then the process working directory, then `$HOME`.
pub fn picker_start_dir(selected: Option<&SelectedPath>) -> PathBuf {
    if let Some(sel) = selected {
        let path = sel.to_path_buf();
        if path.is_dir() {
            return path;
        }
        if let Some(parent) = path.parent().filter(|p| p.is_dir()) {
            return parent.to_path_buf();
        }
    }
    std::env::current_dir()
        .ok()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("/"))
}
