//! Built-in directory picker model.
//!
//! Holds the lazily-loaded directory tree and the list selection.  Scanning
//! happens elsewhere (see [`super::browse`]); this type only records what was
//! requested and applies results as they arrive, dropping any that belong to
//! an older generation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::fs::ScanConfig;
use crate::core::tree::{DirTree, EntryMeta, NodeId};
use crate::error::BrowseError;
use crate::ui::browser::PickerListState;

/// Result of a picker interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Continue,
    Chosen(PathBuf),
}

/// Background work the picker needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRequest {
    Tree { root: PathBuf },
    Children { path: PathBuf },
}

#[derive(Debug)]
pub struct Picker {
    /// Directory the tree is (or will be) rooted at.
    pub root: PathBuf,
    pub tree: Option<DirTree>,
    pub list: PickerListState,
    pub scan: ScanConfig,
    /// Root scan failure, shown instead of the tree.
    pub error: Option<String>,
    /// Matches results to the request that produced them.
    pub generation: u64,
    /// Directories whose children are being scanned.
    pending: HashSet<PathBuf>,
    /// Row to highlight once the next tree arrives.
    highlight: Option<PathBuf>,
}

impl Picker {
    pub fn new(root: PathBuf, scan: ScanConfig, generation: u64) -> Self {
        Self {
            root,
            tree: None,
            list: PickerListState::default(),
            scan,
            error: None,
            generation,
            pending: HashSet::new(),
            highlight: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.tree.is_none() && self.error.is_none()
    }

    /// Scan needed to show the initial tree.
    pub fn initial_request(&self) -> ScanRequest {
        ScanRequest::Tree {
            root: self.root.clone(),
        }
    }

    pub fn visible(&self) -> Vec<NodeId> {
        self.tree
            .as_ref()
            .map(DirTree::visible_nodes)
            .unwrap_or_default()
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.visible().get(self.list.selected).copied()
    }

    pub fn selected_path(&self) -> Option<&Path> {
        let id = self.selected_node()?;
        self.tree.as_ref().map(|t| t.get(id).meta.path.as_path())
    }

    pub fn move_up(&mut self) {
        self.list.select_prev();
    }

    pub fn move_down(&mut self) {
        let count = self.visible().len();
        self.list.select_next(count);
    }

    /// Select the visible row at `index`, if it exists.
    pub fn select_row(&mut self, index: usize) -> bool {
        if index < self.visible().len() {
            self.list.selected = index;
            true
        } else {
            false
        }
    }

    /// Expand the selected directory.  Returns a scan request when its
    /// children have not been loaded yet.
    pub fn expand_selected(&mut self) -> Option<ScanRequest> {
        let id = self.selected_node()?;
        let tree = self.tree.as_mut()?;
        let node = tree.get_mut(id);
        node.expanded = true;
        if node.loaded || !self.pending.insert(node.meta.path.clone()) {
            return None;
        }
        Some(ScanRequest::Children {
            path: node.meta.path.clone(),
        })
    }

    /// Collapse the selected directory, or jump to its parent when it is
    /// already collapsed.
    pub fn collapse_selected(&mut self) {
        let Some(id) = self.selected_node() else {
            return;
        };
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        let root = tree.root;
        let node = tree.get_mut(id);
        if node.expanded && id != root {
            node.expanded = false;
            return;
        }
        if let Some(parent) = node.parent {
            if let Some(row) = self.visible().iter().position(|&n| n == parent) {
                self.list.selected = row;
            }
        }
    }

    /// Re-root at the parent of the current root.
    pub fn go_to_parent(&mut self) -> Option<ScanRequest> {
        let parent = self.root.parent()?.to_path_buf();
        let previous = self.root.clone();
        self.reroot(parent);
        self.highlight = Some(previous);
        Some(self.initial_request())
    }

    /// Flip hidden-directory visibility and rescan from the current root.
    pub fn toggle_hidden(&mut self) -> ScanRequest {
        self.scan.show_hidden = !self.scan.show_hidden;
        let selected = self.selected_path().map(Path::to_path_buf);
        let root = self.root.clone();
        self.reroot(root);
        self.highlight = selected;
        self.initial_request()
    }

    fn reroot(&mut self, root: PathBuf) {
        self.root = root;
        self.tree = None;
        self.error = None;
        self.pending.clear();
        self.highlight = None;
        self.list = PickerListState::default();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn choose(&self) -> PickerOutcome {
        match self.selected_path() {
            Some(path) => PickerOutcome::Chosen(path.to_path_buf()),
            None => PickerOutcome::Continue,
        }
    }

    /// Apply a finished root scan.  Stale generations are ignored.
    pub fn apply_tree(&mut self, generation: u64, result: Result<DirTree, BrowseError>) {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale tree");
            return;
        }
        match result {
            Ok(tree) => {
                self.list = PickerListState::default();
                // Walking upwards (or rescanning) keeps your place.
                if let Some(prev) = self.highlight.take().and_then(|p| tree.find(&p)) {
                    if let Some(row) = tree.visible_nodes().iter().position(|&n| n == prev) {
                        self.list.selected = row;
                    }
                }
                self.tree = Some(tree);
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(root = %self.root.display(), %err, "picker scan failed");
                self.error = Some(err.to_string());
            }
        }
    }

    /// Apply a finished child scan for `path`.
    pub fn apply_children(
        &mut self,
        generation: u64,
        path: &Path,
        result: Result<Vec<EntryMeta>, BrowseError>,
    ) {
        if generation != self.generation {
            return;
        }
        self.pending.remove(path);
        let Some(tree) = self.tree.as_mut() else {
            return;
        };
        let Some(id) = tree.find(path) else {
            return;
        };
        match result {
            Ok(children) => tree.attach_children(id, children),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to list directory");
                // Mark as loaded so the row shows as empty instead of
                // retrying on every expand.
                tree.attach_children(id, Vec::new());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(path: &str) -> EntryMeta {
        EntryMeta {
            name: Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: PathBuf::from(path),
            is_symlink: false,
        }
    }

    fn loaded_picker() -> Picker {
        let mut picker = Picker::new(PathBuf::from("/r"), ScanConfig::default(), 1);
        let mut tree = DirTree::new(meta("/r"));
        tree.attach_children(tree.root, vec![meta("/r/a"), meta("/r/b")]);
        picker.apply_tree(1, Ok(tree));
        picker
    }

    #[test]
    fn starts_loading() {
        let picker = Picker::new(PathBuf::from("/r"), ScanConfig::default(), 1);
        assert!(picker.is_loading());
        assert_eq!(
            picker.initial_request(),
            ScanRequest::Tree {
                root: PathBuf::from("/r")
            }
        );
        assert_eq!(picker.choose(), PickerOutcome::Continue);
    }

    #[test]
    fn stale_tree_is_ignored() {
        let mut picker = Picker::new(PathBuf::from("/r"), ScanConfig::default(), 2);
        picker.apply_tree(1, Ok(DirTree::new(meta("/r"))));
        assert!(picker.is_loading());
    }

    #[test]
    fn navigation_and_choose() {
        let mut picker = loaded_picker();
        assert_eq!(picker.choose(), PickerOutcome::Chosen(PathBuf::from("/r")));
        picker.move_down();
        picker.move_down();
        assert_eq!(picker.choose(), PickerOutcome::Chosen(PathBuf::from("/r/b")));
        picker.move_down();
        assert_eq!(picker.list.selected, 2);
        picker.move_up();
        assert_eq!(picker.selected_path(), Some(Path::new("/r/a")));
    }

    #[test]
    fn expand_requests_scan_once() {
        let mut picker = loaded_picker();
        picker.move_down();
        assert_eq!(
            picker.expand_selected(),
            Some(ScanRequest::Children {
                path: PathBuf::from("/r/a")
            })
        );
        assert_eq!(picker.expand_selected(), None);

        picker.apply_children(1, Path::new("/r/a"), Ok(vec![meta("/r/a/x")]));
        assert_eq!(picker.visible().len(), 4);
        assert_eq!(picker.expand_selected(), None);
    }

    #[test]
    fn collapse_then_jump_to_parent() {
        let mut picker = loaded_picker();
        picker.move_down();
        picker.expand_selected();
        picker.apply_children(1, Path::new("/r/a"), Ok(vec![meta("/r/a/x")]));
        picker.move_down();
        assert_eq!(picker.selected_path(), Some(Path::new("/r/a/x")));

        picker.collapse_selected();
        assert_eq!(picker.selected_path(), Some(Path::new("/r/a")));
        picker.collapse_selected();
        assert_eq!(picker.visible().len(), 3);
        picker.collapse_selected();
        assert_eq!(picker.selected_path(), Some(Path::new("/r")));
    }

    #[test]
    fn going_up_keeps_previous_root_highlighted() {
        let mut picker = loaded_picker();
        let request = picker.go_to_parent();
        assert_eq!(
            request,
            Some(ScanRequest::Tree {
                root: PathBuf::from("/")
            })
        );
        assert!(picker.is_loading());
        assert_eq!(picker.generation, 2);

        let mut tree = DirTree::new(meta("/"));
        tree.attach_children(tree.root, vec![meta("/bin"), meta("/r")]);
        picker.apply_tree(2, Ok(tree));
        assert_eq!(picker.selected_path(), Some(Path::new("/r")));
    }

    #[test]
    fn toggle_hidden_rescans() {
        let mut picker = loaded_picker();
        let request = picker.toggle_hidden();
        assert!(picker.scan.show_hidden);
        assert!(picker.is_loading());
        assert_eq!(
            request,
            ScanRequest::Tree {
                root: PathBuf::from("/r")
            }
        );
    }

    #[test]
    fn failed_root_scan_is_reported() {
        let mut picker = Picker::new(PathBuf::from("/r"), ScanConfig::default(), 1);
        picker.apply_tree(1, Err(BrowseError::NotADirectory(PathBuf::from("/r"))));
        assert!(!picker.is_loading());
        assert_eq!(picker.error.as_deref(), Some("/r is not a directory"));
    }
}
