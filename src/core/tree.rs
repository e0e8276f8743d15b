//! In-memory directory tree used by the built-in picker.
//!
//! Only directories are stored.  Nodes live in a flat arena and reference each
//! other by index, so the picker can expand a node lazily without fighting the
//! borrow checker over recursive `Box`es.

use std::path::{Path, PathBuf};

// ───────────────────────────────────────── node metadata ─────

/// Metadata kept per directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    pub name: String,
    pub path: PathBuf,
    /// `true` when the directory entry itself is a symlink (to a directory).
    pub is_symlink: bool,
}

impl EntryMeta {
    /// Read metadata for `path`, failing if it is not a directory.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        if !meta.is_dir() {
            return Err(std::io::Error::other(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        let is_symlink = std::fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            path: path.to_path_buf(),
            is_symlink,
        })
    }
}

// ───────────────────────────────────────── tree node ─────────

/// Index into [`DirTree::nodes`].
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub meta: EntryMeta,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub expanded: bool,
    /// Children have been scanned (possibly finding none).
    pub loaded: bool,
    /// Depth from the root (0 = root).
    pub depth: usize,
}

// ───────────────────────────────────────── arena tree ────────

#[derive(Debug, Clone)]
pub struct DirTree {
    pub nodes: Vec<TreeNode>,
    pub root: NodeId,
}

impl DirTree {
    /// Create a tree with a single, expanded root node.
    pub fn new(root_meta: EntryMeta) -> Self {
        let root = TreeNode {
            meta: root_meta,
            parent: None,
            children: Vec::new(),
            expanded: true,
            loaded: false,
            depth: 0,
        };
        Self {
            nodes: vec![root],
            root: 0,
        }
    }

    /// Add a child under `parent_id` and return its [`NodeId`].
    pub fn add_child(&mut self, parent_id: NodeId, meta: EntryMeta) -> NodeId {
        let depth = self.nodes[parent_id].depth + 1;
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            meta,
            parent: Some(parent_id),
            children: Vec::new(),
            expanded: false,
            loaded: false,
            depth,
        });
        self.nodes[parent_id].children.push(id);
        id
    }

    /// Attach freshly scanned children to `parent_id` and mark it loaded.
    /// Does nothing if the node was already loaded (a duplicate scan result).
    pub fn attach_children(&mut self, parent_id: NodeId, children: Vec<EntryMeta>) {
        if self.nodes[parent_id].loaded {
            return;
        }
        for meta in children {
            self.add_child(parent_id, meta);
        }
        self.nodes[parent_id].loaded = true;
    }

    /// Flattened list of node ids under expanded ancestors, in display order.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_visible(self.root, &mut out);
        out
    }

    fn collect_visible(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        let node = &self.nodes[id];
        if node.expanded {
            for &child in &node.children {
                self.collect_visible(child, out);
            }
        }
    }

    /// Find the node whose path equals `path`.
    pub fn find(&self, path: &Path) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.meta.path == path)
    }

    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id]
    }
}
