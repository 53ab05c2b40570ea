use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::fs::path::{display_name, is_hidden};

/// Longest error message carried by an error placeholder.
const ERROR_MESSAGE_CHARS: usize = 50;

/// Kind of file-system object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One file-system object shown in the tree. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub name: String,
    pub hidden: bool,
    /// File size; `None` for directories or when unreadable.
    pub size: Option<u64>,
    pub modified: Option<SystemTime>,
}

impl Entry {
    /// Build an entry by querying the file system.
    ///
    /// Symlinks are followed; a dangling link is shown as a file.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path).or_else(|_| fs::symlink_metadata(path))?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            name: display_name(path),
            hidden: is_hidden(path),
            size: (kind == EntryKind::File).then(|| metadata.len()),
            modified: metadata.modified().ok(),
        })
    }

    /// Stand-in for a root directory whose metadata cannot be read.
    pub fn synthetic_dir(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: EntryKind::Directory,
            name: display_name(path),
            hidden: false,
            size: None,
            modified: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Why a synthetic child stands in for real ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Directory has entries that have not been listed yet.
    Loading,
    /// Directory could not be listed for lack of permission.
    Protected,
    /// Listing failed; carries a truncated message.
    Error(String),
}

impl PlaceholderKind {
    pub fn error(err: &io::Error) -> Self {
        PlaceholderKind::Error(err.to_string().chars().take(ERROR_MESSAGE_CHARS).collect())
    }

    /// Placeholder for a directory whose emptiness check failed.
    pub fn from_listing_error(err: &io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            PlaceholderKind::Protected
        } else {
            PlaceholderKind::error(err)
        }
    }

    pub fn label(&self) -> String {
        match self {
            PlaceholderKind::Loading => "Loading...".to_string(),
            PlaceholderKind::Protected => "Protected".to_string(),
            PlaceholderKind::Error(msg) => format!("Error: {}", msg),
        }
    }
}

/// What a tree node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Entry(Entry),
    Placeholder(PlaceholderKind),
}

/// Per-node expansion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    /// Never listed. A directory holds at most one placeholder child.
    Unloaded,
    /// Listed, currently folded. Children are kept.
    Collapsed,
    Expanded,
}

/// A node in the displayed tree. Owns its children.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub content: NodeContent,
    pub children: Vec<TreeNode>,
    pub state: ExpansionState,
    pub depth: usize,
}

impl TreeNode {
    fn placeholder(kind: PlaceholderKind, depth: usize) -> Self {
        Self {
            content: NodeContent::Placeholder(kind),
            children: Vec::new(),
            state: ExpansionState::Unloaded,
            depth,
        }
    }

    /// Wrap `entry`, probing directories for a lazy-load placeholder.
    fn from_entry(entry: Entry, depth: usize, show_hidden: bool) -> Self {
        let children = if entry.is_dir() {
            peek_placeholder(&entry.path, show_hidden)
                .map(|kind| vec![TreeNode::placeholder(kind, depth + 1)])
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Self {
            content: NodeContent::Entry(entry),
            children,
            state: ExpansionState::Unloaded,
            depth,
        }
    }

    pub fn entry(&self) -> Option<&Entry> {
        match &self.content {
            NodeContent::Entry(e) => Some(e),
            NodeContent::Placeholder(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.entry().map(|e| e.path.as_path())
    }

    pub fn is_dir(&self) -> bool {
        self.entry().is_some_and(Entry::is_dir)
    }

    pub fn is_expanded(&self) -> bool {
        self.state == ExpansionState::Expanded
    }

    /// Real (non-placeholder) children.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.children.iter().filter_map(TreeNode::entry)
    }

    pub fn placeholder_kind(&self) -> Option<&PlaceholderKind> {
        match &self.content {
            NodeContent::Placeholder(kind) => Some(kind),
            NodeContent::Entry(_) => None,
        }
    }
}

/// Cheap check for whether a directory has anything worth expanding.
fn peek_placeholder(dir: &Path, show_hidden: bool) -> Option<PlaceholderKind> {
    match fs::read_dir(dir) {
        Ok(mut entries) => entries
            .any(|e| match e {
                Ok(e) => show_hidden || !e.file_name().to_string_lossy().starts_with('.'),
                Err(_) => true,
            })
            .then_some(PlaceholderKind::Loading),
        Err(e) => Some(PlaceholderKind::from_listing_error(&e)),
    }
}

/// List, filter, sort and truncate the children of `dir`.
///
/// Any listing failure becomes a single error placeholder.
fn load_children(dir: &Path, depth: usize, show_hidden: bool, max_entries: usize) -> Vec<TreeNode> {
    let read = fs::read_dir(dir).and_then(|entries| {
        entries
            .map(|res| res.map(|e| e.path()))
            .collect::<io::Result<Vec<PathBuf>>>()
    });
    let paths = match read {
        Ok(paths) => paths,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "directory listing failed");
            return vec![TreeNode::placeholder(PlaceholderKind::error(&e), depth)];
        }
    };

    // Entries that vanish between listing and stat are dropped.
    let mut entries: Vec<Entry> = paths
        .iter()
        .filter_map(|p| Entry::from_path(p).ok())
        .filter(|e| show_hidden || !e.hidden)
        .collect();
    sort_entries(&mut entries);
    entries.truncate(max_entries);

    entries
        .into_iter()
        .map(|e| TreeNode::from_entry(e, depth, show_hidden))
        .collect()
}

/// Directories first, then case-insensitive name.
fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// What a tree mutation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    Rerooted(PathBuf),
    Expanded(PathBuf),
    Collapsed(PathBuf),
    Unchanged,
}

/// Row kind in the flattened view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatKind {
    Directory,
    File,
    Placeholder(PlaceholderKind),
}

/// A flattened representation of a tree node for rendering.
#[derive(Debug, Clone)]
pub struct FlatItem {
    pub name: String,
    /// `None` for placeholders.
    pub path: Option<PathBuf>,
    pub kind: FlatKind,
    pub depth: usize,
    pub is_expanded: bool,
    pub is_last_sibling: bool,
    pub is_hidden: bool,
    pub size: Option<u64>,
}

impl FlatItem {
    pub fn is_dir(&self) -> bool {
        self.kind == FlatKind::Directory
    }
}

/// The displayed directory tree with lazy expansion and a cursor.
pub struct TreeModel {
    pub root: TreeNode,
    pub flat_items: Vec<FlatItem>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    show_hidden: bool,
    max_entries: usize,
}

impl TreeModel {
    /// Create a model rooted at `path`, with the root already expanded.
    pub fn new(path: &Path, show_hidden: bool, max_entries: usize) -> Self {
        let mut model = Self {
            root: TreeNode::placeholder(PlaceholderKind::Loading, 0),
            flat_items: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            show_hidden,
            max_entries: max_entries.max(1),
        };
        model.set_root(path);
        model
    }

    pub fn root_path(&self) -> &Path {
        self.root.path().unwrap_or_else(|| Path::new("/"))
    }

    /// Discard the whole tree and build an expanded root for `path`.
    pub fn set_root(&mut self, path: &Path) -> TreeChange {
        let entry = match Entry::from_path(path) {
            Ok(e) if e.is_dir() => e,
            _ => Entry::synthetic_dir(path),
        };
        let children = load_children(path, 1, self.show_hidden, self.max_entries);
        self.root = TreeNode {
            content: NodeContent::Entry(entry),
            children,
            state: ExpansionState::Expanded,
            depth: 0,
        };
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.flatten();
        debug!(root = %path.display(), "tree re-rooted");
        TreeChange::Rerooted(path.to_path_buf())
    }

    /// Expand the directory at `path`. No-op if already expanded or not a directory.
    pub fn expand(&mut self, path: &Path) -> TreeChange {
        let show_hidden = self.show_hidden;
        let max_entries = self.max_entries;
        let Some(node) = Self::find_node_mut(&mut self.root, path) else {
            return TreeChange::Unchanged;
        };
        if !node.is_dir() {
            return TreeChange::Unchanged;
        }
        match node.state {
            ExpansionState::Expanded => return TreeChange::Unchanged,
            ExpansionState::Collapsed => {}
            ExpansionState::Unloaded => {
                node.children = load_children(path, node.depth + 1, show_hidden, max_entries);
            }
        }
        node.state = ExpansionState::Expanded;
        self.flatten();
        TreeChange::Expanded(path.to_path_buf())
    }

    /// Fold the directory at `path`, keeping its children. The root stays expanded.
    pub fn collapse(&mut self, path: &Path) -> TreeChange {
        if path == self.root_path() {
            return TreeChange::Unchanged;
        }
        let Some(node) = Self::find_node_mut(&mut self.root, path) else {
            return TreeChange::Unchanged;
        };
        if !node.is_expanded() {
            return TreeChange::Unchanged;
        }
        node.state = ExpansionState::Collapsed;
        self.flatten();
        TreeChange::Collapsed(path.to_path_buf())
    }

    /// Change hidden-file visibility and rebuild the root subtree.
    pub fn set_show_hidden(&mut self, flag: bool, expanded: &HashSet<PathBuf>) -> TreeChange {
        if self.show_hidden == flag {
            return TreeChange::Unchanged;
        }
        self.show_hidden = flag;
        self.rebuild(expanded)
    }

    /// Re-read the root from disk, re-expanding `expanded` where still present.
    ///
    /// The cursor stays on the same path when that path survives.
    pub fn rebuild(&mut self, expanded: &HashSet<PathBuf>) -> TreeChange {
        let selected = self.selected_path().map(Path::to_path_buf);
        let root = self.root_path().to_path_buf();
        let change = self.set_root(&root);
        self.restore_expanded(expanded);
        self.flatten();
        if let Some(idx) = selected.and_then(|p| self.find_index_by_path(&p)) {
            self.selected_index = idx;
        }
        change
    }

    /// Re-expand directories from a saved set, ancestors first.
    fn restore_expanded(&mut self, expanded: &HashSet<PathBuf>) {
        let show_hidden = self.show_hidden;
        let max_entries = self.max_entries;
        for path in Self::expanded_paths_in_restore_order(expanded) {
            if let Some(node) = Self::find_node_mut(&mut self.root, path) {
                if node.is_dir() && !node.is_expanded() {
                    node.children = load_children(path, node.depth + 1, show_hidden, max_entries);
                    node.state = ExpansionState::Expanded;
                }
            }
        }
    }

    /// Return expanded paths sorted so ancestors are restored before descendants.
    fn expanded_paths_in_restore_order(expanded: &HashSet<PathBuf>) -> Vec<&PathBuf> {
        let mut ordered: Vec<&PathBuf> = expanded.iter().collect();
        ordered.sort_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        });
        ordered
    }

    /// Find a node by path. Placeholders are never matched.
    pub fn find_node(&self, target: &Path) -> Option<&TreeNode> {
        fn walk<'a>(node: &'a TreeNode, target: &Path) -> Option<&'a TreeNode> {
            if node.path() == Some(target) {
                return Some(node);
            }
            node.children.iter().find_map(|c| walk(c, target))
        }
        walk(&self.root, target)
    }

    fn find_node_mut<'a>(node: &'a mut TreeNode, target: &Path) -> Option<&'a mut TreeNode> {
        if node.path() == Some(target) {
            return Some(node);
        }
        // Only descend into ancestors of the target.
        if let Some(own) = node.path() {
            if !target.starts_with(own) {
                return None;
            }
        }
        node.children
            .iter_mut()
            .find_map(|child| Self::find_node_mut(child, target))
    }

    /// Rebuild the flat items list from the tree.
    pub fn flatten(&mut self) {
        self.flat_items.clear();
        Self::flatten_node(&self.root, &mut self.flat_items, true);
        if !self.flat_items.is_empty() && self.selected_index >= self.flat_items.len() {
            self.selected_index = self.flat_items.len() - 1;
        }
    }

    fn flatten_node(node: &TreeNode, items: &mut Vec<FlatItem>, is_last: bool) {
        let item = match &node.content {
            NodeContent::Entry(entry) => FlatItem {
                name: entry.name.clone(),
                path: Some(entry.path.clone()),
                kind: if entry.is_dir() {
                    FlatKind::Directory
                } else {
                    FlatKind::File
                },
                depth: node.depth,
                is_expanded: node.is_expanded(),
                is_last_sibling: is_last,
                is_hidden: entry.hidden,
                size: entry.size,
            },
            NodeContent::Placeholder(kind) => FlatItem {
                name: kind.label(),
                path: None,
                kind: FlatKind::Placeholder(kind.clone()),
                depth: node.depth,
                is_expanded: false,
                is_last_sibling: is_last,
                is_hidden: false,
                size: None,
            },
        };
        items.push(item);

        if node.is_expanded() {
            let count = node.children.len();
            for (i, child) in node.children.iter().enumerate() {
                Self::flatten_node(child, items, i + 1 == count);
            }
        }
    }

    pub fn selected(&self) -> Option<&FlatItem> {
        self.flat_items.get(self.selected_index)
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selected().and_then(|i| i.path.as_deref())
    }

    /// Find the flat_items index of a node by its path.
    pub fn find_index_by_path(&self, path: &Path) -> Option<usize> {
        self.flat_items
            .iter()
            .position(|item| item.path.as_deref() == Some(path))
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        let len = self.flat_items.len();
        if len > 0 && self.selected_index < len - 1 {
            self.selected_index += 1;
        }
    }

    /// Move selection up by one item.
    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.flat_items.len().saturating_sub(1);
    }

    /// Move the cursor to the row of the selected item's parent directory.
    pub fn select_parent(&mut self) {
        let Some(item) = self.selected() else {
            return;
        };
        let depth = item.depth;
        if depth == 0 {
            return;
        }
        if let Some(idx) = self.flat_items[..self.selected_index]
            .iter()
            .rposition(|i| i.depth + 1 == depth)
        {
            self.selected_index = idx;
        }
    }

    /// Update the scroll offset to ensure the selected item is visible.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }
}
