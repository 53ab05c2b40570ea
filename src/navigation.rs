//! Navigation orchestration: turns UI-level intents into tree, path and
//! preview operations and announces the outcome on the event channel.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::event::Event;
use crate::fs::inspect::{FileInspector, Preview};
use crate::fs::path::PathService;
use crate::fs::tree::{TreeChange, TreeModel};

/// Outward notifications from navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    DirectoryChanged(PathBuf),
    FileSelected(PathBuf),
    /// The current root was re-read from disk.
    Refreshed(PathBuf),
    HiddenToggled(bool),
    PathEditStarted,
    PathEditCancelled,
}

/// Where the user is and what they have opened.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub root: PathBuf,
    pub show_hidden: bool,
    /// Best-effort memory of expanded directories under the current root.
    pub expanded: HashSet<PathBuf>,
}

/// Owns the tree and the file-system services it drives.
pub struct NavigationController {
    pub tree: TreeModel,
    paths: PathService,
    inspector: FileInspector,
    state: NavigationState,
    events: mpsc::UnboundedSender<Event>,
}

impl NavigationController {
    pub fn new(
        root: &Path,
        show_hidden: bool,
        max_entries: usize,
        paths: PathService,
        inspector: FileInspector,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            tree: TreeModel::new(root, show_hidden, max_entries),
            paths,
            inspector,
            state: NavigationState {
                root: root.to_path_buf(),
                show_hidden,
                expanded: HashSet::new(),
            },
            events,
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn root(&self) -> &Path {
        &self.state.root
    }

    pub fn paths(&self) -> &PathService {
        &self.paths
    }

    /// Send a notification to whoever drains the event channel.
    pub fn notify(&self, event: NavEvent) {
        if self.events.send(Event::Navigation(event)).is_err() {
            debug!("navigation event dropped: receiver closed");
        }
    }

    /// Directory → re-root there; file → announce the selection.
    ///
    /// A directory that fails validation leaves the state untouched.
    pub fn on_node_selected(&mut self, path: &Path) -> Result<(), ValidationError> {
        let Some(node) = self.tree.find_node(path) else {
            return Ok(());
        };
        if node.is_dir() {
            self.paths.validate(path)?;
            self.reroot(path);
        } else {
            debug!(path = %path.display(), "file selected");
            self.notify(NavEvent::FileSelected(path.to_path_buf()));
        }
        Ok(())
    }

    pub fn on_node_expanded(&mut self, path: &Path) -> TreeChange {
        let change = self.tree.expand(path);
        if let TreeChange::Expanded(p) = &change {
            self.state.expanded.insert(p.clone());
        }
        change
    }

    pub fn on_node_collapsed(&mut self, path: &Path) -> TreeChange {
        let change = self.tree.collapse(path);
        if let TreeChange::Collapsed(p) = &change {
            self.state.expanded.remove(p);
        }
        change
    }

    /// Re-root at the parent directory. Returns `false` at the file-system root.
    pub fn go_up(&mut self) -> bool {
        let Some(parent) = self.paths.parent(&self.state.root) else {
            return false;
        };
        let previous = self.state.root.clone();
        self.reroot(&parent);
        if let Some(idx) = self.tree.find_index_by_path(&previous) {
            self.tree.selected_index = idx;
        }
        true
    }

    /// Validate user-typed text and re-root there.
    ///
    /// Relative input resolves against the current root.
    pub fn edit_path(&mut self, text: &str) -> Result<PathBuf, ValidationError> {
        let target = self.check_path(text)?;
        self.reroot(&target);
        Ok(target)
    }

    /// Normalize and validate without navigating.
    pub fn check_path(&self, text: &str) -> Result<PathBuf, ValidationError> {
        let target = self.paths.normalize_in(text, &self.state.root);
        self.paths.validate(&target).map_err(|e| {
            debug!(input = %text, error = %e, "path rejected");
            e
        })?;
        Ok(target)
    }

    /// Re-root at one of the breadcrumb segments.
    pub fn navigate_to_component(&mut self, path: &Path) -> Result<(), ValidationError> {
        self.paths.validate(path)?;
        let previous = self.state.root.clone();
        self.reroot(path);
        // Keep the cursor on the child we came from, if visible.
        let came_from = previous
            .ancestors()
            .find(|a| a.parent() == Some(path))
            .map(Path::to_path_buf);
        if let Some(idx) = came_from.and_then(|p| self.tree.find_index_by_path(&p)) {
            self.tree.selected_index = idx;
        }
        Ok(())
    }

    /// Re-read the current root, discarding cached children.
    pub fn refresh(&mut self) {
        self.tree.rebuild(&self.state.expanded);
        info!(root = %self.state.root.display(), "refreshed");
        self.notify(NavEvent::Refreshed(self.state.root.clone()));
    }

    pub fn toggle_hidden(&mut self) {
        self.state.show_hidden = !self.state.show_hidden;
        self.tree
            .set_show_hidden(self.state.show_hidden, &self.state.expanded);
        self.notify(NavEvent::HiddenToggled(self.state.show_hidden));
    }

    pub fn autocomplete(&self, partial: &str) -> Vec<String> {
        self.paths.autocomplete(partial, &self.state.root)
    }

    pub fn breadcrumbs(&self) -> Vec<(String, PathBuf)> {
        self.paths.components(&self.state.root)
    }

    pub fn preview(&self, path: &Path) -> Preview {
        self.inspector.preview(path)
    }

    fn reroot(&mut self, path: &Path) {
        self.tree.set_root(path);
        self.state.root = path.to_path_buf();
        self.state.expanded.clear();
        info!(root = %path.display(), "directory changed");
        self.notify(NavEvent::DirectoryChanged(path.to_path_buf()));
    }
}
