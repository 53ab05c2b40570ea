use std::path::{Path, PathBuf};
use std::time::Instant;

use ratatui::text::Line;
use tracing::debug;

use crate::components::preview::{preview_lines, Highlighter};
use crate::config::AppConfig;
use crate::error::ValidationError;
use crate::fs::inspect::Preview;
use crate::fs::tree::FlatKind;
use crate::navigation::{NavEvent, NavigationController};
use crate::theme::{self, ThemeColors};

/// Exit code for a normal quit.
pub const EXIT_OK: u8 = 0;
/// Exit code after Ctrl+C.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Which panel receives key input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Tree,
    Preview,
    PathInput,
}

/// The inline path editor.
#[derive(Debug, Default)]
pub struct PathInputState {
    pub input: String,
    /// Byte offset into `input`, always on a char boundary.
    pub cursor_position: usize,
    pub suggestions: Vec<String>,
    /// Result of validating the current input; `None` before the first edit.
    pub validity: Option<Result<PathBuf, ValidationError>>,
}

impl PathInputState {
    /// `✓ Valid path` or `✗ <reason>`.
    pub fn feedback(&self) -> Option<(bool, String)> {
        self.validity.as_ref().map(|v| match v {
            Ok(_) => (true, "✓ Valid path".to_string()),
            Err(e) => (false, format!("✗ {}", e)),
        })
    }
}

/// What the preview pane currently shows.
#[derive(Debug, Default)]
pub struct PreviewState {
    pub current: Option<Preview>,
    pub lines: Vec<Line<'static>>,
    pub scroll_offset: usize,
    /// Height of the pane at the last render, for paging.
    pub viewport_height: usize,
}

impl PreviewState {
    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_height.max(1))
    }
}

/// Main application state.
pub struct App {
    pub nav: NavigationController,
    pub focus: Focus,
    pub path_input: PathInputState,
    pub preview: PreviewState,
    pub highlighter: Highlighter,
    pub theme: ThemeColors,
    pub use_icons: bool,
    pub preview_enabled: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    pub status_message: Option<(String, Instant, bool)>,
    pub should_quit: bool,
    pub exit_code: u8,
}

impl App {
    pub fn new(nav: NavigationController, config: &AppConfig) -> Self {
        Self {
            nav,
            focus: Focus::Tree,
            path_input: PathInputState::default(),
            preview: PreviewState::default(),
            highlighter: Highlighter::new(config.syntax_theme_name(), config.line_numbers()),
            theme: theme::resolve_theme(&config.theme),
            use_icons: config.use_icons(),
            preview_enabled: config.preview_enabled(),
            show_help: false,
            help_scroll: 0,
            status_message: None,
            should_quit: false,
            exit_code: EXIT_OK,
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Quit as if interrupted.
    pub fn interrupt(&mut self) {
        self.exit_code = EXIT_INTERRUPTED;
        self.should_quit = true;
    }

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now(), false));
    }

    pub fn set_error_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now(), true));
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, ref created, _)) = self.status_message {
            if created.elapsed().as_secs() > 3 {
                self.status_message = None;
            }
        }
    }

    // ── Tree ────────────────────────────────────────────────────────────

    pub fn select_next(&mut self) {
        self.nav.tree.select_next();
    }

    pub fn select_previous(&mut self) {
        self.nav.tree.select_previous();
    }

    pub fn select_first(&mut self) {
        self.nav.tree.select_first();
    }

    pub fn select_last(&mut self) {
        self.nav.tree.select_last();
    }

    /// Expand the selected directory (no-op on files and placeholders).
    pub fn expand_selected(&mut self) {
        if let Some(path) = self.selected_dir() {
            self.nav.on_node_expanded(&path);
        }
    }

    /// Collapse the selected directory, or move to its parent row.
    pub fn collapse_selected(&mut self) {
        let expanded_dir = self
            .nav
            .tree
            .selected()
            .filter(|item| item.is_dir() && item.is_expanded && item.depth > 0)
            .and_then(|item| item.path.clone());
        match expanded_dir {
            Some(path) => {
                self.nav.on_node_collapsed(&path);
            }
            None => self.nav.tree.select_parent(),
        }
    }

    /// Open the selected node: re-root into directories, preview files.
    pub fn activate_selected(&mut self) {
        let Some(path) = self.nav.tree.selected_path().map(Path::to_path_buf) else {
            return;
        };
        if let Err(e) = self.nav.on_node_selected(&path) {
            self.set_error_message(format!("{}: {}", path.display(), e));
        }
    }

    pub fn go_up(&mut self) {
        if !self.nav.go_up() {
            self.set_status_message("Already at the file-system root".to_string());
        }
    }

    /// Re-root at the `index`-th breadcrumb (0 is the file-system root).
    pub fn jump_to_breadcrumb(&mut self, index: usize) {
        let crumbs = self.nav.breadcrumbs();
        // The last crumb is the current root.
        if index + 1 >= crumbs.len() {
            return;
        }
        let target = crumbs[index].1.clone();
        if let Err(e) = self.nav.navigate_to_component(&target) {
            self.set_error_message(format!("{}: {}", target.display(), e));
        }
    }

    pub fn refresh(&mut self) {
        self.nav.refresh();
    }

    pub fn toggle_hidden(&mut self) {
        self.nav.toggle_hidden();
    }

    fn selected_dir(&self) -> Option<PathBuf> {
        self.nav
            .tree
            .selected()
            .filter(|item| item.kind == FlatKind::Directory)
            .and_then(|item| item.path.clone())
    }

    // ── Focus & overlays ────────────────────────────────────────────────

    /// Cycle focus between tree and preview.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tree if self.preview_enabled => Focus::Preview,
            Focus::Preview => Focus::Tree,
            other => other,
        };
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        self.help_scroll = 0;
    }

    // ── Path editing ────────────────────────────────────────────────────

    /// Open the path editor prefilled with the current root.
    pub fn start_path_edit(&mut self) {
        let input = self.nav.root().to_string_lossy().to_string();
        self.path_input = PathInputState {
            cursor_position: input.len(),
            input,
            suggestions: Vec::new(),
            validity: None,
        };
        self.focus = Focus::PathInput;
        self.update_path_feedback();
        self.nav.notify(NavEvent::PathEditStarted);
    }

    pub fn cancel_path_edit(&mut self) {
        self.path_input = PathInputState::default();
        self.focus = Focus::Tree;
        self.nav.notify(NavEvent::PathEditCancelled);
    }

    /// Navigate to the typed path; stays in the editor when it is invalid.
    pub fn submit_path_edit(&mut self) {
        match self.nav.edit_path(&self.path_input.input) {
            Ok(_) => {
                self.path_input = PathInputState::default();
                self.focus = Focus::Tree;
            }
            Err(e) => {
                self.path_input.validity = Some(Err(e.clone()));
                self.set_error_message(format!("Invalid path: {}", e));
            }
        }
    }

    /// Replace the input with the first suggestion.
    pub fn accept_suggestion(&mut self) {
        if let Some(first) = self.path_input.suggestions.first().cloned() {
            self.path_input.cursor_position = first.len();
            self.path_input.input = first;
            self.update_path_feedback();
        }
    }

    /// Insert a character at the current cursor position.
    pub fn path_input_char(&mut self, c: char) {
        let state = &mut self.path_input;
        state.input.insert(state.cursor_position, c);
        state.cursor_position += c.len_utf8();
        self.update_path_feedback();
    }

    /// Delete the character before the cursor (backspace).
    pub fn path_delete_char(&mut self) {
        let state = &mut self.path_input;
        if let Some(prev) = state.input[..state.cursor_position].chars().next_back() {
            state.cursor_position -= prev.len_utf8();
            state.input.remove(state.cursor_position);
            self.update_path_feedback();
        }
    }

    /// Move cursor left by one character.
    pub fn path_cursor_left(&mut self) {
        let state = &mut self.path_input;
        if let Some(prev) = state.input[..state.cursor_position].chars().next_back() {
            state.cursor_position -= prev.len_utf8();
        }
    }

    /// Move cursor right by one character.
    pub fn path_cursor_right(&mut self) {
        let state = &mut self.path_input;
        if let Some(next) = state.input[state.cursor_position..].chars().next() {
            state.cursor_position += next.len_utf8();
        }
    }

    pub fn path_cursor_home(&mut self) {
        self.path_input.cursor_position = 0;
    }

    pub fn path_cursor_end(&mut self) {
        self.path_input.cursor_position = self.path_input.input.len();
    }

    fn update_path_feedback(&mut self) {
        let input = self.path_input.input.clone();
        self.path_input.validity = Some(self.nav.check_path(&input));
        self.path_input.suggestions = self.nav.autocomplete(&input);
    }

    // ── Preview ─────────────────────────────────────────────────────────

    fn load_preview(&mut self, path: &Path) {
        let preview = self.nav.preview(path);
        self.preview.lines = preview_lines(&preview, &self.highlighter, &self.theme);
        self.preview.current = Some(preview);
        self.preview.scroll_offset = 0;
    }

    fn clear_preview(&mut self) {
        self.preview.current = None;
        self.preview.lines.clear();
        self.preview.scroll_offset = 0;
    }

    pub fn scroll_preview_down(&mut self, n: usize) {
        self.preview.scroll_offset = (self.preview.scroll_offset + n).min(self.preview.max_scroll());
    }

    pub fn scroll_preview_up(&mut self, n: usize) {
        self.preview.scroll_offset = self.preview.scroll_offset.saturating_sub(n);
    }

    pub fn scroll_preview_top(&mut self) {
        self.preview.scroll_offset = 0;
    }

    pub fn scroll_preview_bottom(&mut self) {
        self.preview.scroll_offset = self.preview.max_scroll();
    }

    pub fn preview_page(&self) -> usize {
        self.preview.viewport_height.max(1)
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// React to a navigation notification drained from the event channel.
    pub fn handle_nav_event(&mut self, event: NavEvent) {
        match event {
            NavEvent::DirectoryChanged(path) => {
                self.clear_preview();
                self.set_status_message(format!("Changed to {}", path.display()));
            }
            NavEvent::FileSelected(path) => {
                if self.preview_enabled {
                    self.load_preview(&path);
                }
            }
            NavEvent::Refreshed(_) => {
                let current = self.preview.current.as_ref().map(|p| p.path.clone());
                if let Some(path) = current {
                    let offset = self.preview.scroll_offset;
                    self.load_preview(&path);
                    self.preview.scroll_offset = offset.min(self.preview.max_scroll());
                }
                self.set_status_message("Refreshed".to_string());
            }
            NavEvent::HiddenToggled(shown) => {
                let msg = if shown {
                    "Showing hidden files"
                } else {
                    "Hiding hidden files"
                };
                self.set_status_message(msg.to_string());
            }
            NavEvent::PathEditStarted | NavEvent::PathEditCancelled => {
                debug!(?event, "path editor");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::fs::inspect::FileInspector;
    use crate::fs::path::PathService;
    use std::fs::{self, File};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn setup_app() -> (TempDir, App, mpsc::UnboundedReceiver<Event>) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir(root.join("alpha")).unwrap();
        File::create(root.join("alpha").join("inner.txt")).unwrap();
        fs::create_dir(root.join("beta")).unwrap();
        fs::write(root.join("notes.md"), "# Title\nbody\n").unwrap();
        File::create(root.join(".hidden")).unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let nav = NavigationController::new(
            &root,
            false,
            50,
            PathService::default(),
            FileInspector::default(),
            tx,
        );
        let app = App::new(nav, &AppConfig::default());
        (dir, app, rx)
    }

    /// Feed queued navigation events back into the app, like the main loop.
    fn pump(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Event>) {
        while let Ok(event) = rx.try_recv() {
            if let Event::Navigation(nav) = event {
                app.handle_nav_event(nav);
            }
        }
    }

    fn select(app: &mut App, name: &str) {
        let path = app.nav.root().join(name);
        app.nav.tree.selected_index = app.nav.tree.find_index_by_path(&path).unwrap();
    }

    #[test]
    fn quit_and_interrupt_set_exit_codes() {
        let (_dir, mut app, _rx) = setup_app();
        app.quit();
        assert!(app.should_quit);
        assert_eq!(app.exit_code, EXIT_OK);

        let (_dir, mut app, _rx) = setup_app();
        app.interrupt();
        assert!(app.should_quit);
        assert_eq!(app.exit_code, EXIT_INTERRUPTED);
    }

    #[test]
    fn activating_file_loads_preview() {
        let (_dir, mut app, mut rx) = setup_app();
        select(&mut app, "notes.md");
        app.activate_selected();
        pump(&mut app, &mut rx);

        let current = app.preview.current.as_ref().unwrap();
        assert!(current.path.ends_with("notes.md"));
        assert!(!app.preview.lines.is_empty());
    }

    #[test]
    fn directory_change_clears_preview() {
        let (_dir, mut app, mut rx) = setup_app();
        select(&mut app, "notes.md");
        app.activate_selected();
        pump(&mut app, &mut rx);
        assert!(app.preview.current.is_some());

        select(&mut app, "alpha");
        app.activate_selected();
        pump(&mut app, &mut rx);
        assert!(app.preview.current.is_none());
        assert!(app.nav.root().ends_with("alpha"));
    }

    #[test]
    fn expand_and_collapse_selected() {
        let (_dir, mut app, _rx) = setup_app();
        select(&mut app, "alpha");
        let before = app.nav.tree.flat_items.len();
        app.expand_selected();
        assert_eq!(app.nav.tree.flat_items.len(), before + 1);
        app.collapse_selected();
        assert_eq!(app.nav.tree.flat_items.len(), before);
        // A collapsed directory moves the cursor to its parent row instead.
        app.collapse_selected();
        assert_eq!(app.nav.tree.selected_index, 0);
    }

    #[test]
    fn toggle_hidden_changes_count() {
        let (_dir, mut app, mut rx) = setup_app();
        let before = app.nav.tree.flat_items.len();
        app.toggle_hidden();
        pump(&mut app, &mut rx);
        assert_eq!(app.nav.tree.flat_items.len(), before + 1);
        assert_eq!(
            app.status_message.as_ref().map(|(m, _, _)| m.as_str()),
            Some("Showing hidden files")
        );
    }

    #[test]
    fn path_edit_live_feedback_and_submit() {
        let (_dir, mut app, mut rx) = setup_app();
        let root = app.nav.root().to_path_buf();
        app.start_path_edit();
        assert_eq!(app.focus, Focus::PathInput);
        assert_eq!(app.path_input.input, root.to_string_lossy());
        assert!(app.path_input.feedback().unwrap().0);

        for c in "/nowhere".chars() {
            app.path_input_char(c);
        }
        let (ok, msg) = app.path_input.feedback().unwrap();
        assert!(!ok);
        assert_eq!(msg, "✗ Path does not exist");

        app.submit_path_edit();
        assert_eq!(app.focus, Focus::PathInput);
        assert_eq!(app.nav.root(), root.as_path());

        for _ in 0.."nowhere".len() {
            app.path_delete_char();
        }
        app.path_input_char('b');
        assert_eq!(
            app.path_input.suggestions,
            vec![format!("{}/beta/", root.display())]
        );
        app.accept_suggestion();
        app.submit_path_edit();
        pump(&mut app, &mut rx);
        assert_eq!(app.focus, Focus::Tree);
        assert_eq!(app.nav.root(), root.join("beta").as_path());
    }

    #[test]
    fn cancel_path_edit_restores_tree_focus() {
        let (_dir, mut app, mut rx) = setup_app();
        app.start_path_edit();
        app.cancel_path_edit();
        assert_eq!(app.focus, Focus::Tree);
        assert!(app.path_input.input.is_empty());
        let events: Vec<Event> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(matches!(
            events.as_slice(),
            [
                Event::Navigation(NavEvent::PathEditStarted),
                Event::Navigation(NavEvent::PathEditCancelled)
            ]
        ));
    }

    #[test]
    fn path_cursor_moves_over_multibyte_chars() {
        let (_dir, mut app, _rx) = setup_app();
        app.start_path_edit();
        app.path_input.input.clear();
        app.path_input.cursor_position = 0;
        app.path_input_char('é');
        app.path_input_char('x');
        app.path_cursor_left();
        assert_eq!(app.path_input.cursor_position, 'é'.len_utf8());
        app.path_cursor_left();
        app.path_cursor_left();
        assert_eq!(app.path_input.cursor_position, 0);
        app.path_cursor_end();
        app.path_cursor_right();
        assert_eq!(app.path_input.cursor_position, app.path_input.input.len());
        app.path_cursor_home();
        app.path_delete_char();
        assert_eq!(app.path_input.input, "éx");
    }

    #[test]
    fn refresh_rereads_previewed_file() {
        let (_dir, mut app, mut rx) = setup_app();
        select(&mut app, "notes.md");
        app.activate_selected();
        pump(&mut app, &mut rx);
        let before = app.preview.lines.len();

        let path = app.nav.root().join("notes.md");
        fs::write(&path, "# Title\nbody\nmore\nlines\n").unwrap();
        app.refresh();
        pump(&mut app, &mut rx);
        assert_eq!(app.preview.lines.len(), before + 2);
    }

    #[test]
    fn preview_scroll_is_bounded() {
        let (_dir, mut app, _rx) = setup_app();
        app.preview.lines = (0..30).map(|i| Line::from(i.to_string())).collect();
        app.preview.viewport_height = 10;
        app.scroll_preview_down(100);
        assert_eq!(app.preview.scroll_offset, 20);
        app.scroll_preview_up(5);
        assert_eq!(app.preview.scroll_offset, 15);
        app.scroll_preview_top();
        assert_eq!(app.preview.scroll_offset, 0);
        app.scroll_preview_bottom();
        assert_eq!(app.preview.scroll_offset, 20);
    }

    #[test]
    fn focus_cycles_between_panels() {
        let (_dir, mut app, _rx) = setup_app();
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Preview);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Tree);
        app.preview_enabled = false;
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Tree);
    }

    #[test]
    fn go_up_at_root_reports_status() {
        let (_dir, mut app, _rx) = setup_app();
        while app.nav.go_up() {}
        app.go_up();
        assert!(app.status_message.is_some());
    }

    #[test]
    fn jump_to_breadcrumb_reroots_at_ancestor() {
        let (_dir, mut app, _rx) = setup_app();
        let root = app.nav.root().to_path_buf();
        select(&mut app, "alpha");
        app.activate_selected();
        let crumbs = app.nav.breadcrumbs();
        // Jumping to the current root is a no-op.
        app.jump_to_breadcrumb(crumbs.len() - 1);
        assert!(app.nav.root().ends_with("alpha"));

        app.jump_to_breadcrumb(crumbs.len() - 2);
        assert_eq!(app.nav.root(), root.as_path());
        assert_eq!(
            app.nav.tree.selected_path(),
            Some(root.join("alpha").as_path())
        );
    }
}
