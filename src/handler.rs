use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Focus};
use crate::components::help::HelpOverlay;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.interrupt();
        return;
    }

    if app.show_help {
        handle_help_keys(app, key);
        return;
    }

    match app.focus {
        Focus::PathInput => handle_path_input_keys(app, key),
        Focus::Preview => handle_preview_keys(app, key),
        Focus::Tree => handle_tree_keys(app, key),
    }
}

fn handle_help_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) | KeyCode::Char('q') => {
            app.toggle_help()
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let max = HelpOverlay::total_lines().saturating_sub(1);
            app.help_scroll = (app.help_scroll + 1).min(max);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll = app.help_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_path_input_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_path_edit(),
        KeyCode::Enter => app.submit_path_edit(),
        KeyCode::Tab => app.accept_suggestion(),
        KeyCode::Backspace => app.path_delete_char(),
        KeyCode::Left => app.path_cursor_left(),
        KeyCode::Right => app.path_cursor_right(),
        KeyCode::Home => app.path_cursor_home(),
        KeyCode::End => app.path_cursor_end(),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            app.path_input_char(c)
        }
        _ => {}
    }
}

fn handle_preview_keys(app: &mut App, key: KeyEvent) {
    if handle_global_keys(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_preview_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_preview_up(1),
        KeyCode::PageDown => app.scroll_preview_down(app.preview_page()),
        KeyCode::PageUp => app.scroll_preview_up(app.preview_page()),
        KeyCode::Home => app.scroll_preview_top(),
        KeyCode::End => app.scroll_preview_bottom(),
        KeyCode::Esc => app.focus = Focus::Tree,
        _ => {}
    }
}

fn handle_tree_keys(app: &mut App, key: KeyEvent) {
    if handle_global_keys(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_selected(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_selected(),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Backspace => app.go_up(),
        KeyCode::Char('g') => app.start_path_edit(),
        KeyCode::Char(c @ '1'..='9') => app.jump_to_breadcrumb(c as usize - '1' as usize),
        _ => {}
    }
}

/// Keys shared by the tree and preview panels. Returns `true` if consumed.
fn handle_global_keys(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('h') if ctrl => app.toggle_hidden(),
        // Terminals with keyboard enhancement report Ctrl+Backspace this way. Legacy
        // terminals send Ctrl+H as a bare 0x08, indistinguishable from Backspace,
        // so `.` is the binding that works everywhere.
        KeyCode::Backspace if ctrl => app.toggle_hidden(),
        KeyCode::Char('.') => app.toggle_hidden(),
        KeyCode::F(5) | KeyCode::Char('r') => app.refresh(),
        KeyCode::F(1) | KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Tab | KeyCode::BackTab => app.cycle_focus(),
        _ => return false,
    }
    true
}
