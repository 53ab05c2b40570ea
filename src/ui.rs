use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, Focus};
use crate::components::help::HelpOverlay;
use crate::components::path_bar::{self, PathBarWidget};
use crate::components::preview::PreviewWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;
use crate::fs::inspect::format_size;
use crate::fs::tree::FlatKind;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let editing = (app.focus == Focus::PathInput).then_some(&app.path_input);
    let bar_height = path_bar::height(editing, area.height / 3);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(bar_height),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_path_bar(app, frame, chunks[0]);
    render_main(app, frame, chunks[1]);
    render_status_bar(app, frame, chunks[2]);

    if app.show_help {
        frame.render_widget(HelpOverlay::new(&app.theme, app.help_scroll), area);
    }
}

fn render_path_bar(app: &App, frame: &mut Frame, area: Rect) {
    let crumbs = app.nav.breadcrumbs();
    let mut widget = PathBarWidget::new(&crumbs, &app.theme);
    if app.focus == Focus::PathInput {
        widget = widget.editing(&app.path_input);
    }
    frame.render_widget(widget, area);
}

fn panel_block(app: &App, title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        app.theme.border_focused_fg
    } else {
        app.theme.border_fg
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_main(app: &mut App, frame: &mut Frame, area: Rect) {
    let (tree_area, preview_area) = if app.preview_enabled {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);
        (panes[0], Some(panes[1]))
    } else {
        (area, None)
    };

    // Keep the selected row visible; borders take two rows.
    app.nav
        .tree
        .update_scroll(tree_area.height.saturating_sub(2) as usize);

    let tree_title = format!(" {} ", crate::fs::path::display_name(app.nav.root()));
    let tree_block = panel_block(app, tree_title, app.focus == Focus::Tree);
    frame.render_widget(
        TreeWidget::new(&app.nav.tree, &app.theme, app.use_icons).block(tree_block),
        tree_area,
    );

    if let Some(preview_area) = preview_area {
        app.preview.viewport_height = preview_area.height.saturating_sub(2) as usize;
        let title = match &app.preview.current {
            Some(p) => format!(" {} ", app.nav.paths().relative_to(&p.path, app.nav.root())),
            None => " Preview ".to_string(),
        };
        let preview_block = panel_block(app, title, app.focus == Focus::Preview);
        frame.render_widget(
            PreviewWidget::new(&app.preview, &app.theme).block(preview_block),
            preview_area,
        );
    }
}

/// Short description of the selected row for the status bar.
fn selection_info(app: &App) -> String {
    let Some(item) = app.nav.tree.selected() else {
        return String::new();
    };
    match &item.kind {
        FlatKind::Directory => format!("{} | Dir", item.name),
        FlatKind::File => match item.size {
            Some(size) => format!("{} | {}", item.name, format_size(size)),
            None => item.name.clone(),
        },
        FlatKind::Placeholder(kind) => kind.label(),
    }
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let path_str = app.nav.root().display().to_string();
    let info = selection_info(app);
    let mut widget = StatusBarWidget::new(&path_str, &info, &app.theme)
        .show_hidden(app.nav.state().show_hidden);
    if let Some((msg, _, is_error)) = &app.status_message {
        widget = widget.status_message(msg, *is_error);
    }
    frame.render_widget(widget, area);
}
