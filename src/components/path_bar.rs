use std::path::PathBuf;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::PathInputState;
use crate::theme::ThemeColors;

const SEPARATOR: &str = " › ";
const PROMPT: &str = " Path: ";

/// Rows the path bar needs: one for the breadcrumbs, or the input line
/// plus its suggestion list while editing.
pub fn height(editing: Option<&PathInputState>, max_rows: u16) -> u16 {
    match editing {
        Some(state) => (1 + state.suggestions.len() as u16).min(max_rows.max(1)),
        None => 1,
    }
}

/// Breadcrumb bar, or the inline path editor when `editing` is set.
pub struct PathBarWidget<'a> {
    crumbs: &'a [(String, PathBuf)],
    editing: Option<&'a PathInputState>,
    theme: &'a ThemeColors,
}

impl<'a> PathBarWidget<'a> {
    pub fn new(crumbs: &'a [(String, PathBuf)], theme: &'a ThemeColors) -> Self {
        Self {
            crumbs,
            editing: None,
            theme,
        }
    }

    pub fn editing(mut self, state: &'a PathInputState) -> Self {
        self.editing = Some(state);
        self
    }

    fn breadcrumb_line(&self) -> Line<'a> {
        let last = self.crumbs.len().saturating_sub(1);
        let mut spans = vec![Span::raw(" ")];
        for (i, (name, _)) in self.crumbs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(
                    SEPARATOR,
                    Style::default().fg(self.theme.dim_fg),
                ));
            }
            let style = if i == last {
                Style::default()
                    .fg(self.theme.accent_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.tree_dir_fg)
            };
            spans.push(Span::styled(name.as_str(), style));
        }
        Line::from(spans)
    }

    fn input_line(&self, state: &'a PathInputState) -> Line<'a> {
        let (before, after) = state.input.split_at(state.cursor_position);
        let mut chars = after.chars();
        let under_cursor = chars
            .next()
            .map(|c| c.to_string())
            .unwrap_or_else(|| " ".to_string());
        let rest = chars.as_str();

        let cursor_style = Style::default()
            .bg(self.theme.accent_fg)
            .fg(self.theme.status_bg);
        let input_style = Style::default().fg(self.theme.status_fg);

        let mut spans = vec![
            Span::styled(
                PROMPT,
                Style::default()
                    .fg(self.theme.accent_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(before, input_style),
            Span::styled(under_cursor, cursor_style),
            Span::styled(rest, input_style),
        ];

        if let Some((ok, msg)) = state.feedback() {
            let color = if ok {
                self.theme.success_fg
            } else {
                self.theme.error_fg
            };
            spans.push(Span::raw("  "));
            spans.push(Span::styled(msg, Style::default().fg(color)));
        }
        Line::from(spans)
    }
}

impl<'a> Widget for PathBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        buf.set_style(area, Style::default().bg(self.theme.status_bg));

        let Some(state) = self.editing else {
            let line = self.breadcrumb_line();
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        };

        let line = self.input_line(state);
        buf.set_line(area.x, area.y, &line, area.width);

        let indent = PROMPT.len() as u16;
        let suggestion_style = Style::default().fg(self.theme.dim_fg);
        for (i, suggestion) in state
            .suggestions
            .iter()
            .take(area.height.saturating_sub(1) as usize)
            .enumerate()
        {
            let y = area.y + 1 + i as u16;
            let style = if i == 0 {
                suggestion_style.fg(self.theme.info_fg)
            } else {
                suggestion_style
            };
            buf.set_line(
                area.x + indent.min(area.width),
                y,
                &Line::from(Span::styled(suggestion.as_str(), style)),
                area.width.saturating_sub(indent),
            );
        }
    }
}
