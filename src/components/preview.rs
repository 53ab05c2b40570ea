use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::app::PreviewState;
use crate::config::DEFAULT_SYNTAX_THEME;
use crate::fs::inspect::{Preview, PreviewBody};
use crate::theme::ThemeColors;

/// Syntax highlighting with syntect's bundled syntaxes and themes.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    line_numbers: bool,
}

impl Highlighter {
    /// Load the named theme, falling back to the default one.
    pub fn new(theme_name: &str, line_numbers: bool) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes
            .remove(theme_name)
            .or_else(|| themes.remove(DEFAULT_SYNTAX_THEME))
            .unwrap_or_default();
        Self {
            syntax_set: SyntaxSet::load_defaults_nonewlines(),
            theme,
            line_numbers,
        }
    }

    /// Highlight `text` as `language`, one ratatui line per input line.
    ///
    /// Falls back to the file extension, then to plain text, when syntect
    /// has no syntax by that name.
    pub fn highlight(
        &self,
        text: &str,
        language: &str,
        path: &Path,
        gutter: Style,
    ) -> Vec<Line<'static>> {
        let ss = &self.syntax_set;
        let syntax = ss
            .find_syntax_by_name(language)
            .or_else(|| ss.find_syntax_by_extension(path.extension()?.to_str()?))
            .unwrap_or_else(|| ss.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let lines: Vec<&str> = text.lines().collect();
        let width = lines.len().max(1).to_string().len();

        lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let mut spans: Vec<Span<'static>> = Vec::new();
                if self.line_numbers {
                    spans.push(Span::styled(
                        format!("{:>width$} │ ", i + 1, width = width),
                        gutter,
                    ));
                }
                match highlighter.highlight_line(line, ss) {
                    Ok(ranges) => {
                        for (style, piece) in ranges {
                            let fg = style.foreground;
                            spans.push(Span::styled(
                                piece.to_string(),
                                Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                            ));
                        }
                    }
                    Err(_) => spans.push(Span::raw(line.to_string())),
                }
                Line::from(spans)
            })
            .collect()
    }
}

/// Build the full set of preview lines: metadata header, then the body.
pub fn preview_lines(
    preview: &Preview,
    highlighter: &Highlighter,
    theme: &ThemeColors,
) -> Vec<Line<'static>> {
    let label = Style::default()
        .fg(theme.preview_header_fg)
        .add_modifier(Modifier::BOLD);
    let value = Style::default().fg(theme.tree_file_fg);
    let dim = Style::default().fg(theme.dim_fg);

    let name = preview
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| preview.path.to_string_lossy().to_string());
    let meta = &preview.metadata;

    let kind = match &preview.body {
        PreviewBody::Text { content, language } => format!(
            "{} ({}, {})",
            meta.kind.label(),
            content.encoding.label(),
            language
        ),
        _ => meta.kind.label().to_string(),
    };

    let field = |key: &'static str, val: String| {
        Line::from(vec![Span::styled(key, label), Span::styled(val, value)])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            name,
            Style::default()
                .fg(theme.accent_fg)
                .add_modifier(Modifier::BOLD),
        )),
        field("Path: ", preview.path.to_string_lossy().to_string()),
        field("Size: ", meta.size_label()),
        field("Modified: ", meta.modified_label()),
        field("Permissions: ", meta.permissions_label().to_string()),
        field("Kind: ", kind),
        Line::from(Span::styled("─".repeat(40), dim)),
    ];

    match &preview.body {
        PreviewBody::Text { content, language } => {
            // The truncation marker is not part of the file, so keep it out of highlighting.
            let (body, marker) = if content.truncated {
                match content.text.rsplit_once('\n') {
                    Some((body, marker)) => (body, Some(marker)),
                    None => (content.text.as_str(), None),
                }
            } else {
                (content.text.as_str(), None)
            };
            if body.is_empty() {
                lines.push(Line::from(Span::styled("(empty file)", dim)));
            } else {
                let gutter = Style::default().fg(theme.preview_line_nr_fg);
                lines.extend(highlighter.highlight(body, language, &preview.path, gutter));
            }
            if let Some(marker) = marker {
                lines.push(Line::from(Span::styled(
                    marker.to_string(),
                    dim.add_modifier(Modifier::ITALIC),
                )));
            }
        }
        PreviewBody::Binary { media_type } => {
            lines.push(Line::from(Span::styled(
                "Binary file - preview not available",
                Style::default().fg(theme.warning_fg),
            )));
            if let Some(media) = media_type {
                lines.push(field("Type: ", media.to_string()));
            }
        }
        PreviewBody::Directory => {
            lines.push(Line::from(Span::styled(
                "Directory",
                Style::default().fg(theme.info_fg),
            )));
        }
        PreviewBody::Unreadable(msg) => {
            lines.push(Line::from(Span::styled(
                msg.clone(),
                Style::default().fg(theme.error_fg),
            )));
        }
        PreviewBody::Inaccessible => {
            lines.push(Line::from(Span::styled(
                "Cannot access file",
                Style::default().fg(theme.error_fg),
            )));
        }
    }

    lines
}

const WELCOME_KEYS: &[(&str, &str)] = &[
    ("↑/↓  j/k", "Move"),
    ("→  l", "Expand directory"),
    ("←  h", "Collapse directory"),
    ("Enter", "Open directory / preview file"),
    ("Backspace", "Go up one directory"),
    ("g", "Edit path"),
    ("Ctrl+H  .", "Toggle hidden files"),
    ("F5  r", "Refresh"),
    ("Tab", "Switch panel"),
    ("F1  ?", "Help"),
    ("q", "Quit"),
];

fn welcome_lines(theme: &ThemeColors) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Terminal Tree",
            Style::default()
                .fg(theme.accent_fg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Select a file to preview it.",
            Style::default().fg(theme.dim_fg),
        )),
        Line::from(""),
    ];
    for (key, description) in WELCOME_KEYS {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<12}", key),
                Style::default()
                    .fg(theme.warning_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(description.to_string(), Style::default().fg(theme.tree_file_fg)),
        ]));
    }
    lines
}

/// Preview widget that renders file content in the preview panel.
pub struct PreviewWidget<'a> {
    preview_state: &'a PreviewState,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(preview_state: &'a PreviewState, theme: &'a ThemeColors) -> Self {
        Self {
            preview_state,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }
}

impl<'a> Widget for PreviewWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.preview_state.current.is_none() {
            for (i, line) in welcome_lines(self.theme)
                .iter()
                .take(inner.height as usize)
                .enumerate()
            {
                buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
            }
            return;
        }

        let lines = &self.preview_state.lines;
        let start = self.preview_state.scroll_offset.min(lines.len());
        let end = (start + inner.height as usize).min(lines.len());
        for (i, line) in lines[start..end].iter().enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::inspect::FileInspector;
    use crate::theme;
    use ratatui::widgets::Borders;
    use std::fs;
    use tempfile::TempDir;

    fn row(buf: &Buffer, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn empty_state_shows_welcome() {
        let state = PreviewState::default();
        let tc = theme::dark_theme();
        let widget = PreviewWidget::new(&state, &tc)
            .block(Block::default().borders(Borders::ALL).title(" Preview "));
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        assert!(row(&buf, 1, 40).contains("Terminal Tree"));
    }

    #[test]
    fn renders_lines_from_scroll_offset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "x").unwrap();
        let mut state = PreviewState {
            current: Some(FileInspector::default().preview(&path)),
            lines: vec![Line::from("line 1"), Line::from("line 2"), Line::from("line 3")],
            ..Default::default()
        };
        state.scroll_offset = 1;
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&state, &tc).render(area, &mut buf);
        assert!(row(&buf, 0, 20).contains("line 2"));
    }

    #[test]
    fn highlight_adds_line_number_gutter() {
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME, true);
        let lines = hl.highlight(
            "fn main() {\n}\n",
            "Rust",
            Path::new("main.rs"),
            Style::default(),
        );
        assert_eq!(lines.len(), 2);
        assert!(text_of(&lines[0]).starts_with("1 │ fn main()"));
    }

    #[test]
    fn highlight_without_gutter_and_unknown_language() {
        let hl = Highlighter::new("no-such-theme", false);
        let lines = hl.highlight("plain", "Klingon", Path::new("x.unknown"), Style::default());
        assert_eq!(text_of(&lines[0]), "plain");
    }

    #[test]
    fn text_preview_has_header_and_dim_marker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.txt");
        let content: String = (1..=5).map(|i| format!("{i}\n")).collect();
        fs::write(&path, content).unwrap();

        let inspector = FileInspector::new(1024, 3, vec![crate::fs::inspect::TextEncoding::Utf8]);
        let preview = inspector.preview(&path);
        let tc = theme::dark_theme();
        let lines = preview_lines(&preview, &Highlighter::new(DEFAULT_SYNTAX_THEME, true), &tc);

        assert_eq!(text_of(&lines[0]), "long.txt");
        assert!(text_of(&lines[2]).starts_with("Size: 10 B"));
        assert_eq!(text_of(&lines[5]), "Kind: file (UTF-8, Plain Text)");
        // 7 header lines, 3 content lines, 1 marker.
        assert_eq!(lines.len(), 11);
        assert_eq!(text_of(&lines[10]), "... (truncated after 3 lines)");
    }

    #[test]
    fn binary_preview_message() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("img.png");
        fs::write(&path, [0u8, 1, 2, 3]).unwrap();
        let preview = FileInspector::default().preview(&path);
        let tc = theme::dark_theme();
        let lines = preview_lines(&preview, &Highlighter::new(DEFAULT_SYNTAX_THEME, true), &tc);
        let all: Vec<String> = lines.iter().map(text_of).collect();
        assert!(all.contains(&"Binary file - preview not available".to_string()));
        assert!(all.contains(&"Type: image/png".to_string()));
    }

    #[test]
    fn empty_file_placeholder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();
        let preview = FileInspector::default().preview(&path);
        let tc = theme::dark_theme();
        let lines = preview_lines(&preview, &Highlighter::new(DEFAULT_SYNTAX_THEME, true), &tc);
        assert_eq!(text_of(lines.last().unwrap()), "(empty file)");
    }

    #[test]
    fn zero_area_no_panic() {
        let state = PreviewState::default();
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(&state, &tc).render(area, &mut buf);
    }
}
