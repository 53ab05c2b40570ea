use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::theme::ThemeColors;

/// A single keybinding entry for display.
struct KeyEntry {
    key: &'static str,
    description: &'static str,
}

/// A category of keybindings.
struct KeyCategory {
    name: &'static str,
    entries: &'static [KeyEntry],
}

const NAVIGATION_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "j / ↓",
        description: "Move down",
    },
    KeyEntry {
        key: "k / ↑",
        description: "Move up",
    },
    KeyEntry {
        key: "Home / End",
        description: "Jump to first / last item",
    },
    KeyEntry {
        key: "l / →",
        description: "Expand directory",
    },
    KeyEntry {
        key: "h / ←",
        description: "Collapse directory (or go to parent row)",
    },
    KeyEntry {
        key: "Enter",
        description: "Open directory / preview file",
    },
    KeyEntry {
        key: "Backspace",
        description: "Go up one directory",
    },
    KeyEntry {
        key: "1-9",
        description: "Jump to breadcrumb",
    },
    KeyEntry {
        key: ". / Ctrl+H",
        description: "Toggle hidden files",
    },
    KeyEntry {
        key: "F5 / r",
        description: "Refresh",
    },
];

const PATH_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "g",
        description: "Edit path",
    },
    KeyEntry {
        key: "Tab",
        description: "Accept first suggestion",
    },
    KeyEntry {
        key: "Enter",
        description: "Go to path",
    },
    KeyEntry {
        key: "Esc",
        description: "Cancel",
    },
];

const PREVIEW_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "j / ↓",
        description: "Scroll down",
    },
    KeyEntry {
        key: "k / ↑",
        description: "Scroll up",
    },
    KeyEntry {
        key: "PgDn / PgUp",
        description: "Page down / up",
    },
    KeyEntry {
        key: "Home / End",
        description: "Jump to top / bottom",
    },
];

const GENERAL_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "Tab / Shift+Tab",
        description: "Switch panel",
    },
    KeyEntry {
        key: "F1 / ?",
        description: "Toggle this help overlay",
    },
    KeyEntry {
        key: "q",
        description: "Quit",
    },
    KeyEntry {
        key: "Ctrl+C",
        description: "Interrupt",
    },
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Navigation (Tree Panel)",
        entries: NAVIGATION_KEYS,
    },
    KeyCategory {
        name: "Path Input",
        entries: PATH_KEYS,
    },
    KeyCategory {
        name: "Preview Panel",
        entries: PREVIEW_KEYS,
    },
    KeyCategory {
        name: "General",
        entries: GENERAL_KEYS,
    },
];

/// Help overlay widget showing all keybindings.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
    scroll_offset: usize,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors, scroll_offset: usize) -> Self {
        Self {
            theme,
            scroll_offset,
        }
    }

    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = vec![
            Line::from(Span::styled(
                " Keybinding Reference ",
                Style::default()
                    .fg(self.theme.accent_fg)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for category in CATEGORIES {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("── {} ", category.name),
                    Style::default()
                        .fg(self.theme.accent_fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("─".repeat(30), Style::default().fg(self.theme.dim_fg)),
            ]));

            for entry in category.entries {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {:<18}", entry.key),
                        Style::default()
                            .fg(self.theme.warning_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        entry.description,
                        Style::default().fg(self.theme.tree_file_fg),
                    ),
                ]));
            }

            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            " Press ?, F1 or Esc to close ",
            Style::default().fg(self.theme.dim_fg),
        )));

        lines
    }

    /// Number of content lines, for scroll bounds.
    pub fn total_lines() -> usize {
        // title + blank, a header and a blank per category, footer
        3 + CATEGORIES
            .iter()
            .map(|c| c.entries.len() + 2)
            .sum::<usize>()
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Centered: 70% width, 80% height
        let overlay_width = (area.width as f32 * 0.70).min(72.0) as u16;
        let overlay_height = (area.height as f32 * 0.80).min(40.0) as u16;
        if overlay_width < 3 || overlay_height < 3 {
            return;
        }

        let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
        let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
        let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

        Clear.render(overlay_area, buf);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.overlay_bg));

        let inner = block.inner(overlay_area);
        block.render(overlay_area, buf);

        let content_lines = self.build_content_lines();
        let visible_height = inner.height as usize;
        let scroll = self
            .scroll_offset
            .min(content_lines.len().saturating_sub(visible_height));

        for (i, line) in content_lines
            .iter()
            .skip(scroll)
            .take(visible_height)
            .enumerate()
        {
            buf.set_line(
                inner.x + 1,
                inner.y + i as u16,
                line,
                inner.width.saturating_sub(2),
            );
        }

        if content_lines.len() > visible_height {
            let total = content_lines.len();
            let indicator = format!(" {}/{} ", scroll + 1, total);
            let ind_span = Span::styled(indicator, Style::default().fg(self.theme.dim_fg));
            let ind_x = overlay_area.x
                + overlay_area
                    .width
                    .saturating_sub(ind_span.width() as u16 + 1);
            let ind_y = overlay_area.y + overlay_area.height - 1;
            buf.set_span(ind_x, ind_y, &ind_span, ind_span.width() as u16);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .flat_map(|y| (area.x..area.x + area.width).map(move |x| (x, y)))
            .map(|pos| buf.cell(pos).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn all_categories_have_entries() {
        for cat in CATEGORIES {
            assert!(
                !cat.entries.is_empty(),
                "Category '{}' has no entries",
                cat.name
            );
        }
    }

    #[test]
    fn content_lines_match_total() {
        let theme = crate::theme::dark_theme();
        let overlay = HelpOverlay::new(&theme, 0);
        assert_eq!(overlay.build_content_lines().len(), HelpOverlay::total_lines());
    }

    #[test]
    fn renders_title_and_bindings() {
        let theme = crate::theme::dark_theme();
        let area = Rect::new(0, 0, 100, 60);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&theme, 0).render(area, &mut buf);
        let text = screen(&buf);
        assert!(text.contains("Keybinding Reference"));
        assert!(text.contains("Toggle hidden files"));
    }

    #[test]
    fn tiny_area_no_panic() {
        let theme = crate::theme::dark_theme();
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&theme, 5).render(area, &mut buf);
    }
}
