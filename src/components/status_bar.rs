use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const KEY_HINTS: &str = " g:path  .:hidden  F5:refresh  ?:help  q:quit ";

/// Keep the last `max` characters of `s`, marking the cut with `...`.
fn truncate_left(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().skip(len - max).collect();
    }
    let tail: String = s.chars().skip(len - (max - 3)).collect();
    format!("...{}", tail)
}

fn truncate_right(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Status bar widget that displays the root, selection info, key hints, or status messages.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    item_info: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
    show_hidden: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, item_info: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            item_info,
            theme,
            status_message: None,
            is_error: false,
            show_hidden: false,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    pub fn show_hidden(mut self, shown: bool) -> Self {
        self.show_hidden = shown;
        self
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;
        buf.set_style(
            area,
            Style::default().bg(self.theme.status_bg).fg(self.theme.status_fg),
        );

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_fg)
            } else {
                Style::default().fg(self.theme.success_fg)
            };

            let display = format!("{:<width$}", truncate_right(msg, width), width = width);
            let line = Line::from(Span::styled(display, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        // Normal bar: [path] [hidden flag] [item info] [key hints]
        let hints_len = KEY_HINTS.chars().count();
        let hidden_flag = if self.show_hidden { " [hidden] " } else { "" };
        let remaining = width
            .saturating_sub(hints_len)
            .saturating_sub(hidden_flag.chars().count());

        let info_len = self.item_info.chars().count();
        let path_budget = remaining.saturating_sub(info_len).saturating_sub(1);
        let path_display = truncate_left(self.path_str, path_budget);
        let path_len = path_display.chars().count();

        let info_display = truncate_right(self.item_info, remaining.saturating_sub(path_len));
        let gap = remaining
            .saturating_sub(path_len)
            .saturating_sub(info_display.chars().count());

        let path_style = Style::default().fg(self.theme.status_fg);
        let info_style = Style::default().fg(self.theme.info_fg);
        let hints_style = Style::default()
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::DIM);

        let mut spans = vec![
            Span::styled(path_display, path_style),
            Span::raw(" ".repeat(gap)),
            Span::styled(info_display, info_style),
        ];
        if !hidden_flag.is_empty() {
            spans.push(Span::styled(
                hidden_flag,
                Style::default()
                    .fg(self.theme.warning_fg)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        if width >= hints_len {
            spans.push(Span::styled(KEY_HINTS, hints_style));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;

    fn content(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn status_message_success() {
        let tc = theme::dark_theme();
        let widget = StatusBarWidget::new("/path", "info", &tc).status_message("Refreshed", false);

        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        assert!(content(&buf, 80).contains("Refreshed"));
        assert_eq!(buf.cell((0, 0)).unwrap().fg, tc.success_fg);
    }

    #[test]
    fn status_message_error() {
        let tc = theme::dark_theme();
        let widget =
            StatusBarWidget::new("/path", "info", &tc).status_message("Permission denied", true);

        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        assert!(content(&buf, 80).contains("Permission denied"));
        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.bg, tc.error_fg);
        assert_eq!(cell.fg, tc.status_fg);
    }

    #[test]
    fn long_multibyte_message_is_cut_on_char_boundary() {
        let tc = theme::dark_theme();
        let msg = "é".repeat(50);
        let widget = StatusBarWidget::new("/path", "info", &tc).status_message(&msg, false);
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        assert_eq!(content(&buf, 10), "é".repeat(10));
    }

    #[test]
    fn normal_bar_rendering() {
        let tc = theme::dark_theme();
        let widget = StatusBarWidget::new("/home/user/project", "notes.md | 1.2 KB", &tc)
            .show_hidden(true);

        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let text = content(&buf, 100);
        assert!(text.contains("/home/user/project"));
        assert!(text.contains("notes.md | 1.2 KB"));
        assert!(text.contains("[hidden]"));
        assert!(text.contains("q:quit"));
    }

    #[test]
    fn long_path_keeps_its_tail() {
        assert_eq!(truncate_left("/a/b/c/d/e/f", 8), "...d/e/f");
        assert_eq!(truncate_left("/a/b", 8), "/a/b");
        assert_eq!(truncate_left("/abcdef", 2), "ef");
    }

    #[test]
    fn zero_area_does_not_panic() {
        let tc = theme::dark_theme();
        let widget = StatusBarWidget::new("/path", "info", &tc);
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
    }
}
