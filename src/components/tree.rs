use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::inspect::format_size_compact;
use crate::fs::tree::{FlatItem, FlatKind, PlaceholderKind, TreeModel};
use crate::theme::ThemeColors;

/// Tree widget that renders the file tree with box-drawing characters.
pub struct TreeWidget<'a> {
    tree: &'a TreeModel,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree: &'a TreeModel, theme: &'a ThemeColors, use_icons: bool) -> Self {
        Self {
            tree,
            theme,
            use_icons,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    /// Build the prefix string for tree indentation using box-drawing characters.
    ///
    /// We need to know the ancestor chain to draw continuation lines correctly.
    fn build_prefix(item: &FlatItem, items: &[FlatItem], item_index: usize) -> String {
        if item.depth == 0 {
            return String::new();
        }

        let mut parts: Vec<&str> = Vec::new();

        // For each ancestor level, a continuation bar unless that ancestor was the last sibling.
        for d in 1..item.depth {
            let mut ancestor_is_last = false;
            for j in (0..item_index).rev() {
                if items[j].depth == d {
                    ancestor_is_last = items[j].is_last_sibling;
                    break;
                }
                if items[j].depth < d {
                    break;
                }
            }
            parts.push(if ancestor_is_last { "   " } else { "│  " });
        }

        parts.push(if item.is_last_sibling { "└──" } else { "├──" });
        parts.join("")
    }

    /// Get the directory/file indicator.
    fn item_indicator(&self, item: &FlatItem) -> &'static str {
        match (&item.kind, self.use_icons) {
            (FlatKind::Directory, true) if item.is_expanded => " ",
            (FlatKind::Directory, true) => " ",
            (FlatKind::File, true) => Self::file_icon_by_ext(&item.name),
            (FlatKind::Directory, false) if item.is_expanded => "▾ ",
            (FlatKind::Directory, false) => "▸ ",
            (FlatKind::File, false) => "  ",
            (FlatKind::Placeholder(_), _) => "",
        }
    }

    /// Get a Nerd Font icon for a file based on its extension.
    fn file_icon_by_ext(name: &str) -> &'static str {
        let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
        match ext.as_str() {
            "rs" => " ",
            "py" => " ",
            "js" | "jsx" => " ",
            "ts" | "tsx" => " ",
            "html" | "htm" => " ",
            "css" => " ",
            "json" => " ",
            "toml" | "yaml" | "yml" | "ini" | "cfg" => " ",
            "md" | "txt" => " ",
            "sh" | "bash" | "zsh" | "fish" => " ",
            "go" => " ",
            "c" | "h" | "cpp" | "hpp" => " ",
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" => " ",
            "zip" | "tar" | "gz" => " ",
            "pdf" => " ",
            _ => " ",
        }
    }

    /// Displayed label: name, plus a compact size for files.
    fn label(item: &FlatItem) -> String {
        match (&item.kind, item.size) {
            (FlatKind::File, Some(size)) => {
                format!("{} ({})", item.name, format_size_compact(size))
            }
            _ => item.name.clone(),
        }
    }

    fn item_style(&self, item: &FlatItem) -> Style {
        match &item.kind {
            FlatKind::Placeholder(PlaceholderKind::Error(_)) => {
                Style::default().fg(self.theme.error_fg)
            }
            FlatKind::Placeholder(_) => Style::default()
                .fg(self.theme.tree_placeholder_fg)
                .add_modifier(Modifier::ITALIC),
            _ if item.is_hidden => Style::default().fg(self.theme.tree_hidden_fg),
            FlatKind::Directory => Style::default()
                .fg(self.theme.tree_dir_fg)
                .add_modifier(Modifier::BOLD),
            FlatKind::File => Style::default().fg(self.theme.tree_file_fg),
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let items = &self.tree.flat_items;
        let selected = self.tree.selected_index;
        let visible_height = inner_area.height as usize;

        if items.is_empty() || visible_height == 0 {
            return;
        }

        let visible_items = items
            .iter()
            .enumerate()
            .skip(self.tree.scroll_offset)
            .take(visible_height);

        for (i, (idx, item)) in visible_items.enumerate() {
            let y = inner_area.y + i as u16;

            let style = if idx == selected {
                Style::default()
                    .bg(self.theme.tree_selected_bg)
                    .fg(self.theme.tree_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                self.item_style(item)
            };

            let line_content = format!(
                "{}{}{}",
                Self::build_prefix(item, items, idx),
                self.item_indicator(item),
                Self::label(item)
            );
            let line = Line::from(Span::styled(line_content, style));
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
