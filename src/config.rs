//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--hidden`, `--theme`)
//! 2. `$TERMINAL_TREE_CONFIG` environment variable (path to config file)
//! 3. Project-local `.terminal-tree.toml` in the current working directory
//! 4. Global `~/.config/terminal-tree/config.toml`
//! 5. Built-in defaults

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Show hidden files on startup.
    pub show_hidden: Option<bool>,
}

/// Tree panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Maximum number of entries listed per directory level.
    pub max_entries: Option<usize>,
    /// Use nerd font icons (false = ASCII markers).
    pub use_icons: Option<bool>,
}

/// Preview panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    /// Whether the preview panel is shown.
    pub enabled: Option<bool>,
    /// Files larger than this are never previewed as text.
    pub max_text_bytes: Option<u64>,
    /// Maximum number of lines read into the preview.
    pub max_lines: Option<usize>,
    /// Syntax highlighting theme (syntect theme name).
    pub syntax_theme: Option<String>,
    /// Show line numbers next to previewed text.
    pub line_numbers: Option<bool>,
    /// Ordered list of encodings tried when decoding a file.
    pub encodings: Option<Vec<String>>,
}

/// Path input settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PathConfig {
    /// Maximum number of autocomplete suggestions.
    pub max_suggestions: Option<usize>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub tree_selected_bg: Option<String>,
    pub tree_selected_fg: Option<String>,
    pub tree_dir_fg: Option<String>,
    pub tree_file_fg: Option<String>,
    pub tree_hidden_fg: Option<String>,
    pub preview_line_nr_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub border_focused_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

impl ThemeConfig {
    /// Theme scheme: "dark", "light", or "custom".
    pub fn scheme_name(&self) -> &str {
        self.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tree: TreeConfig,
    pub preview: PreviewConfig,
    pub path: PathConfig,
    pub theme: ThemeConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default upper bound for text previews (1 MiB).
pub const DEFAULT_MAX_TEXT_BYTES: u64 = 1_048_576;
/// Default preview line limit.
pub const DEFAULT_MAX_LINES: usize = 1000;
/// Default per-directory entry cap.
pub const DEFAULT_MAX_ENTRIES: usize = 50;
/// Default autocomplete suggestion cap.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 20;
/// Default syntect theme.
pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";
/// Default decoding chain.
pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8", "utf-16", "latin-1", "windows-1252"];

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; `load` handles that separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("TERMINAL_TREE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".terminal-tree.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("terminal-tree").join("config.toml"));
    }

    paths
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Read and parse a TOML config file, warning on stderr when it cannot be used.
///
/// A missing file is only reported when it was `required`, i.e. named on the
/// command line; the implicit candidates are allowed to be absent.
fn load_file(path: &Path, required: bool) -> Option<AppConfig> {
    match read_config(path) {
        Ok(cfg) => Some(cfg),
        Err(ConfigError::Read(e)) if !required && e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring config file");
            eprintln!("Warning: {}: {}", path.display(), e);
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                show_hidden: other.general.show_hidden.or(self.general.show_hidden),
            },
            tree: TreeConfig {
                max_entries: other.tree.max_entries.or(self.tree.max_entries),
                use_icons: other.tree.use_icons.or(self.tree.use_icons),
            },
            preview: PreviewConfig {
                enabled: other.preview.enabled.or(self.preview.enabled),
                max_text_bytes: other.preview.max_text_bytes.or(self.preview.max_text_bytes),
                max_lines: other.preview.max_lines.or(self.preview.max_lines),
                syntax_theme: other
                    .preview
                    .syntax_theme
                    .clone()
                    .or(self.preview.syntax_theme),
                line_numbers: other.preview.line_numbers.or(self.preview.line_numbers),
                encodings: other.preview.encodings.clone().or(self.preview.encodings),
            },
            path: PathConfig {
                max_suggestions: other.path.max_suggestions.or(self.path.max_suggestions),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: other.theme.custom.clone().or(self.theme.custom),
            },
        }
    }

    /// Load the fully-resolved configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path, false) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path, true) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Whether to show hidden files on startup.
    pub fn show_hidden(&self) -> bool {
        self.general.show_hidden.unwrap_or(false)
    }

    /// Per-directory entry cap (never zero).
    pub fn max_entries(&self) -> usize {
        self.tree.max_entries.unwrap_or(DEFAULT_MAX_ENTRIES).max(1)
    }

    /// Whether to use nerd font icons.
    pub fn use_icons(&self) -> bool {
        self.tree.use_icons.unwrap_or(false)
    }

    /// Whether the preview panel is shown.
    pub fn preview_enabled(&self) -> bool {
        self.preview.enabled.unwrap_or(true)
    }

    /// Size limit for text previews.
    pub fn max_text_bytes(&self) -> u64 {
        self.preview.max_text_bytes.unwrap_or(DEFAULT_MAX_TEXT_BYTES)
    }

    /// Preview line limit.
    pub fn max_lines(&self) -> usize {
        self.preview.max_lines.unwrap_or(DEFAULT_MAX_LINES).max(1)
    }

    /// Syntax highlighting theme name.
    pub fn syntax_theme_name(&self) -> &str {
        self.preview
            .syntax_theme
            .as_deref()
            .unwrap_or(DEFAULT_SYNTAX_THEME)
    }

    /// Whether previews carry a line-number gutter.
    pub fn line_numbers(&self) -> bool {
        self.preview.line_numbers.unwrap_or(true)
    }

    /// Encoding names in the order they should be tried.
    pub fn encodings(&self) -> Vec<String> {
        match &self.preview.encodings {
            Some(list) => list.clone(),
            None => DEFAULT_ENCODINGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Autocomplete suggestion cap.
    pub fn max_suggestions(&self) -> usize {
        self.path.max_suggestions.unwrap_or(DEFAULT_MAX_SUGGESTIONS)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
