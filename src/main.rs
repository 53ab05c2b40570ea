mod app;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod logging;
mod navigation;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, ThemeConfig};
use crate::event::{Event, EventHandler};
use crate::fs::inspect::FileInspector;
use crate::fs::path::PathService;
use crate::navigation::NavigationController;
use crate::tui::{install_panic_hook, Tui};

/// Exit code when the start path is unusable or the terminal fails.
const EXIT_FAILURE: u8 = 1;

/// Browse a directory tree and preview files in the terminal.
#[derive(Parser, Debug)]
#[command(name = "terminal-tree", version, about)]
struct Cli {
    /// Directory to open (defaults to the current directory)
    #[arg(default_value = ".")]
    path: String,

    /// Write a debug log to the cache directory
    #[arg(long)]
    debug: bool,

    /// Path to a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show hidden files on startup
    #[arg(long)]
    hidden: bool,

    /// Color scheme: dark, light or custom
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,
}

impl Cli {
    /// Config values supplied on the command line.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                show_hidden: self.hidden.then_some(true),
            },
            theme: ThemeConfig {
                scheme: self.theme.clone(),
                custom: None,
            },
            ..AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.debug {
        let log_path = logging::log_path();
        if let Err(e) = logging::init_tracing(&log_path) {
            eprintln!("Warning: debug log unavailable ({}): {}", log_path.display(), e);
        }
    }

    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    let paths = PathService::new(config.max_suggestions());

    let start = paths.normalize(&cli.path);
    if let Err(e) = paths.validate(&start) {
        warn!(path = %start.display(), error = %e, "invalid start path");
        eprintln!("terminal-tree: {}: {}", cli.path, e);
        return ExitCode::from(EXIT_FAILURE);
    }

    match run(&start, paths, &config).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            if cli.debug {
                eprintln!("Error: {:?}", e);
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(start: &Path, paths: PathService, config: &AppConfig) -> error::Result<u8> {
    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(100));
    let nav = NavigationController::new(
        start,
        config.show_hidden(),
        config.max_entries(),
        paths,
        FileInspector::from_config(config),
        events.sender(),
    );
    let mut app = App::new(nav, config);
    info!(root = %start.display(), "started");

    let result = event_loop(&mut tui, &mut events, &mut app).await;
    // Restore even when the loop failed, then report the first error.
    let restored = tui.restore();
    result?;
    restored?;

    info!(exit_code = app.exit_code, "exiting");
    Ok(app.exit_code)
}

async fn event_loop(tui: &mut Tui, events: &mut EventHandler, app: &mut App) -> error::Result<()> {
    while !app.should_quit {
        tui.draw(app)?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(app, key),
            Event::Navigation(nav_event) => app.handle_nav_event(nav_event),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
        }
    }
    Ok(())
}
