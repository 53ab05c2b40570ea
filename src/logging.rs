use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, Result};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "terminal_tree=debug";

/// Where the debug log goes: `<cache dir>/terminal-tree/debug.log`.
pub fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("terminal-tree")
        .join("debug.log")
}

/// Install a file-backed subscriber. The terminal belongs to the TUI, so
/// nothing is ever written to stdout or stderr.
pub fn init_tracing(log_path: &Path) -> Result<()> {
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = File::options().create(true).append(true).open(log_path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .map_err(|error| AppError::Terminal(format!("failed to initialise logging: {error}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_is_under_app_dir() {
        let path = log_path();
        assert!(path.ends_with("terminal-tree/debug.log"));
    }
}
