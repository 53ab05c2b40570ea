use std::io;

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from filesystem or terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] ValidationError),
}

/// Why a path cannot be browsed as a directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Path does not exist")]
    NotFound,

    #[error("Path is not a directory")]
    NotADirectory,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Cannot access directory: {0}")]
    OsError(String),
}

impl From<io::Error> for ValidationError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ValidationError::NotFound,
            io::ErrorKind::PermissionDenied => ValidationError::PermissionDenied,
            _ => ValidationError::OsError(err.to_string()),
        }
    }
}

/// Failure to produce preview text for a file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The file could not be read at all.
    #[error("Error reading file: {0}")]
    Io(#[from] io::Error),

    /// Every configured encoding rejected the content.
    #[error("Unable to decode file content")]
    Undecodable,
}

/// Why a config file was not applied.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Read(#[from] io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn terminal_error_display() {
        let err = AppError::Terminal("failed to enter raw mode".into());
        assert_eq!(err.to_string(), "Terminal error: failed to enter raw mode");
    }

    #[test]
    fn invalid_path_error_display() {
        let err: AppError = ValidationError::NotADirectory.into();
        assert_eq!(err.to_string(), "Invalid path: Path is not a directory");
    }

    #[test]
    fn validation_error_from_io_kind() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(ValidationError::from(not_found), ValidationError::NotFound);

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(
            ValidationError::from(denied),
            ValidationError::PermissionDenied
        );

        let other = io::Error::new(io::ErrorKind::Other, "disk on fire");
        assert!(matches!(
            ValidationError::from(other),
            ValidationError::OsError(msg) if msg.contains("disk on fire")
        ));
    }

    #[test]
    fn read_error_display() {
        assert_eq!(
            ReadError::Undecodable.to_string(),
            "Unable to decode file content"
        );
    }
}
