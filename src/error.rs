//! Error taxonomy for identifier and state mutations

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while resolving or mutating editor artifacts
#[derive(Error, Debug)]
pub enum ResetError {
    /// Target artifact is absent when required
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// OS paths or a required environment variable cannot be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// The SQLite engine rejected an operation
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The OS denied read, write or delete access
    #[error("Permission denied: {}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A post-condition did not hold
    #[error("Anomaly: {0}")]
    Anomaly(String),

    /// Any other I/O failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A settings document could not be parsed or serialized
    #[error("Invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The safety copy could not be created or verified
    #[error("Backup of {} failed: {reason}", path.display())]
    Backup { path: PathBuf, reason: String },
}

impl ResetError {
    /// Wrap an I/O error, promoting permission failures to their own variant
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::PermissionDenied => ResetError::Permission { path, source },
            io::ErrorKind::NotFound => ResetError::NotFound(path),
            _ => ResetError::Io { path, source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResetError::NotFound(_) => ErrorKind::NotFound,
            ResetError::Config(_) => ErrorKind::Config,
            ResetError::Storage(_) => ErrorKind::Storage,
            ResetError::Permission { .. } => ErrorKind::Permission,
            ResetError::Anomaly(_) => ErrorKind::Anomaly,
            ResetError::Io { .. } => ErrorKind::Io,
            ResetError::Parse(_) => ErrorKind::Parse,
            ResetError::Backup { .. } => ErrorKind::Backup,
        }
    }
}

/// Serializable tag of a [`ResetError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Config,
    Storage,
    Permission,
    Anomaly,
    Io,
    Parse,
    Backup,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::Config => "configuration",
            Self::Storage => "storage",
            Self::Permission => "permission",
            Self::Anomaly => "anomaly",
            Self::Io => "io",
            Self::Parse => "parse",
            Self::Backup => "backup",
        };
        write!(f, "{}", name)
    }
}
