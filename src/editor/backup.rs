//! Backup-then-mutate guard
//!
//! Every destructive write to an editor artifact `X` is preceded by a copy to
//! `X.backup`. The copy is overwritten on each run and never deleted here.

use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::error::ResetError;

/// A safety copy taken before a mutation
#[derive(Debug, Clone)]
pub struct BackupRecord {
    pub original: PathBuf,
    pub backup: PathBuf,
    pub created_at: DateTime<Local>,
}

impl BackupRecord {
    /// Copy the backup back over the original
    pub fn restore(&self) -> Result<(), ResetError> {
        fs::copy(&self.backup, &self.original)
            .map_err(|e| ResetError::io(&self.original, e))?;
        info!(
            original = %self.original.display(),
            backup = %self.backup.display(),
            "restored from backup"
        );
        Ok(())
    }
}

/// Failure reported by an action run under [`with_backup`]
#[derive(Debug)]
pub enum ActionError {
    /// Failed before touching the original; nothing to restore
    Untouched(ResetError),
    /// Failed during or after a destructive write; the original must be restored
    Corrupting(ResetError),
}

/// Failure of a guarded mutation
#[derive(Debug)]
pub struct GuardFailure {
    pub error: ResetError,
    /// `None` when the failure happened before the backup existed
    pub backup: Option<BackupRecord>,
    /// True when the original was successfully restored from the backup
    pub restored: bool,
}

impl GuardFailure {
    fn before_backup(error: ResetError) -> Self {
        Self {
            error,
            backup: None,
            restored: false,
        }
    }

    pub fn backup_path(&self) -> Option<PathBuf> {
        self.backup.as_ref().map(|b| b.backup.clone())
    }
}

/// `path` with `.backup` appended to the full file name
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

/// Copy `path` to `path.backup` and verify the copy
pub fn create_backup(path: &Path) -> Result<BackupRecord, ResetError> {
    let original_len = fs::metadata(path)
        .map_err(|e| ResetError::io(path, e))?
        .len();

    let backup = backup_path_for(path);
    fs::copy(path, &backup).map_err(|e| ResetError::Backup {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let backup_len = fs::metadata(&backup)
        .map_err(|e| ResetError::Backup {
            path: path.to_path_buf(),
            reason: format!("backup missing after copy: {}", e),
        })?
        .len();

    if original_len > 0 && backup_len == 0 {
        return Err(ResetError::Backup {
            path: path.to_path_buf(),
            reason: "backup is empty but the original is not".to_string(),
        });
    }

    debug!(original = %path.display(), backup = %backup.display(), bytes = backup_len, "backup created");

    Ok(BackupRecord {
        original: path.to_path_buf(),
        backup,
        created_at: Local::now(),
    })
}

/// Run `action` on `path` after taking a verified backup
///
/// The action is never invoked if `path` does not exist or the backup fails.
/// An [`ActionError::Corrupting`] failure restores the original from the
/// backup before returning. The backup is left on disk on every path.
pub fn with_backup<T, F>(path: &Path, action: F) -> Result<(T, BackupRecord), GuardFailure>
where
    F: FnOnce() -> Result<T, ActionError>,
{
    if !path.exists() {
        return Err(GuardFailure::before_backup(ResetError::NotFound(
            path.to_path_buf(),
        )));
    }

    let record = create_backup(path).map_err(GuardFailure::before_backup)?;

    match action() {
        Ok(value) => Ok((value, record)),
        Err(ActionError::Untouched(error)) => Err(GuardFailure {
            error,
            backup: Some(record),
            restored: false,
        }),
        Err(ActionError::Corrupting(error)) => {
            error!(path = %path.display(), %error, "mutation failed, restoring backup");
            let restored = match record.restore() {
                Ok(()) => true,
                Err(restore_err) => {
                    error!(
                        path = %path.display(),
                        backup = %record.backup.display(),
                        error = %restore_err,
                        "restore failed; original may be inconsistent"
                    );
                    false
                }
            };
            Err(GuardFailure {
                error,
                backup: Some(record),
                restored,
            })
        }
    }
}
