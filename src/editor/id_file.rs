//! Plain-text identifier files
//!
//! The legacy `machineid` file and JetBrains' `PermanentDeviceId` /
//! `PermanentUserId` each hold a single identifier as their whole content.

use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::backup::{with_backup, ActionError};
use super::identifiers::IdFormat;
use super::lock::{try_clear_read_only, try_set_read_only};
use crate::config::{ArtifactKind, ResolvedPaths};
use crate::error::ResetError;
use crate::report::{IdChange, IdFileData, JetBrainsIdsData, OperationResult, Status};

/// Replace the identifier stored in `path` with a fresh value of `format`
///
/// A missing file is created. With `lock`, the file is marked read-only
/// afterwards; failing to do so is logged but does not fail the operation.
pub fn rewrite_id_file(path: &Path, format: IdFormat, lock: bool) -> OperationResult<IdFileData> {
    let mut data = IdFileData {
        path: path.to_path_buf(),
        ..Default::default()
    };
    let new = format.generate();

    if path.exists() {
        try_clear_read_only(path);

        let written = with_backup(path, || {
            let old = read_id(path).map_err(ActionError::Untouched)?;
            fs::write(path, &new).map_err(|e| ActionError::Corrupting(ResetError::io(path, e)))?;
            Ok(old)
        });

        match written {
            Ok((old, record)) => {
                data.backup_path = Some(record.backup);
                data.change = IdChange { old, new };
            }
            Err(failure) => {
                data.backup_path = failure.backup_path();
                return OperationResult::failed(
                    data,
                    format!("Could not rewrite {}", path.display()),
                    &failure.error,
                );
            }
        }
    } else {
        if let Err(err) = create_id_file(path, &new) {
            return OperationResult::failed(
                data,
                format!("Could not create {}", path.display()),
                &err,
            );
        }
        data.created = true;
        data.change = IdChange {
            old: String::new(),
            new,
        };
    }

    if lock {
        data.read_only = try_set_read_only(path);
        if !data.read_only {
            warn!(path = %path.display(), "identifier rewritten but not locked");
        }
    }

    info!(path = %path.display(), created = data.created, locked = data.read_only, "identifier file rewritten");
    OperationResult::success(data, format!("Rewrote {}", path.display()))
}

/// Rewrite both JetBrains permanent-id files found in `paths`
pub fn rewrite_jetbrains_ids(paths: &ResolvedPaths, lock: bool) -> OperationResult<JetBrainsIdsData> {
    let mut data = JetBrainsIdsData {
        config_dir: paths.base.clone(),
        ..Default::default()
    };

    let (device_path, user_path) = match (
        paths.require(ArtifactKind::PermanentDeviceIdFile),
        paths.require(ArtifactKind::PermanentUserIdFile),
    ) {
        (Ok(d), Ok(u)) => (d, u),
        (Err(err), _) | (_, Err(err)) => {
            return OperationResult::failed(data, "Not a JetBrains configuration", &err)
        }
    };

    let device = rewrite_id_file(device_path, IdFormat::JetBrainsUuid, lock);
    let user = rewrite_id_file(user_path, IdFormat::JetBrainsUuid, lock);

    let first_error = [&device, &user]
        .iter()
        .find(|r| r.status == Status::Failed)
        .and_then(|r| r.error.clone());
    data.device_id = device.data;
    data.user_id = user.data;

    match first_error {
        None => OperationResult::success(data, "JetBrains permanent IDs rewritten"),
        Some(detail) => OperationResult {
            status: Status::Failed,
            data,
            message: "Some JetBrains ID files could not be rewritten".to_string(),
            error: Some(detail),
        },
    }
}

/// Trimmed content of an id file; empty when it does not exist
pub fn read_id(path: &Path) -> Result<String, ResetError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(s.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(ResetError::io(path, e)),
    }
}

fn create_id_file(path: &Path, value: &str) -> Result<(), ResetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ResetError::io(parent, e))?;
    }
    fs::write(path, value).map_err(|e| ResetError::io(path, e))
}
