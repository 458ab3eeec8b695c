//! Workspace storage operations
//!
//! Editors cache per-project state in <User>/workspaceStorage/<hash>/.
//! Purging the tree removes every immediate child of the directory.

use chrono::Local;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tar::Builder;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::ResetError;
use crate::report::{OperationResult, TreeCleanData};

const CLOSE_EDITOR_HINT: &str = "Permission denied. Close the editor and try again";

/// Remove every entry inside `workspace_dir`
///
/// An absent directory is not an error: nothing is deleted.
pub fn clean(workspace_dir: &Path) -> OperationResult<TreeCleanData> {
    let data = TreeCleanData {
        dir: workspace_dir.to_path_buf(),
        ..Default::default()
    };

    if !workspace_dir.exists() {
        return OperationResult::success(data, "No workspace storage directory found");
    }

    purge_tree(workspace_dir, data, "workspace storage")
}

/// Archive `workspace_dir` to a timestamped tar.gz beside it, then clean it
pub fn clean_with_archive(workspace_dir: &Path) -> OperationResult<TreeCleanData> {
    let mut data = TreeCleanData {
        dir: workspace_dir.to_path_buf(),
        ..Default::default()
    };

    if !workspace_dir.exists() {
        return OperationResult::success(data, "No workspace storage directory found");
    }

    match archive_dir(workspace_dir) {
        Ok(archive) => {
            info!(archive = %archive.display(), "workspace storage archived");
            data.archive_path = Some(archive);
        }
        Err(err) => {
            return OperationResult::failed(data, "Could not archive workspace storage", &err)
        }
    }

    purge_tree(workspace_dir, data, "workspace storage")
}

/// Remove every installed extension under `extensions_dir`
///
/// Unlike workspace storage, a missing extensions directory is a failure.
pub fn clean_extensions(extensions_dir: &Path) -> OperationResult<TreeCleanData> {
    let data = TreeCleanData {
        dir: extensions_dir.to_path_buf(),
        ..Default::default()
    };

    if !extensions_dir.is_dir() {
        let err = ResetError::NotFound(extensions_dir.to_path_buf());
        return OperationResult::failed(
            data,
            format!("Extensions directory not found: {}", extensions_dir.display()),
            &err,
        );
    }

    purge_tree(extensions_dir, data, "extensions")
}

fn purge_tree(dir: &Path, mut data: TreeCleanData, what: &str) -> OperationResult<TreeCleanData> {
    let removed = remove_children(dir, &mut data);
    tree_result(dir, data, what, removed)
}

/// Turn the outcome of [`remove_children`] into a result; a permission
/// failure tells the user to close the editor
fn tree_result(
    dir: &Path,
    data: TreeCleanData,
    what: &str,
    removed: Result<(), ResetError>,
) -> OperationResult<TreeCleanData> {
    match removed {
        Ok(()) => {
            info!(dir = %dir.display(), entries = data.deleted_count, files = data.files_removed, "{} cleaned", what);
            let message = format!("Deleted {} {} entries", data.deleted_count, what);
            OperationResult::success(data, message)
        }
        Err(err @ ResetError::Permission { .. }) => OperationResult::failed(data, CLOSE_EDITOR_HINT, &err),
        Err(err) => OperationResult::failed(data, format!("Failed to clean {}", what), &err),
    }
}

/// Delete each immediate child, counting as we go so a failure still
/// reports what was already removed
fn remove_children(dir: &Path, data: &mut TreeCleanData) -> Result<(), ResetError> {
    let entries = fs::read_dir(dir).map_err(|e| ResetError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| ResetError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ResetError::io(&path, e))?;

        if file_type.is_dir() {
            let files = count_files(&path);
            fs::remove_dir_all(&path).map_err(|e| ResetError::io(&path, e))?;
            data.files_removed += files;
        } else {
            fs::remove_file(&path).map_err(|e| ResetError::io(&path, e))?;
            if file_type.is_file() {
                data.files_removed += 1;
            }
        }

        debug!(path = %path.display(), "removed");
        data.deleted_count += 1;
    }

    Ok(())
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

/// Path of the archive written by [`clean_with_archive`]
pub fn archive_path_for(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "workspaceStorage".to_string());
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.with_file_name(format!("{}_backup_{}.tar.gz", name, stamp))
}

/// Pack `dir` into a tar.gz next to it
pub fn archive_dir(dir: &Path) -> Result<PathBuf, ResetError> {
    let archive_path = archive_path_for(dir);
    let prefix = dir
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("workspaceStorage"));

    write_archive(dir, &archive_path, &prefix).map_err(|e| ResetError::io(&archive_path, e))?;
    Ok(archive_path)
}

fn write_archive(source: &Path, archive_path: &Path, prefix: &Path) -> io::Result<()> {
    let file = File::create(archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut archive = Builder::new(encoder);

    for entry in WalkDir::new(source).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let relative = path
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let archive_name = prefix.join(relative);

        if entry.file_type().is_dir() {
            archive.append_dir(&archive_name, path)?;
        } else if entry.file_type().is_file() {
            archive.append_path_with_name(path, &archive_name)?;
        }
    }

    archive.into_inner()?.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Status;
    use flate2::read::GzDecoder;
    use tar::Archive;

    fn populate(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        for i in 0..4 {
            fs::write(dir.join(format!("file{}.json", i)), "{}").unwrap();
        }
        for name in ["a1b2c3", "d4e5f6"] {
            let sub = dir.join(name);
            fs::create_dir_all(sub.join("nested")).unwrap();
            fs::write(sub.join("workspace.json"), "{}").unwrap();
            fs::write(sub.join("nested").join("state.vscdb"), "db").unwrap();
        }
    }

    #[test]
    fn test_clean_counts_top_level_entries() {
        let root = tempfile::tempdir().unwrap();
        let ws = root.path().join("workspaceStorage");
        populate(&ws);

        let result = clean(&ws);

        assert_eq!(result.status, Status::Success);
        assert_eq!(result.data.deleted_count, 6);
        assert_eq!(result.data.files_removed, 8);
        assert_eq!(fs::read_dir(&ws).unwrap().count(), 0);
    }

    #[test]
    fn test_absent_directory_is_benign() {
        let root = tempfile::tempdir().unwrap();
        let result = clean(&root.path().join("workspaceStorage"));

        assert_eq!(result.status, Status::Success);
        assert_eq!(result.data.deleted_count, 0);
    }

    #[test]
    fn test_clean_with_archive() {
        let root = tempfile::tempdir().unwrap();
        let ws = root.path().join("workspaceStorage");
        populate(&ws);

        let result = clean_with_archive(&ws);

        assert!(result.is_success());
        assert_eq!(result.data.deleted_count, 6);
        let archive = result.data.archive_path.unwrap();
        assert!(archive
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("workspaceStorage_backup_"));

        let mut tar = Archive::new(GzDecoder::new(File::open(&archive).unwrap()));
        let names: Vec<String> = tar
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect();
        assert!(names
            .iter()
            .any(|n| n.ends_with("a1b2c3/nested/state.vscdb")));
        assert_eq!(names.iter().filter(|n| n.ends_with(".json")).count(), 6);
    }

    #[test]
    fn test_permission_failure_asks_to_close_editor() {
        let dir = Path::new("/ws/workspaceStorage");
        let data = TreeCleanData {
            dir: dir.to_path_buf(),
            deleted_count: 2,
            files_removed: 3,
            ..Default::default()
        };
        let denied = ResetError::io(
            dir.join("a1b2c3"),
            io::Error::new(io::ErrorKind::PermissionDenied, "in use"),
        );

        let result = tree_result(dir, data, "workspace storage", Err(denied));

        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.message, CLOSE_EDITOR_HINT);
        assert_eq!(result.error.unwrap().kind, crate::error::ErrorKind::Permission);
        assert_eq!(result.data.deleted_count, 2);
        assert_eq!(result.data.files_removed, 3);
    }

    #[test]
    fn test_other_failure_names_the_tree() {
        let dir = Path::new("/ws/extensions");
        let err = ResetError::io(dir, io::Error::other("disk on fire"));

        let result = tree_result(dir, TreeCleanData::default(), "extensions", Err(err));

        assert_eq!(result.message, "Failed to clean extensions");
        assert_eq!(result.error.unwrap().kind, crate::error::ErrorKind::Io);
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_stops_on_unremovable_entry() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let ws = root.path().join("workspaceStorage");
        let locked = ws.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("state.vscdb"), "db").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits do not bind root
        if fs::write(locked.join("writable"), "").is_ok() {
            return;
        }

        let result = clean(&ws);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.message, CLOSE_EDITOR_HINT);
        assert_eq!(result.error.unwrap().kind, crate::error::ErrorKind::Permission);
        assert!(locked.join("state.vscdb").exists());
    }

    #[test]
    fn test_clean_extensions_missing_dir_fails() {
        let root = tempfile::tempdir().unwrap();
        let result = clean_extensions(&root.path().join("extensions"));

        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.error.unwrap().kind, crate::error::ErrorKind::NotFound);
    }

    #[test]
    fn test_clean_extensions() {
        let root = tempfile::tempdir().unwrap();
        let ext = root.path().join("extensions");
        fs::create_dir_all(ext.join("augment.vscode-augment-0.1.0")).unwrap();
        fs::write(ext.join("extensions.json"), "[]").unwrap();

        let result = clean_extensions(&ext);

        assert!(result.is_success());
        assert_eq!(result.data.deleted_count, 2);
        assert!(ext.exists());
    }
}
