//! Best-effort read-only protection for rewritten id files
//!
//! Marking a file read-only deters the editor from silently regenerating it.
//! Failures are logged and reported as `false`, never as errors.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Mark `path` read-only; returns whether it succeeded
pub fn try_set_read_only(path: &Path) -> bool {
    let ok = match fs::metadata(path) {
        Ok(metadata) => {
            let mut perms = metadata.permissions();
            set_read_only_bits(&mut perms);
            fs::set_permissions(path, perms)
                .map_err(|e| warn!(path = %path.display(), error = %e, "could not mark file read-only"))
                .is_ok()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read permissions");
            false
        }
    };

    if ok {
        // User immutable flag survives a plain chmod by the editor
        run_chflags("uchg", path);
        debug!(path = %path.display(), "marked read-only");
    }
    ok
}

/// Lift protection set by [`try_set_read_only`] so the file can be rewritten
pub fn try_clear_read_only(path: &Path) -> bool {
    run_chflags("nouchg", path);

    match fs::metadata(path) {
        Ok(metadata) => {
            let mut perms = metadata.permissions();
            if !perms.readonly() {
                return true;
            }
            set_writable_bits(&mut perms);
            fs::set_permissions(path, perms)
                .map_err(|e| warn!(path = %path.display(), error = %e, "could not make file writable"))
                .is_ok()
        }
        Err(_) => false,
    }
}

#[cfg(unix)]
fn set_read_only_bits(perms: &mut fs::Permissions) {
    use std::os::unix::fs::PermissionsExt;
    perms.set_mode(0o444);
}

#[cfg(not(unix))]
fn set_read_only_bits(perms: &mut fs::Permissions) {
    perms.set_readonly(true);
}

#[cfg(unix)]
fn set_writable_bits(perms: &mut fs::Permissions) {
    use std::os::unix::fs::PermissionsExt;
    perms.set_mode(perms.mode() | 0o200);
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn set_writable_bits(perms: &mut fs::Permissions) {
    perms.set_readonly(false);
}

#[cfg(target_os = "macos")]
fn run_chflags(flag: &str, path: &Path) {
    match std::process::Command::new("chflags")
        .arg(flag)
        .arg(path)
        .output()
    {
        Ok(out) if out.status.success() => {}
        Ok(out) => debug!(
            path = %path.display(),
            flag,
            stderr = %String::from_utf8_lossy(&out.stderr).trim(),
            "chflags failed"
        ),
        Err(e) => debug!(path = %path.display(), flag, error = %e, "chflags unavailable"),
    }
}

#[cfg(not(target_os = "macos"))]
fn run_chflags(_flag: &str, _path: &Path) {}
