//! Keyword purge of the global state database
//!
//! `state.vscdb` is a SQLite file with a single `ItemTable(key, value)` table.
//! Rows whose key contains the keyword (case-insensitive, unanchored) are
//! deleted in one transaction under a [`with_backup`] guard.

use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use tracing::{debug, info, warn};

use super::backup::{with_backup, ActionError};
use crate::error::ResetError;
use crate::report::{DatabaseCleanData, OperationResult};

pub const ITEM_TABLE: &str = "ItemTable";

/// Default keyword purged by the `clean` command
pub const DEFAULT_KEYWORD: &str = "augment";

/// Counts observed by one purge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeCounts {
    pub matched: usize,
    pub deleted: usize,
}

/// How the deleted-row count compares to the pre-counted matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Nothing matched; no delete was issued
    NothingToDo,
    Complete,
    /// Engine count differs from the match count but is non-zero
    Partial,
    /// Matches were found but the engine deleted nothing
    Anomalous,
}

impl PurgeCounts {
    pub fn outcome(&self) -> PurgeOutcome {
        match (self.matched, self.deleted) {
            (0, _) => PurgeOutcome::NothingToDo,
            (_, 0) => PurgeOutcome::Anomalous,
            (m, d) if m == d => PurgeOutcome::Complete,
            _ => PurgeOutcome::Partial,
        }
    }
}

/// Remove every row whose key contains `keyword` from the database at `db_path`
pub fn clean(db_path: &Path, keyword: &str) -> OperationResult<DatabaseCleanData> {
    let mut data = DatabaseCleanData {
        db_path: db_path.to_path_buf(),
        keyword: keyword.to_string(),
        ..Default::default()
    };

    if keyword.is_empty() {
        let err = ResetError::Config("keyword must not be empty".to_string());
        return OperationResult::failed(data, "Refusing to purge with an empty keyword", &err);
    }

    if !db_path.exists() {
        let err = ResetError::NotFound(db_path.to_path_buf());
        return OperationResult::failed(
            data,
            format!("Database not found: {}", db_path.display()),
            &err,
        );
    }

    debug!(db = %db_path.display(), keyword, "purging keyword rows");

    // Populated even when the purge fails
    let mut counts = PurgeCounts {
        matched: 0,
        deleted: 0,
    };
    let guarded = with_backup(db_path, || purge(db_path, keyword, &mut counts));
    data.matched = counts.matched;
    data.deleted = counts.deleted;

    match guarded {
        Ok(((), record)) => {
            data.backup_path = Some(record.backup);

            match counts.outcome() {
                PurgeOutcome::NothingToDo => OperationResult::success(
                    data,
                    format!("No entries containing '{}'; database already clean", keyword),
                ),
                PurgeOutcome::Complete => {
                    info!(db = %db_path.display(), deleted = counts.deleted, "keyword rows deleted");
                    OperationResult::success(
                        data,
                        format!(
                            "Deleted {} entries containing '{}'",
                            counts.deleted, keyword
                        ),
                    )
                }
                PurgeOutcome::Partial => {
                    warn!(
                        db = %db_path.display(),
                        matched = counts.matched,
                        deleted = counts.deleted,
                        "deleted-row count differs from match count"
                    );
                    OperationResult::partial(
                        data,
                        format!(
                            "Partial: expected {} deletions, engine reported {}",
                            counts.matched, counts.deleted
                        ),
                    )
                }
                // purge() turns this into a Corrupting failure before we get here
                PurgeOutcome::Anomalous => {
                    let err = ResetError::Anomaly(format!(
                        "{} rows matched but none were deleted",
                        counts.matched
                    ));
                    OperationResult::failed(data, "Database purge deleted nothing", &err)
                }
            }
        }
        Err(failure) => {
            data.backup_path = failure.backup_path();
            data.restored = failure.restored;
            let message = if failure.restored {
                format!("Database purge failed; restored {} from backup", db_path.display())
            } else {
                "Database purge failed".to_string()
            };
            OperationResult::failed(data, message, &failure.error)
        }
    }
}

/// Select, then delete, the matching rows. The connection closes on return.
fn purge(db_path: &Path, keyword: &str, counts: &mut PurgeCounts) -> Result<(), ActionError> {
    let mut conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| ActionError::Untouched(e.into()))?;

    let keys = matching_keys(&conn, keyword).map_err(|e| ActionError::Untouched(e.into()))?;
    for key in &keys {
        debug!(key = %key, "matched");
    }

    counts.matched = keys.len();
    if keys.is_empty() {
        return Ok(());
    }

    counts.deleted =
        delete_matching(&mut conn, keyword).map_err(|e| ActionError::Corrupting(e.into()))?;

    if counts.outcome() == PurgeOutcome::Anomalous {
        return Err(ActionError::Corrupting(ResetError::Anomaly(format!(
            "{} rows matched '{}' but the engine deleted none",
            counts.matched, keyword
        ))));
    }

    Ok(())
}

const MATCH_CLAUSE: &str = "instr(lower(key), lower(?1)) > 0";

/// Keys containing `keyword`, case-insensitively
pub fn matching_keys(conn: &Connection, keyword: &str) -> rusqlite::Result<Vec<String>> {
    let sql = format!("SELECT key FROM {} WHERE {}", ITEM_TABLE, MATCH_CLAUSE);
    let mut stmt = conn.prepare(&sql)?;
    let keys = stmt
        .query_map(params![keyword], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(keys)
}

/// Engine-reported number of deleted rows
fn delete_matching(conn: &mut Connection, keyword: &str) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let sql = format!("DELETE FROM {} WHERE {}", ITEM_TABLE, MATCH_CLAUSE);
    let deleted = tx.execute(&sql, params![keyword])?;
    tx.commit()?;
    Ok(deleted)
}
