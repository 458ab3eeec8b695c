//! Typed operation results
//!
//! Every mutating operation returns an [`OperationResult`] with a fixed
//! payload type instead of propagating errors to its caller.

use serde::Serialize;
use std::path::PathBuf;

use crate::error::{ErrorKind, ResetError};

/// Final state of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    /// Some but not all of the expected work happened
    Partial,
    Failed,
}

/// Error detail carried by a failed result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub detail: String,
}

impl From<&ResetError> for ErrorDetail {
    fn from(err: &ResetError) -> Self {
        Self {
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

/// Outcome of one operation with its structured payload
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult<T> {
    pub status: Status,
    pub data: T,
    pub message: String,
    pub error: Option<ErrorDetail>,
}

impl<T> OperationResult<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            data,
            message: message.into(),
            error: None,
        }
    }

    pub fn partial(data: T, message: impl Into<String>) -> Self {
        Self {
            status: Status::Partial,
            data,
            message: message.into(),
            error: None,
        }
    }

    pub fn failed(data: T, message: impl Into<String>, err: &ResetError) -> Self {
        Self {
            status: Status::Failed,
            data,
            message: message.into(),
            error: Some(err.into()),
        }
    }

    /// Partial results still count as success when aggregating
    pub fn is_success(&self) -> bool {
        self.status != Status::Failed
    }
}

/// Old and new value of one rewritten identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdChange {
    /// Empty when the identifier did not exist before
    pub old: String,
    pub new: String,
}

/// Payload of a keyword purge
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseCleanData {
    pub db_path: PathBuf,
    pub keyword: String,
    /// Rows selected before deletion
    pub matched: usize,
    /// Rows the engine reported deleted
    pub deleted: usize,
    pub backup_path: Option<PathBuf>,
    /// True when the backup was copied back over the database
    pub restored: bool,
}

/// Payload of a storage.json rewrite
#[derive(Debug, Clone, Default, Serialize)]
pub struct TelemetryData {
    pub settings_path: PathBuf,
    pub backup_path: Option<PathBuf>,
    /// True when the file did not exist and was created
    pub created: bool,
    pub machine_id: IdChange,
    pub device_id: IdChange,
}

/// Payload of a plain-text identifier file rewrite
#[derive(Debug, Clone, Default, Serialize)]
pub struct IdFileData {
    pub path: PathBuf,
    pub backup_path: Option<PathBuf>,
    pub created: bool,
    pub change: IdChange,
    pub read_only: bool,
}

/// Payload of a JetBrains permanent-id rewrite
#[derive(Debug, Clone, Default, Serialize)]
pub struct JetBrainsIdsData {
    pub config_dir: PathBuf,
    pub device_id: IdFileData,
    pub user_id: IdFileData,
}

/// Payload of a directory tree purge (workspace storage, extensions)
#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeCleanData {
    pub dir: PathBuf,
    /// Top-level entries removed
    pub deleted_count: usize,
    /// Regular files removed at any depth
    pub files_removed: usize,
    pub archive_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_counts_as_success() {
        let result = OperationResult::partial(DatabaseCleanData::default(), "some rows");
        assert!(result.is_success());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failed_carries_error_detail() {
        let err = ResetError::Anomaly("0 of 3 rows deleted".to_string());
        let result = OperationResult::failed(TreeCleanData::default(), "purge failed", &err);

        assert!(!result.is_success());
        let detail = result.error.unwrap();
        assert_eq!(detail.kind, ErrorKind::Anomaly);
        assert!(detail.detail.contains("0 of 3"));
    }

    #[test]
    fn test_result_serialization() {
        let result = OperationResult::success(
            IdFileData {
                path: PathBuf::from("/cfg/PermanentUserId"),
                change: IdChange {
                    old: String::new(),
                    new: "abc".to_string(),
                },
                ..Default::default()
            },
            "rewritten",
        );

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"success\""));
        assert!(json.contains("\"new\":\"abc\""));
        assert!(json.contains("\"error\":null"));
    }
}
