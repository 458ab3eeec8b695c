//! Identifier and state mutation engine

pub mod backup;
pub mod database;
pub mod id_file;
pub mod identifiers;
pub mod lock;
pub mod storage;
pub mod workspace;

// Re-exports for library consumers
pub use backup::{with_backup, ActionError, BackupRecord, GuardFailure};
pub use identifiers::IdFormat;
