//! CLI commands
//!
//! Each command runs one or more engine operations against a [`Session`]
//! and collects their typed results into a [`CombinedReport`].
//!
//! [`Session`]: editor_id_reset::session::Session

use serde::Serialize;

use editor_id_reset::config::EditorProfile;
use editor_id_reset::report::{
    DatabaseCleanData, ErrorDetail, IdFileData, JetBrainsIdsData, OperationResult, Status,
    TelemetryData, TreeCleanData,
};

pub mod all;
pub mod clean;
pub mod clean_extensions;
pub mod clean_workspace;
pub mod modify_ids;
pub mod paths;
pub mod utils;

/// Result of one step of a command
#[derive(Debug, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepResult {
    Database(OperationResult<DatabaseCleanData>),
    Telemetry(OperationResult<TelemetryData>),
    MachineIdFile(OperationResult<IdFileData>),
    JetbrainsIds(OperationResult<JetBrainsIdsData>),
    Workspace(OperationResult<TreeCleanData>),
    Extensions(OperationResult<TreeCleanData>),
    /// Step does not apply to the selected editor
    Skipped { name: String, reason: String },
}

impl StepResult {
    pub fn skipped(name: &str, reason: impl Into<String>) -> Self {
        Self::Skipped {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Database(_) => "database",
            Self::Telemetry(_) => "telemetry",
            Self::MachineIdFile(_) => "machineid",
            Self::JetbrainsIds(_) => "jetbrains ids",
            Self::Workspace(_) => "workspace",
            Self::Extensions(_) => "extensions",
            Self::Skipped { name, .. } => name,
        }
    }

    /// Status, message and error of a step that ran; `None` when skipped
    pub fn outcome(&self) -> Option<(Status, &str, Option<&ErrorDetail>)> {
        fn parts<T>(r: &OperationResult<T>) -> (Status, &str, Option<&ErrorDetail>) {
            (r.status, &r.message, r.error.as_ref())
        }

        match self {
            Self::Database(r) => Some(parts(r)),
            Self::Telemetry(r) => Some(parts(r)),
            Self::MachineIdFile(r) => Some(parts(r)),
            Self::JetbrainsIds(r) => Some(parts(r)),
            Self::Workspace(r) => Some(parts(r)),
            Self::Extensions(r) => Some(parts(r)),
            Self::Skipped { .. } => None,
        }
    }

    /// Skipped steps never fail a command
    pub fn is_success(&self) -> bool {
        self.outcome()
            .map_or(true, |(status, _, _)| status != Status::Failed)
    }
}

/// Every step a command ran, in order
#[derive(Debug, Serialize)]
pub struct CombinedReport {
    pub editor: EditorProfile,
    /// True only when no step failed
    pub success: bool,
    pub steps: Vec<StepResult>,
}

impl CombinedReport {
    pub fn new(editor: EditorProfile) -> Self {
        Self {
            editor,
            success: true,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: StepResult) {
        self.success &= step.is_success();
        self.steps.push(step);
    }

    pub fn extend(&mut self, steps: impl IntoIterator<Item = StepResult>) {
        for step in steps {
            self.push(step);
        }
    }

    pub fn failed_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_success()).count()
    }
}
