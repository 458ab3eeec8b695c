//! Remove every installed Cursor extension

use std::path::Path;

use editor_id_reset::config::{ArtifactKind, EditorProfile};
use editor_id_reset::editor::workspace;
use editor_id_reset::error::ResetError;
use editor_id_reset::report::{OperationResult, TreeCleanData};
use editor_id_reset::session::Session;

use super::{CombinedReport, StepResult};

pub fn execute(session: &Session) -> CombinedReport {
    let mut report = CombinedReport::new(session.profile);
    report.push(run(session));
    report
}

pub(crate) fn run(session: &Session) -> StepResult {
    if session.profile != EditorProfile::Cursor {
        let err = ResetError::Config(format!(
            "extension cleanup is only supported for Cursor, not {}",
            session.profile
        ));
        return StepResult::Extensions(OperationResult::failed(
            TreeCleanData::default(),
            "Extensions cleanup is only available for Cursor",
            &err,
        ));
    }

    let dir = session
        .paths()
        .and_then(|p| p.require(ArtifactKind::ExtensionsDir).map(Path::to_path_buf));

    let result = match dir {
        Ok(dir) => workspace::clean_extensions(&dir),
        Err(err) => OperationResult::failed(
            TreeCleanData::default(),
            "Could not locate the extensions directory",
            &err,
        ),
    };

    StepResult::Extensions(result)
}
