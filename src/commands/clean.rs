//! Purge keyword entries from the global state database

use std::path::Path;

use editor_id_reset::config::ArtifactKind;
use editor_id_reset::editor::database;
use editor_id_reset::report::{DatabaseCleanData, OperationResult};
use editor_id_reset::session::Session;

use super::{CombinedReport, StepResult};

pub fn execute(session: &Session) -> CombinedReport {
    let mut report = CombinedReport::new(session.profile);
    report.push(run(session));
    report
}

pub(crate) fn run(session: &Session) -> StepResult {
    let db_path = session
        .paths()
        .and_then(|p| p.require(ArtifactKind::StateDatabase).map(Path::to_path_buf));

    let result = match db_path {
        Ok(db_path) => database::clean(&db_path, &session.keyword),
        Err(err) => OperationResult::failed(
            DatabaseCleanData {
                keyword: session.keyword.clone(),
                ..Default::default()
            },
            "Could not locate the state database",
            &err,
        ),
    };

    StepResult::Database(result)
}
