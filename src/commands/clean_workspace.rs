//! Purge the workspace storage directory

use std::path::Path;

use editor_id_reset::config::ArtifactKind;
use editor_id_reset::editor::workspace;
use editor_id_reset::report::{OperationResult, TreeCleanData};
use editor_id_reset::session::Session;

use super::{CombinedReport, StepResult};

pub fn execute(session: &Session) -> CombinedReport {
    let mut report = CombinedReport::new(session.profile);
    report.push(run(session));
    report
}

pub(crate) fn run(session: &Session) -> StepResult {
    let dir = session
        .paths()
        .and_then(|p| p.require(ArtifactKind::WorkspaceDir).map(Path::to_path_buf));

    let result = match dir {
        Ok(dir) if session.archive_workspace => workspace::clean_with_archive(&dir),
        Ok(dir) => workspace::clean(&dir),
        Err(err) => OperationResult::failed(
            TreeCleanData::default(),
            "Could not locate workspace storage",
            &err,
        ),
    };

    StepResult::Workspace(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_id_reset::config::{EditorProfile, OsKind, PathContext};
    use std::fs;

    #[test]
    fn test_clean_workspace_with_archive() {
        let home = tempfile::tempdir().unwrap();
        let ws = home.path().join(".config/Code/User/workspaceStorage");
        fs::create_dir_all(ws.join("0123abcd")).unwrap();
        fs::write(ws.join("0123abcd").join("workspace.json"), "{}").unwrap();

        let mut session = Session::new(EditorProfile::Code, PathContext::with_home(home.path()));
        session.os = OsKind::Linux;
        session.archive_workspace = true;

        let report = execute(&session);

        assert!(report.success);
        match &report.steps[0] {
            StepResult::Workspace(r) => {
                assert_eq!(r.data.deleted_count, 1);
                assert!(r.data.archive_path.as_ref().unwrap().exists());
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert!(ws.exists());
    }
}
