//! Run every reset step in order
//!
//! Database purge, identifier rewrite, then workspace purge. A failing step
//! never stops the ones after it.

use editor_id_reset::config::EditorProfile;
use editor_id_reset::session::Session;
use tracing::warn;

use super::{clean, clean_extensions, clean_workspace, modify_ids, CombinedReport, StepResult};

pub fn execute(session: &Session) -> CombinedReport {
    let mut report = CombinedReport::new(session.profile);

    if session.profile.is_jetbrains() {
        report.push(StepResult::skipped(
            "database",
            "JetBrains IDEs have no state database",
        ));
    } else {
        report.push(clean::run(session));
    }

    report.extend(modify_ids::run(session));

    if session.profile.is_jetbrains() {
        report.push(StepResult::skipped(
            "workspace",
            "JetBrains IDEs have no workspace storage",
        ));
    } else {
        report.push(clean_workspace::run(session));
    }

    if session.with_extensions {
        if session.profile == EditorProfile::Cursor {
            report.push(clean_extensions::run(session));
        } else {
            report.push(StepResult::skipped(
                "extensions",
                "Extensions cleanup is only available for Cursor",
            ));
        }
    }

    if !report.success {
        warn!(failed = report.failed_count(), "some steps failed");
    }

    report
}
