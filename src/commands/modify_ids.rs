//! Replace telemetry and device identifiers

use editor_id_reset::config::ArtifactKind;
use editor_id_reset::editor::id_file::{rewrite_id_file, rewrite_jetbrains_ids};
use editor_id_reset::editor::storage::rewrite_storage_json;
use editor_id_reset::editor::IdFormat;
use editor_id_reset::report::{IdFileData, JetBrainsIdsData, OperationResult, TelemetryData};
use editor_id_reset::session::Session;

use super::{CombinedReport, StepResult};

pub fn execute(session: &Session) -> CombinedReport {
    let mut report = CombinedReport::new(session.profile);
    report.extend(run(session));
    report
}

/// VS Code family: storage.json ids plus the legacy `machineid` file.
/// JetBrains: both permanent id files.
pub(crate) fn run(session: &Session) -> Vec<StepResult> {
    let paths = match session.paths() {
        Ok(paths) => paths,
        Err(err) if session.profile.is_jetbrains() => {
            return vec![StepResult::JetbrainsIds(OperationResult::failed(
                JetBrainsIdsData::default(),
                "Could not locate the JetBrains configuration directory",
                &err,
            ))]
        }
        Err(err) => {
            return vec![StepResult::Telemetry(OperationResult::failed(
                TelemetryData::default(),
                "Could not locate editor settings",
                &err,
            ))]
        }
    };

    if session.profile.is_jetbrains() {
        return vec![StepResult::JetbrainsIds(rewrite_jetbrains_ids(
            &paths,
            session.lock_files,
        ))];
    }

    let telemetry = match paths.require(ArtifactKind::SettingsJson) {
        Ok(path) => rewrite_storage_json(path),
        Err(err) => OperationResult::failed(TelemetryData::default(), "No settings file", &err),
    };

    let machine_id = match paths.require(ArtifactKind::MachineIdFile) {
        Ok(path) => rewrite_id_file(path, IdFormat::StandardUuid, session.lock_files),
        Err(err) => OperationResult::failed(IdFileData::default(), "No machineid file", &err),
    };

    vec![
        StepResult::Telemetry(telemetry),
        StepResult::MachineIdFile(machine_id),
    ]
}
