//! Shared output helpers for commands

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

use editor_id_reset::report::{IdChange, IdFileData, Status};

use super::{CombinedReport, StepResult};

/// Print any serialisable report as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

pub fn print_report(title: &str, report: &CombinedReport) {
    println!(
        "{}",
        format!("=== {}: {} ===", report.editor.display_name(), title).green()
    );

    for step in &report.steps {
        match step.outcome() {
            Some((Status::Failed, message, error)) => {
                println!("{} {}: {}", "Failed:".red(), step.label(), message);
                if let Some(error) = error {
                    println!("    {}", error.detail.dimmed());
                }
            }
            Some((Status::Partial, message, _)) => {
                println!("{} {}: {}", "Partial:".yellow(), step.label(), message);
            }
            Some((Status::Success, message, _)) => {
                println!("{} {}: {}", "Done:".green(), step.label(), message);
            }
            None => {
                if let StepResult::Skipped { reason, .. } = step {
                    println!("{} {}: {}", "Skipped:".yellow(), step.label(), reason);
                }
            }
        }

        for line in step_details(step) {
            println!("    {}", line.dimmed());
        }
    }

    let failed = report.failed_count();
    if failed == 0 {
        println!("\n{}", "All steps completed".green());
    } else {
        println!(
            "\n{} of {} steps failed",
            failed.to_string().red(),
            report.steps.len()
        );
    }
}

/// Plain-text detail lines for one step: backups, archives, id changes
pub fn step_details(step: &StepResult) -> Vec<String> {
    let mut lines = Vec::new();

    match step {
        StepResult::Database(r) => {
            if r.data.matched > 0 {
                lines.push(format!("matched {} / deleted {}", r.data.matched, r.data.deleted));
            }
            push_backup(&mut lines, r.data.backup_path.as_deref());
            if r.data.restored {
                lines.push("database restored from backup".to_string());
            }
        }
        StepResult::Telemetry(r) => {
            push_change(&mut lines, "machineId", &r.data.machine_id);
            push_change(&mut lines, "devDeviceId", &r.data.device_id);
            push_backup(&mut lines, r.data.backup_path.as_deref());
        }
        StepResult::MachineIdFile(r) => push_id_file(&mut lines, &r.data),
        StepResult::JetbrainsIds(r) => {
            push_id_file(&mut lines, &r.data.device_id);
            push_id_file(&mut lines, &r.data.user_id);
        }
        StepResult::Workspace(r) | StepResult::Extensions(r) => {
            if let Some(archive) = &r.data.archive_path {
                lines.push(format!("archive: {}", archive.display()));
            }
        }
        StepResult::Skipped { .. } => {}
    }

    lines
}

fn push_backup(lines: &mut Vec<String>, backup: Option<&Path>) {
    if let Some(backup) = backup {
        lines.push(format!("backup: {}", backup.display()));
    }
}

fn push_change(lines: &mut Vec<String>, name: &str, change: &IdChange) {
    if change.new.is_empty() {
        return;
    }
    let old = if change.old.is_empty() {
        "(none)"
    } else {
        change.old.as_str()
    };
    lines.push(format!("{}: {} -> {}", name, old, change.new));
}

fn push_id_file(lines: &mut Vec<String>, data: &IdFileData) {
    if data.path.as_os_str().is_empty() {
        return;
    }
    let name = data
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    push_change(lines, &name, &data.change);
    push_backup(lines, data.backup_path.as_deref());
    if data.read_only {
        lines.push(format!("{} locked read-only", name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_id_reset::report::{DatabaseCleanData, OperationResult, TelemetryData};
    use std::path::PathBuf;

    #[test]
    fn test_database_details() {
        let step = StepResult::Database(OperationResult::success(
            DatabaseCleanData {
                matched: 3,
                deleted: 3,
                backup_path: Some(PathBuf::from("/g/state.vscdb.backup")),
                ..Default::default()
            },
            "Deleted 3 entries",
        ));

        assert_eq!(
            step_details(&step),
            vec![
                "matched 3 / deleted 3".to_string(),
                "backup: /g/state.vscdb.backup".to_string(),
            ]
        );
    }

    #[test]
    fn test_telemetry_details_mark_new_ids() {
        let step = StepResult::Telemetry(OperationResult::success(
            TelemetryData {
                created: true,
                machine_id: IdChange {
                    old: String::new(),
                    new: "ab".repeat(64),
                },
                device_id: IdChange {
                    old: "old-dev".to_string(),
                    new: "new-dev".to_string(),
                },
                ..Default::default()
            },
            "created",
        ));

        let lines = step_details(&step);
        assert!(lines[0].starts_with("machineId: (none) -> abab"));
        assert_eq!(lines[1], "devDeviceId: old-dev -> new-dev");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_skipped_has_no_details() {
        assert!(step_details(&StepResult::skipped("workspace", "n/a")).is_empty());
    }
}
