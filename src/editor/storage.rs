//! Global storage operations
//!
//! Rewrites the telemetry identifiers in
//! <User>/globalStorage/storage.json:
//! - telemetry.machineId (128 hex chars)
//! - telemetry.devDeviceId (UUID)
//!
//! Every other key is written back unchanged and in its original order.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::backup::{with_backup, ActionError};
use super::identifiers::{new_machine_id, new_standard_uuid};
use super::lock::try_clear_read_only;
use crate::error::ResetError;
use crate::report::{IdChange, OperationResult, TelemetryData};

pub const MACHINE_ID_KEY: &str = "telemetry.machineId";
pub const DEVICE_ID_KEY: &str = "telemetry.devDeviceId";

const DEFAULT_INDENT: &str = "    ";

/// Replace both telemetry ids in the settings document at `settings_path`
///
/// A missing file is created with just the two keys.
pub fn rewrite_storage_json(settings_path: &Path) -> OperationResult<TelemetryData> {
    let mut data = TelemetryData {
        settings_path: settings_path.to_path_buf(),
        ..Default::default()
    };

    if !settings_path.exists() {
        return match create_storage_json(settings_path) {
            Ok((machine_id, device_id)) => {
                data.created = true;
                data.machine_id = machine_id;
                data.device_id = device_id;
                info!(path = %settings_path.display(), "created settings with fresh telemetry ids");
                OperationResult::success(data, "Created settings file with new telemetry IDs")
            }
            Err(err) => OperationResult::failed(data, "Could not create settings file", &err),
        };
    }

    try_clear_read_only(settings_path);

    match with_backup(settings_path, || rewrite_in_place(settings_path)) {
        Ok(((machine_id, device_id), record)) => {
            data.backup_path = Some(record.backup);
            data.machine_id = machine_id;
            data.device_id = device_id;
            info!(path = %settings_path.display(), "telemetry ids rewritten");
            OperationResult::success(data, "Telemetry IDs modified")
        }
        Err(failure) => {
            data.backup_path = failure.backup_path();
            let message = if failure.restored {
                "Telemetry ID rewrite failed; settings restored from backup"
            } else {
                "Telemetry ID rewrite failed"
            };
            OperationResult::failed(data, message, &failure.error)
        }
    }
}

fn rewrite_in_place(path: &Path) -> Result<(IdChange, IdChange), ActionError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ActionError::Untouched(ResetError::io(path, e)))?;

    let mut json: Value = if content.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(&content).map_err(|e| ActionError::Untouched(e.into()))?
    };

    let obj = json.as_object_mut().ok_or_else(|| {
        ActionError::Untouched(ResetError::Anomaly(format!(
            "{} is not a JSON object",
            path.display()
        )))
    })?;

    let changes = replace_ids(obj);
    let indent = detect_indent(&content);
    let new_content = to_string_with_indent(&json, &indent).map_err(ActionError::Untouched)?;

    debug!(path = %path.display(), indent = indent.len(), "writing settings");
    fs::write(path, new_content).map_err(|e| ActionError::Corrupting(ResetError::io(path, e)))?;

    Ok(changes)
}

fn create_storage_json(path: &Path) -> Result<(IdChange, IdChange), ResetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ResetError::io(parent, e))?;
    }

    let mut obj = Map::new();
    let changes = replace_ids(&mut obj);
    let content = to_string_with_indent(&Value::Object(obj), DEFAULT_INDENT)?;
    fs::write(path, content).map_err(|e| ResetError::io(path, e))?;
    Ok(changes)
}

/// Set both telemetry keys to fresh values, returning what they replaced
fn replace_ids(obj: &mut Map<String, Value>) -> (IdChange, IdChange) {
    let machine_id = replace_key(obj, MACHINE_ID_KEY, new_machine_id());
    let device_id = replace_key(obj, DEVICE_ID_KEY, new_standard_uuid());
    (machine_id, device_id)
}

fn replace_key(obj: &mut Map<String, Value>, key: &str, new: String) -> IdChange {
    let old = match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    obj.insert(key.to_string(), Value::String(new.clone()));
    IdChange { old, new }
}

/// Indentation of the first indented line, or four spaces
fn detect_indent(content: &str) -> String {
    content
        .lines()
        .skip(1)
        .map(|line| {
            line.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect::<String>()
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

fn to_string_with_indent(value: &Value, indent: &str) -> Result<String, ResetError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| ResetError::Anomaly(format!("serialized settings: {}", e)))
}
