//! Replacement identifier generation
//!
//! - machine id: 128 lowercase hex chars (two SHA-256 blocks)
//! - device / user / permanent ids: canonical v4 UUID text

use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Format an identifier artifact expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdFormat {
    MachineId,
    StandardUuid,
    JetBrainsUuid,
}

impl IdFormat {
    pub fn generate(&self) -> String {
        match self {
            Self::MachineId => new_machine_id(),
            Self::StandardUuid => new_standard_uuid(),
            Self::JetBrainsUuid => new_jetbrains_uuid(),
        }
    }
}

fn hex_block() -> String {
    hex::encode(Sha256::digest(Uuid::new_v4().as_bytes()))
}

/// Two concatenated 64-char hex blocks
pub fn new_machine_id() -> String {
    let mut id = hex_block();
    id.push_str(&hex_block());
    id
}

pub fn new_standard_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// JetBrains stores a plain v4 UUID as the whole file content
pub fn new_jetbrains_uuid() -> String {
    new_standard_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_canonical_uuid(s: &str) -> bool {
        let groups: Vec<&str> = s.split('-').collect();
        s.len() == 36
            && groups.iter().map(|g| g.len()).collect::<Vec<_>>() == [8, 4, 4, 4, 12]
            && groups
                .iter()
                .all(|g| g.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')))
    }

    #[test]
    fn test_machine_id_format() {
        for _ in 0..32 {
            let id = new_machine_id();
            assert_eq!(id.len(), 128);
            assert!(id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        }
    }

    #[test]
    fn test_uuid_formats() {
        for format in [IdFormat::StandardUuid, IdFormat::JetBrainsUuid] {
            let id = format.generate();
            assert!(is_canonical_uuid(&id), "not a canonical uuid: {}", id);
            assert_eq!(Uuid::parse_str(&id).unwrap().get_version_num(), 4);
        }
    }

    #[test]
    fn test_values_are_fresh() {
        assert_ne!(new_machine_id(), new_machine_id());
        assert_ne!(new_standard_uuid(), new_standard_uuid());
        assert_ne!(IdFormat::MachineId.generate(), IdFormat::MachineId.generate());
    }
}
