//! Standalone well-formedness check of a `.rip` directory.

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use super::layout::{METADATA_FILE, STATUS_FILE};
use crate::model::{JobStatus, MediaType};

/// One problem found in a state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateIssue {
    Missing,
    NotADirectory,
    MetadataUnreadable(String),
    MetadataInvalid(String),
    EmptyField(&'static str),
    BadType(String),
    StatusUnreadable(String),
    BadStatus(String),
}

impl fmt::Display for StateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateIssue::Missing => write!(f, "state directory does not exist"),
            StateIssue::NotADirectory => write!(f, "not a directory"),
            StateIssue::MetadataUnreadable(e) => write!(f, "{} missing or unreadable: {}", METADATA_FILE, e),
            StateIssue::MetadataInvalid(e) => write!(f, "{} invalid JSON: {}", METADATA_FILE, e),
            StateIssue::EmptyField(field) => write!(f, "{}: '{}' field is empty", METADATA_FILE, field),
            StateIssue::BadType(t) => write!(f, "{}: 'type' must be 'movie' or 'tv', got '{}'", METADATA_FILE, t),
            StateIssue::StatusUnreadable(e) => write!(f, "{} file missing or unreadable: {}", STATUS_FILE, e),
            StateIssue::BadStatus(s) => write!(
                f,
                "{} file: invalid value '{}', must be one of: pending, in_progress, completed, failed",
                STATUS_FILE, s
            ),
        }
    }
}

/// Lenient view of metadata.json: absent fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetadata {
    #[serde(rename = "type")]
    media_type: String,
    name: String,
    safe_name: String,
}

/// Checks `metadata.json` (non-empty type, name, and safe_name; known type)
/// and `status` (one of the four job statuses) without touching a database.
/// An empty list means the directory is well-formed.
pub fn validate_rip_dir(state_dir: &Path) -> Vec<StateIssue> {
    match std::fs::metadata(state_dir) {
        Err(_) => return vec![StateIssue::Missing],
        Ok(m) if !m.is_dir() => return vec![StateIssue::NotADirectory],
        Ok(_) => {}
    }

    let mut issues = Vec::new();
    match std::fs::read(state_dir.join(METADATA_FILE)) {
        Err(e) => issues.push(StateIssue::MetadataUnreadable(e.to_string())),
        Ok(bytes) => match serde_json::from_slice::<RawMetadata>(&bytes) {
            Err(e) => issues.push(StateIssue::MetadataInvalid(e.to_string())),
            Ok(meta) => {
                if meta.media_type.is_empty() {
                    issues.push(StateIssue::EmptyField("type"));
                } else if MediaType::parse(&meta.media_type).is_none() {
                    issues.push(StateIssue::BadType(meta.media_type));
                }
                if meta.name.is_empty() {
                    issues.push(StateIssue::EmptyField("name"));
                }
                if meta.safe_name.is_empty() {
                    issues.push(StateIssue::EmptyField("safe_name"));
                }
            }
        },
    }

    match std::fs::read_to_string(state_dir.join(STATUS_FILE)) {
        Err(e) => issues.push(StateIssue::StatusUnreadable(e.to_string())),
        Ok(raw) => {
            let status = raw.trim();
            if JobStatus::parse(status).is_none() {
                issues.push(StateIssue::BadStatus(status.to_string()));
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, metadata: &str, status: &str) {
        std::fs::write(dir.join(METADATA_FILE), metadata).unwrap();
        std::fs::write(dir.join(STATUS_FILE), status).unwrap();
    }

    #[test]
    fn well_formed() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            r#"{"type":"show","name":"The Simpsons","safe_name":"The_Simpsons","season":"1"}"#,
            "completed\n",
        );
        assert!(validate_rip_dir(dir.path()).is_empty());
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            validate_rip_dir(&dir.path().join("nope")),
            vec![StateIssue::Missing]
        );
        let file = dir.path().join("file");
        std::fs::write(&file, "").unwrap();
        assert_eq!(validate_rip_dir(&file), vec![StateIssue::NotADirectory]);
    }

    #[test]
    fn reports_every_problem() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), r#"{"type":"album","name":""}"#, "done");
        let issues = validate_rip_dir(dir.path());
        assert_eq!(
            issues,
            vec![
                StateIssue::BadType("album".to_string()),
                StateIssue::EmptyField("name"),
                StateIssue::EmptyField("safe_name"),
                StateIssue::BadStatus("done".to_string()),
            ]
        );
        assert_eq!(
            issues[3].to_string(),
            "status file: invalid value 'done', must be one of: pending, in_progress, completed, failed"
        );
    }

    #[test]
    fn missing_files_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let issues = validate_rip_dir(dir.path());
        assert!(matches!(issues[0], StateIssue::MetadataUnreadable(_)));
        assert!(matches!(issues[1], StateIssue::StatusUnreadable(_)));

        std::fs::write(dir.path().join(METADATA_FILE), "{not json").unwrap();
        let issues = validate_rip_dir(dir.path());
        assert!(matches!(issues[0], StateIssue::MetadataInvalid(_)));
    }
}
