use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::{JobStatus, MediaType};

pub const STATE_DIR_NAME: &str = ".rip";
pub const METADATA_FILE: &str = "metadata.json";
pub const STATUS_FILE: &str = "status";
/// Last failure message; present only after a failed run.
pub const ERROR_FILE: &str = "error";

/// Contents of `metadata.json`. `season` is a decimal string, empty for movies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMetadata {
    #[serde(rename = "type")]
    pub media_type: String,
    pub name: String,
    pub safe_name: String,
    #[serde(default)]
    pub season: String,
}

impl StageMetadata {
    pub fn new(media_type: MediaType, name: &str, safe_name: &str, season: Option<u32>) -> Self {
        Self {
            media_type: media_type.as_str().to_string(),
            name: name.to_string(),
            safe_name: safe_name.to_string(),
            season: season.map(|s| s.to_string()).unwrap_or_default(),
        }
    }

    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::parse(&self.media_type)
    }

    pub fn season_number(&self) -> Option<u32> {
        self.season.trim().parse().ok()
    }
}

/// `<stage_dir>/.rip`
pub fn state_dir(stage_dir: &Path) -> PathBuf {
    stage_dir.join(STATE_DIR_NAME)
}

pub fn read_metadata(state_dir: &Path) -> Result<StageMetadata> {
    let path = state_dir.join(METADATA_FILE);
    let data = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parse {}", path.display()))
}

pub fn read_status(state_dir: &Path) -> Result<JobStatus> {
    let path = state_dir.join(STATUS_FILE);
    let raw = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    JobStatus::parse(raw.trim())
        .with_context(|| format!("{}: unknown status {:?}", path.display(), raw.trim()))
}

pub(super) fn write_metadata(state_dir: &Path, metadata: &StageMetadata) -> Result<()> {
    let path = state_dir.join(METADATA_FILE);
    let json = serde_json::to_string_pretty(metadata)?;
    write_replace(&path, json.as_bytes())
}

pub(super) fn write_status(state_dir: &Path, status: JobStatus) -> Result<()> {
    write_replace(&state_dir.join(STATUS_FILE), format!("{}\n", status.as_str()).as_bytes())
}

pub(super) fn write_error(state_dir: &Path, message: &str) -> Result<()> {
    write_replace(&state_dir.join(ERROR_FILE), message.as_bytes())
}

pub(super) fn clear_error(state_dir: &Path) -> Result<()> {
    let path = state_dir.join(ERROR_FILE);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}

/// Write to a sibling temp file then rename, so readers never see a torn file.
fn write_replace(path: &Path, data: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, data).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("rename to {}", path.display()))?;
    Ok(())
}
