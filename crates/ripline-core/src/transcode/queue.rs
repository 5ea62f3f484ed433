//! Queue construction: merge files on disk with stored records.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

use super::transformer::Transformer;
use crate::model::{FileStatus, JobId, TranscodeFile};
use crate::store::{NewTranscodeFile, PipelineDb};

/// Which stored file states are worked on again.
#[derive(Debug, Clone, Copy)]
pub struct QueuePolicy {
    /// Re-attempt files that failed in an earlier run.
    pub retry_failed: bool,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self { retry_failed: true }
    }
}

/// True if the engine should (re)process this file.
/// Completed and skipped files never are; in_progress means a crash.
pub fn is_eligible(file: &TranscodeFile, policy: QueuePolicy) -> bool {
    match file.status {
        FileStatus::Pending | FileStatus::InProgress => true,
        FileStatus::Failed => policy.retry_failed,
        FileStatus::Completed | FileStatus::Skipped => false,
    }
}

fn is_mkv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mkv"))
}

/// Relative path with `/` separators, the key of a file within its job.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Walks `input_dir` for `.mkv` files (hidden directories such as `.rip` are
/// skipped) and returns one record per file, in path order.
///
/// Files already recorded for the job reuse their record untouched; new files
/// get a `pending` record with their size and probed duration. A probe
/// failure is logged and recorded as duration 0. Calling this twice on an
/// unchanged directory creates nothing new.
pub async fn build_queue<T: Transformer>(
    db: &PipelineDb,
    job_id: JobId,
    input_dir: &Path,
    transformer: &T,
) -> Result<Vec<TranscodeFile>> {
    let mut existing: HashMap<String, TranscodeFile> = db
        .list_transcode_files(job_id)
        .await?
        .into_iter()
        .map(|f| (f.relative_path.clone(), f))
        .collect();

    let walker = WalkDir::new(input_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() > 0
                && entry.file_type().is_dir()
                && entry.file_name().to_string_lossy().starts_with('.'))
        });

    let mut queue = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("scan {}", input_dir.display()))?;
        if !entry.file_type().is_file() || !is_mkv(entry.path()) {
            continue;
        }
        let Some(key) = relative_key(input_dir, entry.path()) else {
            continue;
        };
        if let Some(file) = existing.remove(&key) {
            queue.push(file);
            continue;
        }
        let input_size = entry
            .metadata()
            .with_context(|| format!("stat {}", entry.path().display()))?
            .len();
        let duration_secs = match transformer.probe_duration(entry.path()).await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(job_id, "could not probe {}: {}", key, e);
                0.0
            }
        };
        let file = db
            .create_transcode_file(&NewTranscodeFile {
                job_id,
                relative_path: key,
                input_size,
                duration_secs,
            })
            .await?;
        queue.push(file);
    }
    Ok(queue)
}
