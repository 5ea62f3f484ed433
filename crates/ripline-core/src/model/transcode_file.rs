//! Per-file records of a transcode job.

use super::job::JobId;

pub type FileId = i64;

/// File status. `Completed` and `Skipped` are never left once entered;
/// `Skipped` is set by policy outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::InProgress => "in_progress",
            FileStatus::Completed => "completed",
            FileStatus::Failed => "failed",
            FileStatus::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FileStatus::Pending),
            "in_progress" => Some(FileStatus::InProgress),
            "completed" => Some(FileStatus::Completed),
            "failed" => Some(FileStatus::Failed),
            "skipped" => Some(FileStatus::Skipped),
            _ => None,
        }
    }

    /// Whether a record may move from `self` to `next`. Status only moves
    /// forward; the one way back is re-attempting a failed file through
    /// in_progress.
    pub fn can_move_to(self, next: FileStatus) -> bool {
        match (self, next) {
            (FileStatus::Completed | FileStatus::Skipped, _) => false,
            (_, FileStatus::Pending) => false,
            (FileStatus::Failed, FileStatus::Completed) => false,
            _ => true,
        }
    }
}

/// One media file discovered under a job's input directory.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeFile {
    pub id: FileId,
    pub job_id: JobId,
    /// Path relative to the job's input directory; unique per job.
    pub relative_path: String,
    pub status: FileStatus,
    pub input_size: u64,
    pub output_size: u64,
    pub progress: u8,
    pub duration_secs: f64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub error_message: Option<String>,
}

impl TranscodeFile {
    /// Bytes saved by transcoding; negative when the output grew.
    pub fn size_saved(&self) -> i64 {
        self.input_size as i64 - self.output_size as i64
    }

    /// `output / input`, or 0 when the input size is unknown.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_size == 0 {
            return 0.0;
        }
        self.output_size as f64 / self.input_size as f64
    }
}
