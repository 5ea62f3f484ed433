//! Jobs: one attempt at one stage for one item.

use super::media::{ItemId, SeasonId};

pub type JobId = i64;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Rip,
    Remux,
    Transcode,
    Organize,
    Publish,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Rip,
        Stage::Remux,
        Stage::Transcode,
        Stage::Organize,
        Stage::Publish,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Rip => "rip",
            Stage::Remux => "remux",
            Stage::Transcode => "transcode",
            Stage::Organize => "organize",
            Stage::Publish => "publish",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Stage::ALL.into_iter().find(|stage| stage.as_str() == s)
    }

    /// Stage that consumes this stage's output.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Rip => Some(Stage::Remux),
            Stage::Remux => Some(Stage::Transcode),
            Stage::Transcode => Some(Stage::Organize),
            Stage::Organize => Some(Stage::Publish),
            Stage::Publish => None,
        }
    }
}

/// Job status. `Completed` and `Failed` are terminal; a retry is a new job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "in_progress" => Some(JobStatus::InProgress),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Persisted job record.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub media_item_id: ItemId,
    pub season_id: Option<SeasonId>,
    /// Disc number for multi-disc TV rips.
    pub disc: Option<u32>,
    pub stage: Stage,
    pub status: JobStatus,
    pub input_dir: Option<String>,
    pub output_dir: Option<String>,
    pub progress: u8,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: i64,
}

/// A persisted job that breaks a status invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("job {job_id}: completed job has no completed_at")]
    CompletedWithoutTimestamp { job_id: JobId },
    #[error("job {job_id}: completed job has progress {progress}, want 100")]
    CompletedWithProgress { job_id: JobId, progress: u8 },
    #[error("job {job_id}: failed job has empty error_message")]
    FailedWithoutMessage { job_id: JobId },
    #[error("job {job_id}: in_progress job has no started_at")]
    InProgressWithoutStart { job_id: JobId },
}

impl Job {
    /// Re-validates the status invariants:
    /// completed needs `completed_at` and progress 100, failed needs a
    /// non-empty message, in_progress needs `started_at`.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        let job_id = self.id;
        match self.status {
            JobStatus::Completed => {
                if self.completed_at.is_none() {
                    return Err(ConsistencyError::CompletedWithoutTimestamp { job_id });
                }
                if self.progress != 100 {
                    return Err(ConsistencyError::CompletedWithProgress {
                        job_id,
                        progress: self.progress,
                    });
                }
            }
            JobStatus::Failed => {
                if self.error_message.as_deref().map_or(true, |m| m.trim().is_empty()) {
                    return Err(ConsistencyError::FailedWithoutMessage { job_id });
                }
            }
            JobStatus::InProgress => {
                if self.started_at.is_none() {
                    return Err(ConsistencyError::InProgressWithoutStart { job_id });
                }
            }
            JobStatus::Pending => {}
        }
        Ok(())
    }
}
