//! Sequential, resumable execution of one transcode job.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use super::options::TranscodeOptions;
use super::progress_worker::spawn_progress_worker;
use super::queue::{build_queue, is_eligible, QueuePolicy};
use super::summary::TranscodeSummary;
use super::transformer::{TransformError, Transformer};
use crate::cancel::{CancelToken, JobCancelled};
use crate::config::RiplineConfig;
use crate::model::{FileStatus, JobId, TranscodeFile};
use crate::progress::ProgressGate;
use crate::store::PipelineDb;

const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub transcode: TranscodeOptions,
    pub policy: QueuePolicy,
}

impl EngineOptions {
    pub fn from_config(cfg: &RiplineConfig) -> Self {
        Self {
            transcode: TranscodeOptions::from(&cfg.transcode),
            policy: QueuePolicy {
                retry_failed: cfg.retry_failed_files,
            },
        }
    }
}

/// Outcome of a run that drained its queue.
#[derive(Debug, Clone)]
pub struct TranscodeReport {
    pub summary: TranscodeSummary,
    /// Message of the last file that failed during this run.
    pub last_error: Option<String>,
}

impl TranscodeReport {
    /// The summary, or the last per-file error as the job-level error.
    pub fn into_result(self) -> Result<TranscodeSummary> {
        match self.last_error {
            Some(msg) => Err(anyhow!(msg)),
            None => Ok(self.summary),
        }
    }
}

/// Runs a job's queue one file at a time. One engine per job id.
pub struct TranscodeEngine<T> {
    db: PipelineDb,
    transformer: T,
    options: EngineOptions,
    cancel: CancelToken,
}

impl<T: Transformer> TranscodeEngine<T> {
    pub fn new(db: PipelineDb, transformer: T, options: EngineOptions) -> Self {
        Self {
            db,
            transformer,
            options,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Builds the queue for `input_dir` and transforms every eligible file
    /// into the same relative path under `output_dir`.
    ///
    /// A failing file is recorded and the run moves on. Store errors and
    /// cancellation (checked between files) abort with `Err`; files not yet
    /// reached stay pending.
    pub async fn run(&self, job_id: JobId, input_dir: &Path, output_dir: &Path) -> Result<TranscodeReport> {
        let queue = build_queue(&self.db, job_id, input_dir, &self.transformer)
            .await
            .with_context(|| format!("build queue for job {}", job_id))?;
        let done = queue
            .iter()
            .filter(|f| f.status == FileStatus::Completed)
            .count();
        let work: Vec<&TranscodeFile> = queue
            .iter()
            .filter(|f| is_eligible(f, self.options.policy))
            .collect();
        if done > 0 && !work.is_empty() {
            tracing::info!(job_id, "resuming: {} completed, {} remaining", done, work.len());
            self.event(job_id, "info", &format!("resuming: {} completed, {} remaining", done, work.len()))
                .await;
        }

        let mut last_error = None;
        for (i, file) in work.iter().enumerate() {
            self.cancel.check()?;
            tracing::info!(job_id, "[{}/{}] transcoding {}", i + 1, work.len(), file.relative_path);
            match self.transcode_file(job_id, file, input_dir, output_dir).await {
                Ok(output_size) => {
                    let ratio = if file.input_size > 0 {
                        output_size as f64 / file.input_size as f64 * 100.0
                    } else {
                        0.0
                    };
                    let saved = (file.input_size as f64 - output_size as f64) / MIB;
                    tracing::info!(
                        job_id,
                        "completed: {} ({:.1}%, saved {:.1} MB)",
                        file.relative_path,
                        ratio,
                        saved
                    );
                }
                Err(e) if is_cancellation(&e) => {
                    tracing::warn!(job_id, "cancelled during {}", file.relative_path);
                    return Err(JobCancelled.into());
                }
                Err(e) => {
                    let msg = format!("{:#}", e);
                    tracing::warn!(job_id, "failed: {}: {}", file.relative_path, msg);
                    self.db
                        .update_transcode_file_status(file.id, FileStatus::Failed, Some(&msg))
                        .await?;
                    self.event(job_id, "error", &format!("{}: {}", file.relative_path, msg))
                        .await;
                    last_error = Some(msg);
                }
            }
            self.record_job_progress(job_id).await;
        }

        let files = self.db.list_transcode_files(job_id).await?;
        let summary = TranscodeSummary::from_files(&files);
        tracing::info!(job_id, "{}", summary.counts_line());
        tracing::info!(job_id, "{}", summary.bytes_line());
        self.event(job_id, "info", &summary.counts_line()).await;
        Ok(TranscodeReport {
            summary,
            last_error,
        })
    }

    /// Transforms one file and records the result; returns the output size.
    async fn transcode_file(
        &self,
        job_id: JobId,
        file: &TranscodeFile,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<u64> {
        let input = input_dir.join(&file.relative_path);
        let output = output_dir.join(&file.relative_path);

        match tokio::fs::remove_file(&output).await {
            Ok(()) => tracing::debug!(job_id, "removed stale output {}", output.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("remove {}", output.display())),
        }
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        self.db
            .update_transcode_file_status(file.id, FileStatus::InProgress, None)
            .await?;

        let mut options = self.options.transcode.clone();
        options.duration_secs = file.duration_secs;
        let (tx, worker) = spawn_progress_worker(&self.db, job_id, file.id);
        let mut gate = ProgressGate::new(move |p: u8| {
            let _ = tx.send(p);
        });
        let result = self
            .transformer
            .transform(&input, &output, &options, &mut gate, &self.cancel)
            .await;
        drop(gate);
        if worker.await.is_err() {
            tracing::warn!(job_id, file_id = file.id, "progress worker ended abnormally");
        }
        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&output).await;
            return Err(e.into());
        }

        let output_size = tokio::fs::metadata(&output)
            .await
            .map_err(|_| anyhow!("output file not found"))?
            .len();
        self.db.complete_transcode_file(file.id, output_size).await?;
        Ok(output_size)
    }

    async fn record_job_progress(&self, job_id: JobId) {
        let files = match self.db.list_transcode_files(job_id).await {
            Ok(files) => files,
            Err(_) => return,
        };
        let finished = files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Completed | FileStatus::Skipped))
            .count();
        let percent = if files.is_empty() {
            0
        } else {
            (finished * 100 / files.len()) as u8
        };
        if self.db.update_job_progress(job_id, percent).await.is_err() {
            tracing::warn!(job_id, "durable job progress update failed");
        }
    }

    async fn event(&self, job_id: JobId, level: &str, message: &str) {
        if let Err(e) = self.db.add_log_event(job_id, level, message).await {
            tracing::warn!(job_id, "log event not recorded: {:#}", e);
        }
    }
}

fn is_cancellation(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<TransformError>(), Some(TransformError::Cancelled))
}
