//! State transitions and the two places they are written.

use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};

use super::layout::{self, StageMetadata};
use crate::model::{JobId, JobStatus, MediaType, Stage};
use crate::store::{NewJob, PipelineDb};

/// One stage-level state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// Stage directory claimed for an item; status becomes pending.
    Initialized {
        metadata: StageMetadata,
        disc: Option<u32>,
    },
    Started,
    Progress(u8),
    Completed,
    Failed(String),
}

/// Something that persists [`StateEvent`]s.
pub trait StateSink: Send {
    fn apply(&mut self, event: &StateEvent) -> impl Future<Output = Result<()>> + Send;
}

/// Writes `.rip/metadata.json` and `.rip/status`. Errors propagate.
#[derive(Debug, Clone)]
pub struct FsStateSink {
    dir: PathBuf,
}

impl FsStateSink {
    /// Sink for the stage directory `stage_dir` (the `.rip` dir goes inside).
    pub fn new(stage_dir: &Path) -> Self {
        Self {
            dir: layout::state_dir(stage_dir),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StateSink for FsStateSink {
    async fn apply(&mut self, event: &StateEvent) -> Result<()> {
        match event {
            StateEvent::Initialized { metadata, .. } => {
                std::fs::create_dir_all(&self.dir)
                    .with_context(|| format!("create {}", self.dir.display()))?;
                layout::write_metadata(&self.dir, metadata)?;
                layout::clear_error(&self.dir)?;
                layout::write_status(&self.dir, JobStatus::Pending)
            }
            StateEvent::Started => {
                layout::clear_error(&self.dir)?;
                layout::write_status(&self.dir, JobStatus::InProgress)
            }
            StateEvent::Progress(_) => Ok(()),
            StateEvent::Completed => layout::write_status(&self.dir, JobStatus::Completed),
            StateEvent::Failed(message) => {
                layout::write_error(&self.dir, message)?;
                layout::write_status(&self.dir, JobStatus::Failed)
            }
        }
    }
}

/// Mirrors transitions into the job store. Failures are logged, never returned.
#[derive(Debug, Clone)]
pub struct DbStateSink {
    db: PipelineDb,
    stage: Stage,
    output_dir: String,
    job_id: Option<JobId>,
}

impl DbStateSink {
    pub fn new(db: PipelineDb, stage: Stage, stage_dir: &Path) -> Self {
        Self {
            db,
            stage,
            output_dir: stage_dir.to_string_lossy().into_owned(),
            job_id: None,
        }
    }

    /// Report into an existing job instead of creating one on initialize.
    pub fn bind(&mut self, job_id: JobId) {
        self.job_id = Some(job_id);
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.job_id
    }

    async fn mirror(&mut self, event: &StateEvent) -> Result<()> {
        if let StateEvent::Initialized { metadata, disc } = event {
            match self.job_id {
                Some(id) => {
                    self.db
                        .set_job_dirs(id, None, Some(&self.output_dir))
                        .await?;
                }
                None => {
                    let id = self.create_job(metadata, *disc).await?;
                    self.job_id = Some(id);
                }
            }
            return Ok(());
        }
        let Some(id) = self.job_id else {
            tracing::debug!("no job bound; skipping database mirror of {:?}", event);
            return Ok(());
        };
        match event {
            StateEvent::Initialized { .. } => Ok(()),
            StateEvent::Started => self.db.update_job_status(id, JobStatus::InProgress, None).await,
            StateEvent::Progress(p) => self.db.update_job_progress(id, *p).await,
            StateEvent::Completed => self.db.update_job_status(id, JobStatus::Completed, None).await,
            StateEvent::Failed(msg) => {
                self.db
                    .update_job_status(id, JobStatus::Failed, Some(msg.as_str()))
                    .await
            }
        }
    }

    async fn create_job(&self, metadata: &StageMetadata, disc: Option<u32>) -> Result<JobId> {
        let media_type = metadata
            .media_type()
            .with_context(|| format!("unknown media type {:?}", metadata.media_type))?;
        let item = self
            .db
            .find_or_create_media_item(media_type, &metadata.name, &metadata.safe_name)
            .await?;
        let season_id = match (media_type, metadata.season_number()) {
            (MediaType::Tv, Some(number)) => {
                Some(self.db.find_or_create_season(item.id, number).await?.id)
            }
            _ => None,
        };
        let mut job = NewJob::new(item.id, self.stage);
        job.season_id = season_id;
        job.disc = disc;
        job.output_dir = Some(self.output_dir.clone());
        self.db.create_job(&job).await
    }
}

impl StateSink for DbStateSink {
    async fn apply(&mut self, event: &StateEvent) -> Result<()> {
        if let Err(e) = self.mirror(event).await {
            tracing::warn!(job_id = ?self.job_id, "database mirror update failed: {:#}", e);
        }
        Ok(())
    }
}
