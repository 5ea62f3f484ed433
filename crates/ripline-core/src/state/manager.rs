use anyhow::Result;
use std::path::Path;

use super::layout::StageMetadata;
use super::sink::{DbStateSink, FsStateSink, StateEvent, StateSink};
use crate::model::{JobId, Stage};
use crate::store::PipelineDb;

/// Dual-write front end: the filesystem first, then the optional database.
///
/// There is no atomicity across the two. A crash between the writes leaves
/// the database behind, and readers treat `.rip/status` as ground truth.
#[derive(Debug, Clone)]
pub struct StateManager {
    fs: FsStateSink,
    db: Option<DbStateSink>,
}

impl StateManager {
    pub fn build(fs_root: &Path, stage: Stage, db: Option<PipelineDb>) -> Self {
        Self {
            fs: FsStateSink::new(fs_root),
            db: db.map(|db| DbStateSink::new(db, stage, fs_root)),
        }
    }

    /// Mirror into an existing job. No effect without a database.
    pub fn with_job(mut self, job_id: JobId) -> Self {
        if let Some(db) = &mut self.db {
            db.bind(job_id);
        }
        self
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.db.as_ref().and_then(DbStateSink::job_id)
    }

    pub fn state_dir(&self) -> &Path {
        self.fs.dir()
    }

    pub async fn emit(&mut self, event: StateEvent) -> Result<()> {
        self.fs.apply(&event).await?;
        if let Some(db) = &mut self.db {
            db.apply(&event).await?;
        }
        Ok(())
    }

    pub async fn initialize(&mut self, metadata: StageMetadata, disc: Option<u32>) -> Result<()> {
        self.emit(StateEvent::Initialized { metadata, disc }).await
    }

    pub async fn start(&mut self) -> Result<()> {
        self.emit(StateEvent::Started).await
    }

    pub async fn progress(&mut self, percent: u8) -> Result<()> {
        self.emit(StateEvent::Progress(percent)).await
    }

    pub async fn complete(&mut self) -> Result<()> {
        self.emit(StateEvent::Completed).await
    }

    pub async fn fail(&mut self, message: &str) -> Result<()> {
        self.emit(StateEvent::Failed(message.to_string())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JobStatus, MediaType};
    use crate::state::{read_metadata, read_status, validate_rip_dir, ERROR_FILE};
    use crate::store::open_memory;

    fn movie() -> StageMetadata {
        StageMetadata::new(MediaType::Movie, "Big Buck Bunny", "Big_Buck_Bunny", None)
    }

    #[tokio::test]
    async fn filesystem_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = StateManager::build(dir.path(), Stage::Rip, None);
        state.initialize(movie(), None).await.unwrap();
        assert_eq!(read_status(state.state_dir()).unwrap(), JobStatus::Pending);
        state.start().await.unwrap();
        state.progress(50).await.unwrap();
        state.complete().await.unwrap();

        assert_eq!(state.job_id(), None);
        assert_eq!(read_status(state.state_dir()).unwrap(), JobStatus::Completed);
        assert_eq!(read_metadata(state.state_dir()).unwrap(), movie());
        assert!(validate_rip_dir(state.state_dir()).is_empty());
    }

    #[tokio::test]
    async fn mirrors_into_a_new_job() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_memory().await.unwrap();
        let mut state = StateManager::build(dir.path(), Stage::Rip, Some(db.clone()));
        let meta = StageMetadata::new(MediaType::Tv, "The Simpsons", "The_Simpsons", Some(1));
        state.initialize(meta, Some(2)).await.unwrap();
        let id = state.job_id().unwrap();

        let job = db.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.disc, Some(2));
        assert!(job.season_id.is_some());
        assert_eq!(job.output_dir.as_deref(), Some(&*dir.path().to_string_lossy()));

        state.start().await.unwrap();
        state.progress(45).await.unwrap();
        state.fail("Copy failed").await.unwrap();

        let job = db.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.progress, 45);
        assert_eq!(job.error_message.as_deref(), Some("Copy failed"));
        assert_eq!(read_status(state.state_dir()).unwrap(), JobStatus::Failed);
        assert_eq!(
            std::fs::read_to_string(state.state_dir().join(ERROR_FILE)).unwrap(),
            "Copy failed"
        );
        db.assert_job_status_consistency().await.unwrap();
    }

    #[tokio::test]
    async fn database_failure_does_not_block_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_memory().await.unwrap();
        let mut state = StateManager::build(dir.path(), Stage::Rip, Some(db)).with_job(999);
        state.initialize(movie(), None).await.unwrap();
        state.start().await.unwrap();
        state.complete().await.unwrap();
        assert_eq!(read_status(state.state_dir()).unwrap(), JobStatus::Completed);
    }
}
