//! Stage dispatch: turn a finished job into the next stage's job and run
//! transcode jobs end to end.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::model::{JobId, JobStatus, Stage};
use crate::naming::staging_path;
use crate::state::{StageMetadata, StateManager};
use crate::store::{NewJob, PipelineDb};
use crate::transcode::{TranscodeEngine, TranscodeSummary, Transformer};

/// Creates a pending transcode job that reads the output of `source_job`.
pub async fn queue_transcode_job(db: &PipelineDb, media_base: &Path, source_job: JobId) -> Result<JobId> {
    let source = db
        .get_job(source_job)
        .await?
        .with_context(|| format!("job {} not found", source_job))?;
    if source.stage >= Stage::Transcode {
        bail!("job {} is a {} job; nothing to transcode from", source.id, source.stage.as_str());
    }
    if source.status != JobStatus::Completed {
        bail!("job {} is {}, not completed", source.id, source.status.as_str());
    }
    let input_dir = source
        .output_dir
        .clone()
        .with_context(|| format!("job {} has no output directory", source.id))?;
    let item = db
        .get_media_item(source.media_item_id)
        .await?
        .with_context(|| format!("media item {} not found", source.media_item_id))?;
    let season = match source.season_id {
        Some(id) => db.get_season(id).await?.map(|s| s.number),
        None => None,
    };
    let output_dir = staging_path(
        media_base,
        Stage::Transcode,
        item.media_type,
        &item.safe_name,
        season,
        source.disc,
    );

    let mut job = NewJob::new(item.id, Stage::Transcode);
    job.season_id = source.season_id;
    job.disc = source.disc;
    job.input_dir = Some(input_dir);
    job.output_dir = Some(output_dir.to_string_lossy().into_owned());
    let id = db.create_job(&job).await?;
    tracing::info!(job_id = id, "queued transcode of job {}", source.id);
    Ok(id)
}

/// Creates a fresh pending job that repeats a failed transcode job with the
/// same input and output directories. The failed job stays as it is.
pub async fn retry_transcode_job(db: &PipelineDb, failed_job: JobId) -> Result<JobId> {
    let failed = db
        .get_job(failed_job)
        .await?
        .with_context(|| format!("job {} not found", failed_job))?;
    if failed.stage != Stage::Transcode {
        bail!("job {} is a {} job, not transcode", failed.id, failed.stage.as_str());
    }
    if failed.status != JobStatus::Failed {
        bail!("job {} is {}, not failed", failed.id, failed.status.as_str());
    }
    let mut job = NewJob::new(failed.media_item_id, Stage::Transcode);
    job.season_id = failed.season_id;
    job.disc = failed.disc;
    job.input_dir = failed.input_dir.clone();
    job.output_dir = failed.output_dir.clone();
    let id = db.create_job(&job).await?;
    tracing::info!(job_id = id, "retrying failed transcode job {}", failed.id);
    Ok(id)
}

/// Runs a transcode job and settles its status.
///
/// Re-running a pending or interrupted job resumes it; completed files are
/// not touched again. A completed job is left alone and its stored summary
/// returned. A failed job is refused: retry it with
/// [`retry_transcode_job`].
pub async fn run_transcode_job<T: Transformer>(
    db: &PipelineDb,
    engine: &TranscodeEngine<T>,
    job_id: JobId,
) -> Result<TranscodeSummary> {
    let job = db
        .get_job(job_id)
        .await?
        .with_context(|| format!("job {} not found", job_id))?;
    if job.stage != Stage::Transcode {
        bail!("job {} is a {} job, not transcode", job.id, job.stage.as_str());
    }
    if job.status == JobStatus::Completed {
        tracing::info!(job_id, "job already completed");
        let files = db.list_transcode_files(job_id).await?;
        return Ok(TranscodeSummary::from_files(&files));
    }
    if job.status == JobStatus::Failed {
        bail!(
            "job {} failed ({}); create a new job to retry it",
            job.id,
            job.error_message.as_deref().unwrap_or("no message")
        );
    }
    let input_dir = PathBuf::from(job.input_dir.as_deref().context("job has no input directory")?);
    let output_dir = PathBuf::from(job.output_dir.as_deref().context("job has no output directory")?);
    if !input_dir.is_dir() {
        bail!("input directory {} does not exist", input_dir.display());
    }

    let item = db
        .get_media_item(job.media_item_id)
        .await?
        .with_context(|| format!("media item {} not found", job.media_item_id))?;
    let season = match job.season_id {
        Some(id) => db.get_season(id).await?.map(|s| s.number),
        None => None,
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;
    let mut state = StateManager::build(&output_dir, Stage::Transcode, Some(db.clone())).with_job(job_id);
    let metadata = StageMetadata::new(item.media_type, &item.name, &item.safe_name, season);
    state.initialize(metadata, job.disc).await?;
    state.start().await?;

    let report = match engine.run(job_id, &input_dir, &output_dir).await {
        Ok(report) => report,
        Err(e) => {
            state.fail(&format!("{:#}", e)).await?;
            return Err(e);
        }
    };
    match &report.last_error {
        Some(msg) => state.fail(msg).await?,
        None => state.complete().await?,
    }
    report.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Materialize, MockOptions, ProfileRegistry};
    use crate::model::FileStatus;
    use crate::ripper::{MockRipSource, RipRequest, Ripper};
    use crate::state::read_status;
    use crate::store::open_memory;
    use crate::transcode::{EngineOptions, PassthroughTransformer};

    #[tokio::test]
    async fn rip_then_transcode() {
        let base = tempfile::tempdir().unwrap();
        let db = open_memory().await.unwrap();
        let options = MockOptions {
            materialize: Materialize::Placeholder,
            ..MockOptions::default()
        };
        let source = MockRipSource::new(ProfileRegistry::builtin(), "big_buck_bunny", options);
        let rip = Ripper::new(source, base.path(), Some(db.clone()))
            .rip(&RipRequest::movie("Big Buck Bunny"))
            .await
            .unwrap();

        let job = queue_transcode_job(&db, base.path(), rip.job_id.unwrap())
            .await
            .unwrap();
        let engine = TranscodeEngine::new(db.clone(), PassthroughTransformer, EngineOptions::default());
        let summary = run_transcode_job(&db, &engine, job).await.unwrap();
        assert_eq!(summary.completed, 3);

        let stored = db.get_job(job).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Completed);
        let out = base.path().join("staging/3-transcoded/movies/Big_Buck_Bunny");
        assert_eq!(stored.output_dir.as_deref(), Some(&*out.to_string_lossy()));
        assert!(out.join("title_t01.mkv").exists());
        assert_eq!(read_status(&out.join(".rip")).unwrap(), JobStatus::Completed);
        assert!(db
            .list_transcode_files(job)
            .await
            .unwrap()
            .iter()
            .all(|f| f.status == FileStatus::Completed));

        let item = db.get_media_item(stored.media_item_id).await.unwrap().unwrap();
        assert_eq!(item.current_stage, Stage::Transcode);
        db.assert_job_status_consistency().await.unwrap();

        // Running again is a no-op.
        let again = run_transcode_job(&db, &engine, job).await.unwrap();
        assert_eq!(again.completed, 3);
    }

    #[tokio::test]
    async fn failed_job_is_retried_as_a_new_job() {
        let base = tempfile::tempdir().unwrap();
        let input = base.path().join("in");
        let output = base.path().join("out");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("title_t00.mkv"), b"feature").unwrap();

        let db = open_memory().await.unwrap();
        let item = db
            .create_media_item(crate::model::MediaType::Movie, "Feature", "Feature")
            .await
            .unwrap();
        let mut new_job = NewJob::new(item, Stage::Transcode);
        new_job.input_dir = Some(input.to_string_lossy().into_owned());
        new_job.output_dir = Some(output.to_string_lossy().into_owned());
        let failed = db.create_job(&new_job).await.unwrap();
        db.update_job_status(failed, JobStatus::InProgress, None)
            .await
            .unwrap();
        db.update_job_status(failed, JobStatus::Failed, Some("ffmpeg failed with exit code 1"))
            .await
            .unwrap();

        let engine = TranscodeEngine::new(db.clone(), PassthroughTransformer, EngineOptions::default());
        let err = run_transcode_job(&db, &engine, failed).await.unwrap_err();
        assert!(err.to_string().contains("create a new job"), "{err}");
        assert_eq!(db.get_job(failed).await.unwrap().unwrap().status, JobStatus::Failed);

        let retry = retry_transcode_job(&db, failed).await.unwrap();
        assert_ne!(retry, failed);
        let summary = run_transcode_job(&db, &engine, retry).await.unwrap();
        assert_eq!(summary.completed, 1);
        assert!(output.join("title_t00.mkv").exists());

        let old = db.get_job(failed).await.unwrap().unwrap();
        assert_eq!(old.status, JobStatus::Failed);
        assert_eq!(old.error_message.as_deref(), Some("ffmpeg failed with exit code 1"));
        assert_eq!(db.get_job(retry).await.unwrap().unwrap().status, JobStatus::Completed);
        assert!(retry_transcode_job(&db, retry).await.is_err());
        db.assert_job_status_consistency().await.unwrap();
    }

    #[tokio::test]
    async fn refuses_unfinished_source() {
        let db = open_memory().await.unwrap();
        let item = db
            .create_media_item(crate::model::MediaType::Movie, "M", "M")
            .await
            .unwrap();
        let rip = db.create_job(&NewJob::new(item, Stage::Rip)).await.unwrap();
        assert!(queue_transcode_job(&db, Path::new("/tmp"), rip).await.is_err());
    }
}
