//! `ripline transcode` – run or resume a transcode job.

use anyhow::{Context, Result};
use ripline_core::cancel::CancelToken;
use ripline_core::config::{RiplineConfig, TranscodeMode};
use ripline_core::model::{JobId, JobStatus};
use ripline_core::pipeline::{queue_transcode_job, retry_transcode_job, run_transcode_job};
use ripline_core::store::PipelineDb;
use ripline_core::transcode::{
    EngineOptions, FfmpegTransformer, PassthroughTransformer, TranscodeEngine, TranscodeSummary,
    Transformer,
};

use crate::cli::TranscodeArgs;

async fn run_with<T: Transformer>(
    db: &PipelineDb,
    transformer: T,
    options: EngineOptions,
    job: JobId,
) -> Result<TranscodeSummary> {
    let cancel = CancelToken::new();
    cancel.cancel_on_ctrl_c();
    let engine = TranscodeEngine::new(db.clone(), transformer, options).with_cancel(cancel);
    run_transcode_job(db, &engine, job).await
}

/// A failed job is never reopened; it is repeated as a new job.
async fn retry_if_failed(db: &PipelineDb, job: JobId) -> Result<JobId> {
    let stored = db
        .get_job(job)
        .await?
        .with_context(|| format!("job {} not found", job))?;
    if stored.status != JobStatus::Failed {
        return Ok(job);
    }
    let retry = retry_transcode_job(db, job).await?;
    println!("Job {} failed; retrying as job {}", job, retry);
    Ok(retry)
}

pub async fn run_transcode(cfg: &RiplineConfig, db: &PipelineDb, args: &TranscodeArgs) -> Result<()> {
    let job = match (args.job, args.from_job) {
        (Some(job), _) => retry_if_failed(db, job).await?,
        (None, Some(source)) => {
            let job = queue_transcode_job(db, &cfg.media_base, source).await?;
            println!("Created transcode job {}", job);
            job
        }
        (None, None) => return Err(anyhow::anyhow!("--job or --from-job is required")),
    };

    let mut options = EngineOptions::from_config(cfg);
    if args.hardware {
        options.transcode.mode = TranscodeMode::Hardware;
    }
    let result = if args.skip_transform {
        run_with(db, PassthroughTransformer, options, job).await
    } else {
        run_with(db, FfmpegTransformer::from_config(cfg), options, job).await
    };
    let summary = result.with_context(|| format!("transcode job {}", job))?;
    println!("{}", summary.counts_line());
    println!("{}", summary.bytes_line());
    Ok(())
}
