use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::source::RipSource;
use crate::model::{JobId, MediaType, Stage};
use crate::naming::{safe_name, staging_path};
use crate::progress::ProgressGate;
use crate::protocol::{DiscInfo, DiscParser};
use crate::state::{StageMetadata, StateManager};
use crate::store::PipelineDb;

const LINE_BUFFER: usize = 256;

/// What to rip and where it belongs.
#[derive(Debug, Clone)]
pub struct RipRequest {
    pub media_type: MediaType,
    pub name: String,
    pub season: Option<u32>,
    pub disc: Option<u32>,
    /// makemkvcon source, e.g. `disc:0` or `dev:/dev/sr0`.
    pub disc_path: String,
    /// Report into this job instead of creating a new one.
    pub job_id: Option<JobId>,
}

impl RipRequest {
    pub fn movie(name: &str) -> Self {
        Self {
            media_type: MediaType::Movie,
            name: name.to_string(),
            season: None,
            disc: None,
            disc_path: "disc:0".to_string(),
            job_id: None,
        }
    }

    pub fn tv(name: &str, season: u32, disc: u32) -> Self {
        Self {
            media_type: MediaType::Tv,
            season: Some(season),
            disc: Some(disc),
            ..Self::movie(name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct RipResult {
    pub job_id: Option<JobId>,
    pub output_dir: PathBuf,
    pub disc: DiscInfo,
}

/// Drives one rip from a [`RipSource`].
pub struct Ripper<S> {
    source: S,
    media_base: PathBuf,
    db: Option<PipelineDb>,
}

impl<S: RipSource> Ripper<S> {
    pub fn new(source: S, media_base: impl Into<PathBuf>, db: Option<PipelineDb>) -> Self {
        Self {
            source,
            media_base: media_base.into(),
            db,
        }
    }

    /// Rips into the staging directory for the request.
    ///
    /// Success needs both the completion notice in the transcript and a
    /// successful exit. Anything else marks the stage failed with the
    /// failure notices the producer sent.
    pub async fn rip(&self, req: &RipRequest) -> Result<RipResult> {
        let safe = safe_name(&req.name);
        if safe.is_empty() {
            bail!("name {:?} has no filesystem-safe characters", req.name);
        }
        if req.media_type == MediaType::Tv && req.season.is_none() {
            bail!("TV rips need a season number");
        }
        if let (Some(id), Some(db)) = (req.job_id, &self.db) {
            let job = db
                .get_job(id)
                .await?
                .with_context(|| format!("job {} not found", id))?;
            if job.status.is_terminal() {
                bail!("job {} is already {}; start a new rip to retry", id, job.status.as_str());
            }
        }
        let output_dir = staging_path(
            &self.media_base,
            Stage::Rip,
            req.media_type,
            &safe,
            req.season,
            req.disc,
        );
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("create {}", output_dir.display()))?;

        let mut state = StateManager::build(&output_dir, Stage::Rip, self.db.clone());
        if let Some(id) = req.job_id {
            state = state.with_job(id);
        }
        let metadata = StageMetadata::new(req.media_type, &req.name, &safe, req.season);
        state.initialize(metadata, req.disc).await?;
        state.start().await?;
        let job_id = state.job_id();
        tracing::info!(job_id, "ripping {} into {}", req.disc_path, output_dir.display());

        let (tx, mut rx) = mpsc::channel::<String>(LINE_BUFFER);
        let produce = self.source.run(&req.disc_path, &output_dir, tx);
        let consume = async {
            let mut parser = DiscParser::new();
            let mut gate = ProgressGate::new(|_p: u8| {});
            while let Some(line) = rx.recv().await {
                if let Some(p) = parser.feed_line(&line) {
                    if gate.offer(p) {
                        tracing::debug!(job_id, "rip progress {}%", p);
                        state.progress(p).await?;
                    }
                }
            }
            Ok::<_, anyhow::Error>(parser)
        };
        let (exit, parsed) = tokio::join!(produce, consume);

        let parser = match parsed {
            Ok(parser) => parser,
            Err(e) => {
                state.fail(&format!("{:#}", e)).await?;
                return Err(e);
            }
        };
        let exited_ok = match exit {
            Ok(ok) => ok,
            Err(e) => {
                state.fail(&format!("{:#}", e)).await?;
                return Err(e);
            }
        };

        if parser.is_complete() && exited_ok {
            state.complete().await?;
            let disc = parser.into_disc();
            tracing::info!(
                job_id,
                "rip complete: {} ({} titles)",
                disc.name,
                disc.titles.len()
            );
            return Ok(RipResult {
                job_id,
                output_dir,
                disc,
            });
        }

        let failures = parser.failures();
        let message = if !failures.is_empty() {
            failures.join("; ")
        } else if !exited_ok {
            "makemkvcon exited with an error".to_string()
        } else {
            "rip ended without a completion notice".to_string()
        };
        tracing::warn!(job_id, "rip failed at {}%: {}", parser.overall_progress(), message);
        state.fail(&message).await?;
        bail!("rip failed: {}", message)
    }
}
