//! `ripline rip` – rip a disc into staging and record the job.

use anyhow::{Context, Result};
use ripline_core::config::RiplineConfig;
use ripline_core::mock::Materialize;
use ripline_core::ripper::{MockRipSource, ProcessRipSource, RipRequest, RipResult, RipSource, Ripper};
use ripline_core::store::PipelineDb;

use super::mock::{load_registry, mock_options};
use crate::cli::RipArgs;

/// Builds the request from flags, or from the stored job with `--job`.
async fn request_for(db: &PipelineDb, args: &RipArgs) -> Result<RipRequest> {
    if let Some(job_id) = args.job {
        let job = db
            .get_job(job_id)
            .await?
            .with_context(|| format!("job {} not found", job_id))?;
        let item = db
            .get_media_item(job.media_item_id)
            .await?
            .with_context(|| format!("media item {} not found", job.media_item_id))?;
        let season = match job.season_id {
            Some(id) => db.get_season(id).await?.map(|s| s.number),
            None => None,
        };
        return Ok(RipRequest {
            media_type: item.media_type,
            name: item.name,
            season,
            disc: job.disc,
            disc_path: args.disc_path.clone(),
            job_id: Some(job_id),
        });
    }
    let media_type = args.media_type.context("--type is required")?;
    let name = args.name.clone().context("--name is required")?;
    Ok(RipRequest {
        media_type,
        name,
        season: args.season,
        disc: args.disc,
        disc_path: args.disc_path.clone(),
        job_id: None,
    })
}

async fn rip_with<S: RipSource>(source: S, cfg: &RiplineConfig, db: &PipelineDb, req: &RipRequest) -> Result<RipResult> {
    Ripper::new(source, &cfg.media_base, Some(db.clone()))
        .rip(req)
        .await
}

pub async fn run_rip(cfg: &RiplineConfig, db: &PipelineDb, args: &RipArgs) -> Result<()> {
    let req = request_for(db, args).await?;
    let result = match &args.mock {
        Some(profile) => {
            let materialize = if args.synthetic {
                Materialize::Synthetic {
                    ffmpeg: cfg.ffmpeg_path.clone(),
                }
            } else {
                Materialize::Placeholder
            };
            let source = MockRipSource::new(load_registry(cfg)?, profile, mock_options(cfg, None, materialize));
            rip_with(source, cfg, db, &req).await?
        }
        None => rip_with(ProcessRipSource::new(&cfg.makemkvcon_path), cfg, db, &req).await?,
    };

    println!("Ripped {} ({} titles)", result.disc.name, result.disc.titles.len());
    if let Some(main) = result.disc.main_title() {
        println!("Main title: {} ({})", main.index, main.name);
    }
    println!("Output: {}", result.output_dir.display());
    if let Some(id) = result.job_id {
        println!("Job: {}", id);
    }
    Ok(())
}
