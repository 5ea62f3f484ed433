//! Row to model mapping shared by the read paths.

use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::model::{
    FileStatus, ItemStatus, Job, JobStatus, MediaItem, MediaType, Season, Stage, TranscodeFile,
};

pub(super) const ITEM_COLUMNS: &str =
    "id, type, name, safe_name, status, current_stage, stage_status, created_at, updated_at";

pub(super) const SEASON_COLUMNS: &str =
    "id, item_id, number, current_stage, stage_status, created_at, updated_at";

pub(super) const JOB_COLUMNS: &str = "id, media_item_id, season_id, disc, stage, status, \
     input_dir, output_dir, progress, started_at, completed_at, error_message, created_at";

pub(super) const FILE_COLUMNS: &str = "id, job_id, relative_path, status, input_size, \
     output_size, progress, duration_secs, started_at, completed_at, error_message";

pub(super) fn media_item(row: &SqliteRow) -> Result<MediaItem> {
    let type_str: String = row.get("type");
    let status_str: String = row.get("status");
    Ok(MediaItem {
        id: row.get("id"),
        media_type: MediaType::parse(&type_str)
            .ok_or_else(|| anyhow!("unknown media type {:?}", type_str))?,
        name: row.get("name"),
        safe_name: row.get("safe_name"),
        status: ItemStatus::from_str(&status_str),
        current_stage: stage(row.get("current_stage"))?,
        stage_status: job_status(row.get("stage_status"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

pub(super) fn season(row: &SqliteRow) -> Result<Season> {
    let number: i64 = row.get("number");
    Ok(Season {
        id: row.get("id"),
        item_id: row.get("item_id"),
        number: u32::try_from(number)?,
        current_stage: stage(row.get("current_stage"))?,
        stage_status: job_status(row.get("stage_status"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

pub(super) fn job(row: &SqliteRow) -> Result<Job> {
    let disc: Option<i64> = row.get("disc");
    Ok(Job {
        id: row.get("id"),
        media_item_id: row.get("media_item_id"),
        season_id: row.get("season_id"),
        disc: disc.map(u32::try_from).transpose()?,
        stage: stage(row.get("stage"))?,
        status: job_status(row.get("status"))?,
        input_dir: row.get("input_dir"),
        output_dir: row.get("output_dir"),
        progress: percent(row.get("progress")),
        started_at: row.get("started_at"),
        completed_at: row.get("completed_at"),
        error_message: row.get("error_message"),
        created_at: row.get("created_at"),
    })
}

pub(super) fn transcode_file(row: &SqliteRow) -> Result<TranscodeFile> {
    let status_str: String = row.get("status");
    let input_size: i64 = row.get("input_size");
    let output_size: i64 = row.get("output_size");
    Ok(TranscodeFile {
        id: row.get("id"),
        job_id: row.get("job_id"),
        relative_path: row.get("relative_path"),
        status: FileStatus::parse(&status_str)
            .ok_or_else(|| anyhow!("unknown file status {:?}", status_str))?,
        input_size: input_size.max(0) as u64,
        output_size: output_size.max(0) as u64,
        progress: percent(row.get("progress")),
        duration_secs: row.get("duration_secs"),
        started_at: row.get("started_at"),
        completed_at: row.get("completed_at"),
        error_message: row.get("error_message"),
    })
}

fn stage(s: String) -> Result<Stage> {
    Stage::parse(&s).ok_or_else(|| anyhow!("unknown stage {:?}", s))
}

fn job_status(s: String) -> Result<JobStatus> {
    JobStatus::parse(&s).ok_or_else(|| anyhow!("unknown job status {:?}", s))
}

fn percent(v: i64) -> u8 {
    v.clamp(0, 100) as u8
}
