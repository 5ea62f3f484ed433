//! Job write operations: create, status transitions, progress.

use anyhow::{bail, Context, Result};
use sqlx::Row;

use super::super::db::{unix_timestamp, PipelineDb};
use super::NewJob;
use crate::model::{ItemStatus, JobId, JobStatus, Stage};

impl PipelineDb {
    /// Insert a new pending job.
    pub async fn create_job(&self, job: &NewJob) -> Result<JobId> {
        let now = unix_timestamp();
        let id = sqlx::query(
            r#"
            INSERT INTO jobs (
                media_item_id, season_id, disc, stage, status,
                input_dir, output_dir, progress, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
            "#,
        )
        .bind(job.media_item_id)
        .bind(job.season_id)
        .bind(job.disc.map(i64::from))
        .bind(job.stage.as_str())
        .bind(JobStatus::Pending.as_str())
        .bind(&job.input_dir)
        .bind(&job.output_dir)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// Move a job to `status`, stamping the matching timestamps:
    /// in_progress sets `started_at` (first time only); completed and failed
    /// set `completed_at`; completed forces progress 100; failed stores
    /// `error_message`, which must be non-empty.
    ///
    /// Completed and failed are terminal. Moving a terminal job anywhere else
    /// is an error (a retry is a new job); repeating the same terminal status
    /// is a no-op.
    ///
    /// The owning item (and season) mirror the job's stage and status.
    pub async fn update_job_status(
        &self,
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        let message = error_message.map(str::trim).filter(|m| !m.is_empty());
        if status == JobStatus::Failed && message.is_none() {
            bail!("job {}: failed status requires an error message", id);
        }
        let now = unix_timestamp();
        let mut tx = self.pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar("SELECT status FROM jobs WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            bail!("job {} not found", id);
        };
        let current = JobStatus::parse(&current)
            .with_context(|| format!("job {} has unknown status {:?}", id, current))?;
        if current.is_terminal() {
            if current == status {
                return Ok(());
            }
            bail!(
                "job {} is {}; it cannot move to {} (create a new job to retry)",
                id,
                current.as_str(),
                status.as_str()
            );
        }

        sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?1,
                started_at = CASE WHEN ?1 = 'in_progress' THEN COALESCE(started_at, ?2) ELSE started_at END,
                completed_at = CASE WHEN ?1 IN ('completed', 'failed') THEN ?2 ELSE completed_at END,
                progress = CASE WHEN ?1 = 'completed' THEN 100 ELSE progress END,
                error_message = CASE WHEN ?1 = 'failed' THEN ?3 ELSE error_message END
            WHERE id = ?4
            "#,
        )
        .bind(status.as_str())
        .bind(now)
        .bind(message)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query("SELECT media_item_id, season_id, stage FROM jobs WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let item_id: i64 = row.get("media_item_id");
        let season_id: Option<i64> = row.get("season_id");
        let stage: String = row.get("stage");

        let item_status = if stage == Stage::Publish.as_str() && status == JobStatus::Completed {
            ItemStatus::Completed
        } else {
            ItemStatus::Active
        };
        sqlx::query(
            r#"
            UPDATE media_items
            SET current_stage = ?1,
                stage_status = ?2,
                status = ?3,
                updated_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&stage)
        .bind(status.as_str())
        .bind(item_status.as_str())
        .bind(now)
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

        if let Some(season_id) = season_id {
            sqlx::query(
                r#"
                UPDATE seasons
                SET current_stage = ?1,
                    stage_status = ?2,
                    updated_at = ?3
                WHERE id = ?4
                "#,
            )
            .bind(&stage)
            .bind(status.as_str())
            .bind(now)
            .bind(season_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Persist partial progress (clamped to 100).
    pub async fn update_job_progress(&self, id: JobId, progress: u8) -> Result<()> {
        sqlx::query("UPDATE jobs SET progress = ?1 WHERE id = ?2")
            .bind(i64::from(progress.min(100)))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_job_dirs(
        &self,
        id: JobId,
        input_dir: Option<&str>,
        output_dir: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET input_dir = COALESCE(?1, input_dir),
                output_dir = COALESCE(?2, output_dir)
            WHERE id = ?3
            "#,
        )
        .bind(input_dir)
        .bind(output_dir)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
