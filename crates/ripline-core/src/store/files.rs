//! Transcode file records.

use anyhow::{bail, Context, Result};

use super::db::{unix_timestamp, PipelineDb};
use super::rows::{self, FILE_COLUMNS};
use crate::model::{FileId, FileStatus, JobId, TranscodeFile};

/// A newly discovered file. Starts `pending`.
#[derive(Debug, Clone)]
pub struct NewTranscodeFile {
    pub job_id: JobId,
    pub relative_path: String,
    pub input_size: u64,
    pub duration_secs: f64,
}

impl PipelineDb {
    /// Insert a file record and return it. `(job_id, relative_path)` is unique.
    pub async fn create_transcode_file(&self, file: &NewTranscodeFile) -> Result<TranscodeFile> {
        let id = sqlx::query(
            r#"
            INSERT INTO transcode_files (job_id, relative_path, status, input_size, duration_secs)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(file.job_id)
        .bind(&file.relative_path)
        .bind(FileStatus::Pending.as_str())
        .bind(file.input_size as i64)
        .bind(file.duration_secs)
        .execute(&self.pool)
        .await
        .with_context(|| {
            format!(
                "insert transcode file {:?} for job {}",
                file.relative_path, file.job_id
            )
        })?
        .last_insert_rowid();
        self.get_transcode_file(id)
            .await?
            .context("transcode file vanished after insert")
    }

    pub async fn get_transcode_file(&self, id: FileId) -> Result<Option<TranscodeFile>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM transcode_files WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rows::transcode_file).transpose()
    }

    /// All files of a job in discovery order.
    pub async fn list_transcode_files(&self, job_id: JobId) -> Result<Vec<TranscodeFile>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM transcode_files WHERE job_id = ?1 ORDER BY id ASC");
        let found = sqlx::query(&sql)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?;
        found.iter().map(rows::transcode_file).collect()
    }

    async fn transcode_file_status(&self, id: FileId) -> Result<FileStatus> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM transcode_files WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let status = status.with_context(|| format!("transcode file {} not found", id))?;
        FileStatus::parse(&status)
            .with_context(|| format!("transcode file {} has unknown status {:?}", id, status))
    }

    /// Status transition with timestamps. Entering in_progress restarts the
    /// attempt (new `started_at`, cleared error); completed, failed, and
    /// skipped stamp `completed_at`. Failed requires a message.
    ///
    /// Only forward moves are accepted (see [`FileStatus::can_move_to`]);
    /// repeating completed or skipped is a no-op.
    pub async fn update_transcode_file_status(
        &self,
        id: FileId,
        status: FileStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        let message = error_message.map(str::trim).filter(|m| !m.is_empty());
        if status == FileStatus::Failed && message.is_none() {
            bail!("transcode file {}: failed status requires an error message", id);
        }
        let current = self.transcode_file_status(id).await?;
        if current == status && matches!(status, FileStatus::Completed | FileStatus::Skipped) {
            return Ok(());
        }
        if !current.can_move_to(status) {
            bail!(
                "transcode file {} is {}; it cannot move to {}",
                id,
                current.as_str(),
                status.as_str()
            );
        }
        let now = unix_timestamp();
        let updated = sqlx::query(
            r#"
            UPDATE transcode_files
            SET status = ?1,
                started_at = CASE WHEN ?1 = 'in_progress' THEN ?2 ELSE started_at END,
                completed_at = CASE
                    WHEN ?1 = 'in_progress' THEN NULL
                    WHEN ?1 IN ('completed', 'failed', 'skipped') THEN ?2
                    ELSE completed_at
                END,
                progress = CASE WHEN ?1 = 'in_progress' THEN 0 ELSE progress END,
                error_message = CASE
                    WHEN ?1 = 'failed' THEN ?3
                    WHEN ?1 = 'skipped' THEN COALESCE(?3, error_message)
                    ELSE NULL
                END
            WHERE id = ?4
            "#,
        )
        .bind(status.as_str())
        .bind(now)
        .bind(message)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 0 {
            bail!("transcode file {} not found", id);
        }
        Ok(())
    }

    pub async fn update_transcode_file_progress(&self, id: FileId, progress: u8) -> Result<()> {
        sqlx::query("UPDATE transcode_files SET progress = ?1 WHERE id = ?2")
            .bind(i64::from(progress.min(100)))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record a successful transform: output size, progress 100, completed.
    pub async fn complete_transcode_file(&self, id: FileId, output_size: u64) -> Result<()> {
        let current = self.transcode_file_status(id).await?;
        if !current.can_move_to(FileStatus::Completed) {
            bail!("transcode file {} is {}; it cannot complete", id, current.as_str());
        }
        sqlx::query(
            r#"
            UPDATE transcode_files
            SET status = 'completed',
                output_size = ?1,
                progress = 100,
                completed_at = ?2,
                error_message = NULL
            WHERE id = ?3
            "#,
        )
        .bind(output_size as i64)
        .bind(unix_timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
