//! Per-job log events shown by `ripline status`.

use anyhow::Result;
use sqlx::Row;

use super::db::{unix_timestamp, PipelineDb};
use crate::model::JobId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub job_id: JobId,
    pub level: String,
    pub message: String,
    pub created_at: i64,
}

impl PipelineDb {
    pub async fn add_log_event(&self, job_id: JobId, level: &str, message: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO log_events (job_id, level, message, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(job_id)
        .bind(level)
        .bind(message)
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Events of a job, oldest first.
    pub async fn list_log_events(&self, job_id: JobId) -> Result<Vec<LogEvent>> {
        let found = sqlx::query(
            r#"
            SELECT job_id, level, message, created_at
            FROM log_events
            WHERE job_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(found
            .iter()
            .map(|row| LogEvent {
                job_id: row.get("job_id"),
                level: row.get("level"),
                message: row.get("message"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
