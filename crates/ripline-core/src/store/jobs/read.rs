//! Job read operations.

use anyhow::Result;

use super::super::db::PipelineDb;
use super::super::rows::{self, JOB_COLUMNS};
use crate::model::{ItemId, Job, JobId, Stage};

impl PipelineDb {
    pub async fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rows::job).transpose()
    }

    /// Jobs of one media item in creation order.
    pub async fn list_jobs_for_item(&self, item_id: ItemId) -> Result<Vec<Job>> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE media_item_id = ?1 ORDER BY created_at ASC, id ASC"
        );
        let found = sqlx::query(&sql)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;
        found.iter().map(rows::job).collect()
    }

    /// Every job in the store, oldest first.
    pub async fn list_all_jobs(&self) -> Result<Vec<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at ASC, id ASC");
        let found = sqlx::query(&sql).fetch_all(&self.pool).await?;
        found.iter().map(rows::job).collect()
    }

    /// Most recent job of an item, optionally restricted to one stage.
    pub async fn latest_job_for_item(
        &self,
        item_id: ItemId,
        stage: Option<Stage>,
    ) -> Result<Option<Job>> {
        let jobs = self.list_jobs_for_item(item_id).await?;
        Ok(jobs
            .into_iter()
            .rev()
            .find(|j| stage.map_or(true, |s| j.stage == s)))
    }
}
