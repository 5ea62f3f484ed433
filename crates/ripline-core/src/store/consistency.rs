//! Store-wide invariant check over every persisted job.

use anyhow::Result;

use super::db::PipelineDb;
use crate::model::ConsistencyError;

impl PipelineDb {
    /// Every job that breaks a status invariant. Never repairs anything.
    pub async fn job_consistency_report(&self) -> Result<Vec<ConsistencyError>> {
        let jobs = self.list_all_jobs().await?;
        Ok(jobs
            .iter()
            .filter_map(|job| job.check_consistency().err())
            .collect())
    }

    /// Fails with the first violation found, naming the job.
    pub async fn assert_job_status_consistency(&self) -> Result<()> {
        if let Some(first) = self.job_consistency_report().await?.into_iter().next() {
            return Err(first.into());
        }
        Ok(())
    }
}
