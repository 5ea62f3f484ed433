//! `ripline check` – re-validate every stored job.

use anyhow::{bail, Result};
use ripline_core::store::PipelineDb;

pub async fn run_check(db: &PipelineDb) -> Result<()> {
    let problems = db.job_consistency_report().await?;
    if problems.is_empty() {
        println!("All jobs consistent.");
        return Ok(());
    }
    for p in &problems {
        println!("  - {}", p);
    }
    bail!("{} inconsistent job(s)", problems.len())
}
