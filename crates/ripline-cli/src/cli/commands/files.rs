//! `ripline files` – per-file state of a transcode job.

use anyhow::{Context, Result};
use ripline_core::model::JobId;
use ripline_core::store::PipelineDb;
use ripline_core::transcode::TranscodeSummary;

pub async fn run_files(db: &PipelineDb, job_id: JobId) -> Result<()> {
    db.get_job(job_id)
        .await?
        .with_context(|| format!("job {} not found", job_id))?;
    let files = db.list_transcode_files(job_id).await?;
    if files.is_empty() {
        println!("No files recorded for job {}.", job_id);
        return Ok(());
    }
    println!("{:<6} {:<12} {:<5} {:>12} {:>12} {}", "ID", "STATUS", "PCT", "INPUT", "OUTPUT", "PATH");
    for f in &files {
        println!(
            "{:<6} {:<12} {:<5} {:>12} {:>12} {}",
            f.id,
            f.status.as_str(),
            format!("{}%", f.progress),
            f.input_size,
            f.output_size,
            f.relative_path
        );
        if let Some(err) = &f.error_message {
            println!("       error: {}", err);
        }
    }
    let summary = TranscodeSummary::from_files(&files);
    println!("{}", summary.counts_line());
    for event in db.list_log_events(job_id).await? {
        println!("[{}] {}", event.level, event.message);
    }
    Ok(())
}
