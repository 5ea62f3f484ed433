//! `ripline status` – show media items and their jobs.

use anyhow::Result;
use ripline_core::store::PipelineDb;

pub async fn run_status(db: &PipelineDb) -> Result<()> {
    let items = db.list_media_items().await?;
    if items.is_empty() {
        println!("No media items in database.");
        return Ok(());
    }
    for item in items {
        println!(
            "{} [{}] {} ({}: {})",
            item.id,
            item.media_type.as_str(),
            item.name,
            item.current_stage.as_str(),
            item.stage_status.as_str()
        );
        println!("  {:<6} {:<10} {:<12} {:<5} {}", "JOB", "STAGE", "STATUS", "PCT", "ERROR");
        for job in db.list_jobs_for_item(item.id).await? {
            println!(
                "  {:<6} {:<10} {:<12} {:<5} {}",
                job.id,
                job.stage.as_str(),
                job.status.as_str(),
                format!("{}%", job.progress),
                job.error_message.as_deref().unwrap_or("")
            );
        }
    }
    Ok(())
}
