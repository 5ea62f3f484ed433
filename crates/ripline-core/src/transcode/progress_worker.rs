//! Background task that persists per-file progress.

use tokio::sync::mpsc;

use crate::model::{FileId, JobId};
use crate::store::PipelineDb;

/// Receives gated percentages and writes them to the file record. Spawn this
/// with tokio::spawn; it ends when every sender is dropped.
pub(super) async fn run_progress_persistence_loop(
    mut progress_rx: mpsc::UnboundedReceiver<u8>,
    db: PipelineDb,
    job_id: JobId,
    file_id: FileId,
) {
    while let Some(percent) = progress_rx.recv().await {
        if db
            .update_transcode_file_progress(file_id, percent)
            .await
            .is_err()
        {
            tracing::warn!(job_id, file_id, "durable progress update failed");
        }
    }
}

/// Starts the loop for one file; returns the sender and the task handle.
pub(super) fn spawn_progress_worker(
    db: &PipelineDb,
    job_id: JobId,
    file_id: FileId,
) -> (mpsc::UnboundedSender<u8>, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_progress_persistence_loop(
        rx,
        db.clone(),
        job_id,
        file_id,
    ));
    (tx, handle)
}
