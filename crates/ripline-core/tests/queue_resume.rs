//! Integration test: queue construction is idempotent and resumes cleanly.

mod common;

use ripline_core::model::{FileStatus, MediaType, Stage};
use ripline_core::store::NewJob;
use ripline_core::transcode::{
    build_queue, EngineOptions, PassthroughTransformer, TranscodeEngine,
};
use tempfile::tempdir;

#[tokio::test]
async fn build_queue_twice_creates_nothing_new() {
    let input = tempdir().unwrap();
    let state = tempdir().unwrap();
    for name in ["title_t00.mkv", "title_t01.mkv"] {
        std::fs::write(input.path().join(name), b"media").unwrap();
    }
    let db = common::open_db(state.path()).await;
    let item = db
        .create_media_item(MediaType::Movie, "Queue", "Queue")
        .await
        .unwrap();
    let job = db
        .create_job(&NewJob::new(item, Stage::Transcode))
        .await
        .unwrap();

    let first = build_queue(&db, job, input.path(), &PassthroughTransformer)
        .await
        .unwrap();
    let second = build_queue(&db, job, input.path(), &PassthroughTransformer)
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(db.list_transcode_files(job).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reopened_database_resumes_where_it_stopped() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    let state = tempdir().unwrap();
    for name in ["a.mkv", "b.mkv", "c.mkv"] {
        std::fs::write(input.path().join(name), vec![1u8; 64]).unwrap();
    }

    let (job, first_id) = {
        let db = common::open_db(state.path()).await;
        let item = db
            .create_media_item(MediaType::Movie, "Resume", "Resume")
            .await
            .unwrap();
        let job = db
            .create_job(&NewJob::new(item, Stage::Transcode))
            .await
            .unwrap();
        let queue = build_queue(&db, job, input.path(), &PassthroughTransformer)
            .await
            .unwrap();
        // Simulate a crash: first file done, second mid-flight.
        db.update_transcode_file_status(queue[0].id, FileStatus::InProgress, None)
            .await
            .unwrap();
        db.complete_transcode_file(queue[0].id, 64).await.unwrap();
        db.update_transcode_file_status(queue[1].id, FileStatus::InProgress, None)
            .await
            .unwrap();
        (job, queue[0].id)
    };

    let db = common::open_db(state.path()).await;
    let engine = TranscodeEngine::new(db.clone(), PassthroughTransformer, EngineOptions::default());
    let report = engine.run(job, input.path(), output.path()).await.unwrap();
    assert!(report.last_error.is_none());
    assert_eq!(report.summary.completed, 3);

    // The file finished before the crash was not redone.
    assert!(!output.path().join("a.mkv").exists());
    assert!(output.path().join("b.mkv").exists());
    assert!(output.path().join("c.mkv").exists());
    let first = db.get_transcode_file(first_id).await.unwrap().unwrap();
    assert_eq!(first.output_size, 64);
}
