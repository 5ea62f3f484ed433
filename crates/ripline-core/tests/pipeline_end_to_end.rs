//! Integration test: mock rip feeding the transcode engine, on a real SQLite file.

mod common;

use ripline_core::model::{FileStatus, JobStatus, Stage};
use ripline_core::pipeline::{queue_transcode_job, run_transcode_job};
use ripline_core::ripper::{RipRequest, Ripper};
use ripline_core::state::validate_rip_dir;
use ripline_core::transcode::{EngineOptions, PassthroughTransformer, TranscodeEngine};
use tempfile::tempdir;

#[tokio::test]
async fn big_buck_bunny_rips_and_transcodes() {
    let media = tempdir().unwrap();
    let state = tempdir().unwrap();
    let db = common::open_db(state.path()).await;

    let rip = Ripper::new(
        common::placeholder_source("big_buck_bunny"),
        media.path(),
        Some(db.clone()),
    )
    .rip(&RipRequest::movie("Big Buck Bunny"))
    .await
    .expect("rip");
    assert_eq!(rip.disc.titles.len(), 3);
    assert_eq!(rip.disc.main_title().map(|t| t.index), Some(0));
    assert!(validate_rip_dir(&rip.output_dir.join(".rip")).is_empty());

    let rip_job = rip.job_id.expect("rip job");
    let transcode_job = queue_transcode_job(&db, media.path(), rip_job)
        .await
        .unwrap();
    let engine = TranscodeEngine::new(db.clone(), PassthroughTransformer, EngineOptions::default());
    let summary = run_transcode_job(&db, &engine, transcode_job)
        .await
        .expect("transcode job should succeed");
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.failed, 0);

    let files = db.list_transcode_files(transcode_job).await.unwrap();
    assert_eq!(files.len(), 3);
    for f in &files {
        assert_eq!(f.status, FileStatus::Completed, "{}", f.relative_path);
        assert_eq!(f.progress, 100);
        assert!(f.completed_at.is_some());
    }

    let jobs = db.list_all_jobs().await.unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.status == JobStatus::Completed));
    assert_eq!(jobs[1].stage, Stage::Transcode);
    db.assert_job_status_consistency().await.unwrap();
}

#[tokio::test]
async fn problem_disc_fails_without_completion() {
    let media = tempdir().unwrap();
    let state = tempdir().unwrap();
    let db = common::open_db(state.path()).await;

    let err = Ripper::new(
        common::placeholder_source("problem_disc"),
        media.path(),
        Some(db.clone()),
    )
    .rip(&RipRequest::movie("Problem Disc"))
    .await
    .unwrap_err();
    assert!(format!("{:#}", err).contains("Read error at 45%"));

    let jobs = db.list_all_jobs().await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
    assert!(!jobs[0].error_message.as_deref().unwrap_or("").is_empty());
    assert!(jobs[0].progress > 0 && jobs[0].progress <= 45);
    db.assert_job_status_consistency().await.unwrap();
}
