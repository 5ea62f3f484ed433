//! Persistent job store (SQLite via sqlx).
//!
//! Holds media items, seasons, jobs, per-file transcode records, and job log
//! events. Every job can be re-validated with
//! [`PipelineDb::assert_job_status_consistency`].

mod consistency;
mod db;
mod events;
mod files;
mod items;
mod jobs;
mod rows;

pub use db::PipelineDb;
pub use events::LogEvent;
pub use files::NewTranscodeFile;
pub use jobs::NewJob;

#[cfg(test)]
pub(crate) use db::open_memory;
