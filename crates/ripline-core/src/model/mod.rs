//! Pipeline data model: media items, seasons, jobs, and transcode files.
//!
//! Plain data; persistence lives in `store`.

mod job;
mod media;
mod transcode_file;

pub use job::{ConsistencyError, Job, JobId, JobStatus, Stage};
pub use media::{ItemId, ItemStatus, MediaItem, MediaType, Season, SeasonId};
pub use transcode_file::{FileId, FileStatus, TranscodeFile};
