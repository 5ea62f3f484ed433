//! Resumable transcode engine.
//!
//! A job's queue is rebuilt from the input directory merged with the stored
//! file records, then executed one file at a time through a [`Transformer`].
//! Re-running a job after a crash only touches files that are not done.

mod engine;
mod ffmpeg;
mod options;
mod passthrough;
mod progress_worker;
mod queue;
mod summary;
mod transformer;

pub use engine::{EngineOptions, TranscodeEngine, TranscodeReport};
pub use ffmpeg::{build_ffmpeg_args, parse_progress_time, FfmpegTransformer};
pub use options::TranscodeOptions;
pub use passthrough::PassthroughTransformer;
pub use queue::{build_queue, is_eligible, QueuePolicy};
pub use summary::TranscodeSummary;
pub use transformer::{TransformError, Transformer};
