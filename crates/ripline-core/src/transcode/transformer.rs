//! The seam between the engine and whatever actually converts a file.

use std::future::Future;
use std::io;
use std::path::Path;

use super::options::TranscodeOptions;
use crate::cancel::CancelToken;
use crate::progress::ProgressSink;

/// Why a single file transform failed.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} failed with {detail}")]
    Exited { program: String, detail: String },
    #[error("probe failed: {0}")]
    Probe(String),
    #[error("transform cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Converts one input file into one output file.
///
/// Contract:
/// - a complete output exists only on success;
/// - on failure there is no output, or only a partial the engine may delete;
/// - `progress` sees non-decreasing percentages ending at 100 on success.
pub trait Transformer: Send + Sync {
    /// Source duration in seconds, used for progress.
    fn probe_duration(&self, path: &Path) -> impl Future<Output = Result<f64, TransformError>> + Send;

    fn transform(
        &self,
        input: &Path,
        output: &Path,
        options: &TranscodeOptions,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<(), TransformError>> + Send;
}
