//! "Skip transform" mode: the output is a byte copy of the input.

use std::path::Path;

use super::options::TranscodeOptions;
use super::transformer::{TransformError, Transformer};
use crate::cancel::CancelToken;
use crate::progress::ProgressSink;

/// Copies files instead of encoding them. Used for dry runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTransformer;

impl Transformer for PassthroughTransformer {
    async fn probe_duration(&self, _path: &Path) -> Result<f64, TransformError> {
        Ok(0.0)
    }

    async fn transform(
        &self,
        input: &Path,
        output: &Path,
        _options: &TranscodeOptions,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<(), TransformError> {
        if cancel.is_cancelled() {
            return Err(TransformError::Cancelled);
        }
        progress.report(0);
        tokio::fs::copy(input, output).await?;
        progress.report(100);
        Ok(())
    }
}
