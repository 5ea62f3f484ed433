use crate::config::{TranscodeConfig, TranscodeMode};

/// Per-file encoder options handed to a [`super::Transformer`].
#[derive(Debug, Clone)]
pub struct TranscodeOptions {
    pub mode: TranscodeMode,
    pub crf: u8,
    pub preset: String,
    pub hw_preset: String,
    pub global_quality: u8,
    /// Source duration used to turn ffmpeg's `time=` into a percentage.
    pub duration_secs: f64,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        TranscodeOptions::from(&TranscodeConfig::default())
    }
}

impl From<&TranscodeConfig> for TranscodeOptions {
    fn from(cfg: &TranscodeConfig) -> Self {
        Self {
            mode: cfg.mode,
            crf: cfg.crf,
            preset: cfg.preset.clone(),
            hw_preset: cfg.hw_preset.clone(),
            global_quality: cfg.global_quality,
            duration_secs: 0.0,
        }
    }
}
