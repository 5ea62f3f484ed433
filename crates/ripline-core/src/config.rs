use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// ffmpeg encoder family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscodeMode {
    /// libx265 with CRF.
    #[default]
    Software,
    /// Intel Quick Sync (hevc_qsv).
    Hardware,
}

/// Encoder settings (`[transcode]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeConfig {
    pub mode: TranscodeMode,
    /// CRF for software encodes.
    pub crf: u8,
    /// libx265 preset.
    pub preset: String,
    /// QSV preset for hardware encodes.
    pub hw_preset: String,
    /// QSV global_quality.
    pub global_quality: u8,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            mode: TranscodeMode::Software,
            crf: 20,
            preset: "slow".to_string(),
            hw_preset: "medium".to_string(),
            global_quality: 20,
        }
    }
}

/// Mock ripper settings (`[mock]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    /// PRGV steps per title on a normal run.
    pub progress_steps: u32,
    /// Step resolution of a failing run.
    pub failure_steps: u32,
    /// Delay per title in milliseconds.
    pub delay_ms: u64,
    /// Optional TOML file with extra `[profiles.<name>]` tables.
    #[serde(default)]
    pub profiles_file: Option<PathBuf>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            progress_steps: 10,
            failure_steps: 100,
            delay_ms: 0,
            profiles_file: None,
        }
    }
}

/// Global configuration loaded from `~/.config/ripline/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiplineConfig {
    /// Root of the media tree; staging dirs live under `<media_base>/staging`.
    pub media_base: PathBuf,
    pub makemkvcon_path: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// Database file; `None` means the XDG state default.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// Re-attempt files that failed in an earlier run of the same job.
    /// Files left in_progress by a crash are always re-attempted.
    #[serde(default = "default_true")]
    pub retry_failed_files: bool,
    #[serde(default)]
    pub transcode: TranscodeConfig,
    #[serde(default)]
    pub mock: MockConfig,
}

fn default_true() -> bool {
    true
}

impl Default for RiplineConfig {
    fn default() -> Self {
        Self {
            media_base: PathBuf::from("/mnt/media"),
            makemkvcon_path: PathBuf::from("makemkvcon"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            db_path: None,
            retry_failed_files: true,
            transcode: TranscodeConfig::default(),
            mock: MockConfig::default(),
        }
    }
}

impl RiplineConfig {
    /// Applies `MEDIA_BASE`, `MAKEMKVCON_PATH`, and `RIPLINE_DB` overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty("MEDIA_BASE") {
            self.media_base = PathBuf::from(v);
        }
        if let Some(v) = non_empty("MAKEMKVCON_PATH") {
            self.makemkvcon_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty("RIPLINE_DB") {
            self.db_path = Some(PathBuf::from(v));
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ripline")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// Environment overrides are applied on top.
pub fn load_or_init() -> Result<RiplineConfig> {
    let path = config_path()?;
    let mut cfg = if !path.exists() {
        let default_cfg = RiplineConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    } else {
        let data = fs::read_to_string(&path)?;
        toml::from_str(&data)?
    };
    cfg.apply_env();
    Ok(cfg)
}
