//! Output files the mock leaves behind for each ripped title.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// How titles are written to the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Materialize {
    /// Transcript only.
    #[default]
    Nothing,
    /// Empty `.mkv` placeholders.
    Placeholder,
    /// Short test-pattern clips rendered by ffmpeg.
    Synthetic { ffmpeg: PathBuf },
}

impl Materialize {
    pub(crate) fn write(&self, path: &Path, duration: Duration) -> Result<()> {
        match self {
            Materialize::Nothing => Ok(()),
            Materialize::Placeholder => {
                std::fs::write(path, b"").with_context(|| format!("create {}", path.display()))
            }
            Materialize::Synthetic { ffmpeg } => synthesize(ffmpeg, path, duration),
        }
    }
}

fn synthesize(ffmpeg: &Path, path: &Path, duration: Duration) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let secs = duration.as_secs().max(1);
    let output = Command::new(ffmpeg)
        .args(["-nostdin", "-f", "lavfi", "-i"])
        .arg(format!("testsrc=duration={secs}:size=1280x720:rate=24"))
        .args(["-f", "lavfi", "-i"])
        .arg(format!("anullsrc=r=48000:cl=stereo:d={secs}"))
        .args(["-c:v", "libx264", "-preset", "ultrafast", "-c:a", "aac", "-shortest", "-y"])
        .arg(path)
        .output()
        .with_context(|| format!("spawn {}", ffmpeg.display()))?;
    if !output.status.success() {
        bail!(
            "ffmpeg failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
