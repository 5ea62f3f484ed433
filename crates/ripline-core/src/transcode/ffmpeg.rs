//! ffmpeg-backed transformer: HEVC video, copied audio and subtitles.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::options::TranscodeOptions;
use super::transformer::{TransformError, Transformer};
use crate::cancel::CancelToken;
use crate::config::{RiplineConfig, TranscodeMode};
use crate::progress::{ProgressGate, ProgressSink};

const CANCEL_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct FfmpegTransformer {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegTransformer {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_config(cfg: &RiplineConfig) -> Self {
        Self::new(&cfg.ffmpeg_path, &cfg.ffprobe_path)
    }

    fn program(&self) -> String {
        self.ffmpeg.display().to_string()
    }
}

/// Full ffmpeg argument list for one file.
pub fn build_ffmpeg_args(input: &Path, output: &Path, opts: &TranscodeOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-nostdin".into(), "-y".into()];
    match opts.mode {
        TranscodeMode::Hardware => {
            for a in ["-hwaccel", "qsv", "-hwaccel_output_format", "qsv", "-i"] {
                args.push(a.into());
            }
            args.push(input.into());
            for a in ["-c:v", "hevc_qsv", "-preset"] {
                args.push(a.into());
            }
            args.push(opts.hw_preset.as_str().into());
            args.push("-global_quality".into());
            args.push(opts.global_quality.to_string().into());
        }
        TranscodeMode::Software => {
            args.push("-i".into());
            args.push(input.into());
            for a in ["-map", "0:v:0", "-map", "0:a", "-map", "0:s?", "-c:v", "libx265", "-preset"] {
                args.push(a.into());
            }
            args.push(opts.preset.as_str().into());
            args.push("-crf".into());
            args.push(opts.crf.to_string().into());
        }
    }
    for a in ["-c:a", "copy", "-c:s", "copy"] {
        args.push(a.into());
    }
    args.push(output.into());
    args
}

/// Seconds from the `time=HH:MM:SS.cc` field of an ffmpeg status line.
/// `time=N/A` and lines without the field give `None`.
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let start = line.find("time=")? + "time=".len();
    let value = line[start..].split_whitespace().next()?;
    let mut parts = value.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Elapsed seconds as a percentage of `duration`, truncated and capped at 100.
fn percent_for(elapsed: f64, duration: f64) -> u8 {
    if duration <= 0.0 || elapsed <= 0.0 {
        return 0;
    }
    ((elapsed / duration) * 100.0).min(100.0) as u8
}

/// Splits a byte stream into lines on either `\r` or `\n`; ffmpeg rewrites
/// its status line with bare carriage returns.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &b in bytes {
            if b == b'\r' || b == b'\n' {
                if !self.pending.is_empty() {
                    lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                }
            } else {
                self.pending.push(b);
            }
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}

fn exit_detail(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}

async fn cancelled(token: &CancelToken) {
    while !token.is_cancelled() {
        tokio::time::sleep(CANCEL_POLL).await;
    }
}

async fn remove_partial(output: &Path) {
    if let Err(e) = tokio::fs::remove_file(output).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("could not remove partial output {}: {}", output.display(), e);
        }
    }
}

mod ffprobe_json {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct FfprobeOutput {
        pub format: Option<Format>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Format {
        pub duration: Option<String>,
    }
}

/// Duration from `ffprobe -show_entries format=duration -of json` output.
fn parse_probe_duration(json: &str) -> Result<f64, TransformError> {
    let out: ffprobe_json::FfprobeOutput =
        serde_json::from_str(json).map_err(|e| TransformError::Probe(e.to_string()))?;
    let raw = out
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| TransformError::Probe("no duration in ffprobe output".to_string()))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| TransformError::Probe(format!("invalid duration {:?}", raw)))
}

impl Transformer for FfmpegTransformer {
    async fn probe_duration(&self, path: &Path) -> Result<f64, TransformError> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| TransformError::Spawn {
                program: self.ffprobe.display().to_string(),
                source,
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransformError::Probe(stderr.trim().to_string()));
        }
        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
    }

    async fn transform(
        &self,
        input: &Path,
        output: &Path,
        options: &TranscodeOptions,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<(), TransformError> {
        let args = build_ffmpeg_args(input, output, options);
        tracing::debug!("ffmpeg {:?}", args);
        let mut child = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransformError::Spawn {
                program: self.program(),
                source,
            })?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stderr was not captured"))?;

        let duration = options.duration_secs;
        let mut gate = ProgressGate::new(|p: u8| progress.report(p));
        let mut splitter = LineSplitter::default();
        let mut last_line = String::new();
        let mut chunk = [0u8; 4096];
        loop {
            tokio::select! {
                read = stderr.read(&mut chunk) => {
                    let n = read?;
                    if n == 0 {
                        break;
                    }
                    for line in splitter.push(&chunk[..n]) {
                        match parse_progress_time(&line) {
                            Some(t) => {
                                gate.offer(percent_for(t, duration));
                            }
                            None => last_line = line,
                        }
                    }
                }
                _ = cancelled(cancel) => {
                    let _ = child.kill().await;
                    remove_partial(output).await;
                    return Err(TransformError::Cancelled);
                }
            }
        }
        if let Some(line) = splitter.finish() {
            if parse_progress_time(&line).is_none() {
                last_line = line;
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            remove_partial(output).await;
            if !last_line.is_empty() {
                tracing::debug!("ffmpeg: {}", last_line);
            }
            return Err(TransformError::Exited {
                program: "ffmpeg".to_string(),
                detail: exit_detail(status),
            });
        }
        gate.offer(100);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn software_args() {
        let opts = TranscodeOptions::default();
        let args = strings(&build_ffmpeg_args(
            Path::new("/in/movie.mkv"),
            Path::new("/out/movie.mkv"),
            &opts,
        ));
        assert_eq!(&args[..4], ["-nostdin", "-y", "-i", "/in/movie.mkv"]);
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx265"]));
        assert!(args.windows(2).any(|w| w == ["-crf", "20"]));
        assert!(args.windows(2).any(|w| w == ["-preset", "slow"]));
        assert!(args.windows(2).any(|w| w == ["-map", "0:s?"]));
        assert_eq!(args.last().map(String::as_str), Some("/out/movie.mkv"));
        assert!(!args.iter().any(|a| a == "qsv"));
    }

    #[test]
    fn hardware_args() {
        let opts = TranscodeOptions {
            mode: TranscodeMode::Hardware,
            global_quality: 23,
            ..TranscodeOptions::default()
        };
        let args = strings(&build_ffmpeg_args(Path::new("a.mkv"), Path::new("b.mkv"), &opts));
        assert!(args.windows(2).any(|w| w == ["-hwaccel", "qsv"]));
        assert!(args.windows(2).any(|w| w == ["-c:v", "hevc_qsv"]));
        assert!(args.windows(2).any(|w| w == ["-global_quality", "23"]));
        assert!(args.windows(2).any(|w| w == ["-preset", "medium"]));
        assert!(args.windows(4).any(|w| w == ["-c:a", "copy", "-c:s", "copy"]));
        assert!(!args.iter().any(|a| a == "-crf"));
    }

    #[test]
    fn progress_time_field() {
        let line = "frame= 1200 fps=48 q=28.0 size=   10240kB time=00:01:30.50 bitrate=926.9kbits/s speed=1.9x";
        assert_eq!(parse_progress_time(line), Some(90.5));
        assert_eq!(parse_progress_time("time=01:00:00.00"), Some(3600.0));
        assert_eq!(parse_progress_time("size=0kB time=N/A bitrate=N/A"), None);
        assert_eq!(parse_progress_time("Stream #0:0: Video: h264"), None);
    }

    #[test]
    fn percent_is_truncated_and_capped() {
        assert_eq!(percent_for(45.0, 90.0), 50);
        assert_eq!(percent_for(89.9, 90.0), 99);
        assert_eq!(percent_for(120.0, 90.0), 100);
        assert_eq!(percent_for(10.0, 0.0), 0);
    }

    #[test]
    fn splitter_handles_cr_and_partial_chunks() {
        let mut s = LineSplitter::default();
        assert_eq!(s.push(b"time=00:00:01.00\rtime=00:0"), vec!["time=00:00:01.00"]);
        assert_eq!(s.push(b"0:02.00\r\nDone\n"), vec!["time=00:00:02.00", "Done"]);
        assert_eq!(s.push(b"tail"), Vec::<String>::new());
        assert_eq!(s.finish().as_deref(), Some("tail"));
        assert_eq!(s.finish(), None);
    }

    #[test]
    fn probe_json() {
        let json = r#"{"format": {"duration": "596.459000"}}"#;
        assert!((parse_probe_duration(json).unwrap() - 596.459).abs() < 1e-9);
        assert!(parse_probe_duration(r#"{"format": {}}"#).is_err());
        assert!(parse_probe_duration("not json").is_err());
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let t = FfmpegTransformer::new("/nonexistent/ffmpeg-bin", "/nonexistent/ffprobe-bin");
        let dir = tempfile::tempdir().unwrap();
        let mut sink = |_p: u8| {};
        let err = t
            .transform(
                &dir.path().join("in.mkv"),
                &dir.path().join("out.mkv"),
                &TranscodeOptions::default(),
                &mut sink,
                &CancelToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Spawn { .. }));
        assert!(matches!(
            t.probe_duration(&dir.path().join("in.mkv")).await,
            Err(TransformError::Spawn { .. })
        ));
    }
}
