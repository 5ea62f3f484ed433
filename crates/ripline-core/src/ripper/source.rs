use anyhow::{Context, Result};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::mock::{MockOptions, MockRipper, ProfileRegistry, TitleSelection};

/// A producer of the robot-mode protocol for one rip.
pub trait RipSource: Send + Sync {
    /// Rips `disc` into `output_dir`, sending each transcript line to
    /// `lines` as it is produced. Returns whether the producer exited
    /// successfully; start-up problems are errors.
    fn run(
        &self,
        disc: &str,
        output_dir: &Path,
        lines: mpsc::Sender<String>,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Runs the real `makemkvcon` in robot mode.
#[derive(Debug, Clone)]
pub struct ProcessRipSource {
    program: PathBuf,
}

impl ProcessRipSource {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl RipSource for ProcessRipSource {
    async fn run(&self, disc: &str, output_dir: &Path, lines: mpsc::Sender<String>) -> Result<bool> {
        let mut child = Command::new(&self.program)
            .args(["-r", "--noscan", "--progress=-same", "mkv"])
            .arg(disc)
            .arg("all")
            .arg(output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("start {}", self.program.display()))?;
        let stdout = child
            .stdout
            .take()
            .context("makemkvcon stdout was not captured")?;

        if !forward_lines(BufReader::new(stdout), &lines).await? {
            tracing::warn!("transcript consumer went away; stopping makemkvcon");
            let _ = child.kill().await;
        }
        let status = child.wait().await?;
        tracing::debug!("makemkvcon exited with {}", status);
        Ok(status.success())
    }
}

/// Sends every line of `reader` to `lines`, decoding invalid UTF-8 lossily
/// so one bad byte never drops the rest of the transcript. Returns `false`
/// when the receiver closed early.
async fn forward_lines<R>(mut reader: R, lines: &mpsc::Sender<String>) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(true);
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        if lines.send(line).await.is_err() {
            return Ok(false);
        }
    }
}

/// Runs the mock generator in-process against one profile.
#[derive(Debug, Clone)]
pub struct MockRipSource {
    registry: Arc<ProfileRegistry>,
    profile: String,
    options: MockOptions,
}

impl MockRipSource {
    pub fn new(registry: ProfileRegistry, profile: &str, options: MockOptions) -> Self {
        Self {
            registry: Arc::new(registry),
            profile: profile.to_string(),
            options,
        }
    }
}

impl RipSource for MockRipSource {
    async fn run(&self, _disc: &str, output_dir: &Path, lines: mpsc::Sender<String>) -> Result<bool> {
        let registry = Arc::clone(&self.registry);
        let profile = self.profile.clone();
        let options = self.options.clone();
        let dir = output_dir.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<bool> {
            let ripper = MockRipper::new(&registry, options);
            let mut out = LineForwarder::new(lines);
            let outcome = ripper.mkv(&profile, &TitleSelection::All, &dir, &mut out)?;
            out.finish()?;
            if let Some(reason) = &outcome.failure {
                tracing::debug!("mock source: {}", reason);
            }
            Ok(outcome.is_success())
        })
        .await
        .context("mock rip task failed")?
    }
}

/// `Write` adapter that forwards complete lines over a channel from a
/// blocking thread.
struct LineForwarder {
    tx: mpsc::Sender<String>,
    pending: Vec<u8>,
}

impl LineForwarder {
    fn new(tx: mpsc::Sender<String>) -> Self {
        Self {
            tx,
            pending: Vec::new(),
        }
    }

    fn send(&mut self, line: String) -> io::Result<()> {
        self.tx
            .blocking_send(line)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "transcript consumer closed"))
    }

    /// Sends a trailing unterminated line, if any.
    fn finish(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        self.send(line)
    }
}

impl Write for LineForwarder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &b in buf {
            if b == b'\n' {
                let line = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                self.send(line)?;
            } else {
                self.pending.push(b);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
