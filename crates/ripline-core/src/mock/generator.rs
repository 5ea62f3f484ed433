//! Transcript generator for `info` and `mkv` runs.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use super::materialize::Materialize;
use super::profile::{DiscProfile, ProfileRegistry, TitleProfile};
use crate::protocol::{attr, code, RecordWriter, PROGRESS_MAX};

/// Generator knobs.
#[derive(Debug, Clone)]
pub struct MockOptions {
    /// `PRGV` steps per title on a normal run.
    pub progress_steps: u32,
    /// Step resolution of a failing run.
    pub failure_steps: u32,
    /// Total delay spread across the steps of each title.
    pub delay: Duration,
    pub materialize: Materialize,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            progress_steps: 10,
            failure_steps: 100,
            delay: Duration::ZERO,
            materialize: Materialize::Nothing,
        }
    }
}

/// Which titles an `mkv` run saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleSelection {
    All,
    Indices(Vec<usize>),
}

impl TitleSelection {
    /// Parses makemkvcon's title argument: `all` or `0,2,3`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(TitleSelection::All);
        }
        let indices = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<usize>()
                    .with_context(|| format!("invalid title index {:?}", part))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TitleSelection::Indices(indices))
    }

    fn includes(&self, index: usize) -> bool {
        match self {
            TitleSelection::All => true,
            TitleSelection::Indices(list) => list.contains(&index),
        }
    }
}

/// How an `mkv` run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RipOutcome {
    pub titles_saved: usize,
    /// Set when the run failed; the process equivalent exits non-zero.
    pub failure: Option<String>,
}

impl RipOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Protocol emitter bound to a profile registry.
pub struct MockRipper<'a> {
    registry: &'a ProfileRegistry,
    options: MockOptions,
}

impl<'a> MockRipper<'a> {
    pub fn new(registry: &'a ProfileRegistry, options: MockOptions) -> Self {
        Self { registry, options }
    }

    /// Writes the disc description (`makemkvcon info`).
    pub fn info<W: Write>(&self, profile: &str, out: W) -> Result<()> {
        let mut w = RecordWriter::new(out);
        write_disc_info(&mut w, self.registry.get(profile))?;
        w.flush()?;
        Ok(())
    }

    /// Emits a full rip transcript (`makemkvcon mkv`) and materialises the
    /// selected titles in `output_dir`.
    ///
    /// A simulated failure is reported through [`RipOutcome::failure`]; only
    /// I/O problems are returned as errors.
    pub fn mkv<W: Write>(
        &self,
        profile: &str,
        selection: &TitleSelection,
        output_dir: &Path,
        out: W,
    ) -> Result<RipOutcome> {
        let profile = self.registry.get(profile);
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("create output directory {}", output_dir.display()))?;

        let mut w = RecordWriter::new(out);
        write_disc_info(&mut w, profile)?;

        if let Some(fail_at) = profile.fail_at_percent {
            let outcome = self.write_failure(&mut w, fail_at)?;
            w.flush()?;
            return Ok(outcome);
        }

        let titles: Vec<&TitleProfile> = profile
            .titles
            .iter()
            .filter(|t| selection.includes(t.index))
            .collect();
        let n = titles.len();

        w.message(code::SAVING_TITLES, &format!("Saving {} titles", n))?;
        for (i, title) in titles.iter().enumerate() {
            w.progress_title(code::SAVING_TITLE, &format!("Saving title {} of {}", i + 1, n))?;
            w.progress_item(code::SAVING_TITLE, &title.filename)?;

            self.options
                .materialize
                .write(&output_dir.join(&title.filename), title.duration())?;

            self.write_steps(&mut w, self.options.progress_steps, self.options.progress_steps)?;
        }
        w.message(
            code::COPY_COMPLETE,
            &format!("Copy complete. {} titles saved.", n),
        )?;
        w.flush()?;

        Ok(RipOutcome {
            titles_saved: n,
            failure: None,
        })
    }

    fn write_failure<W: Write>(&self, w: &mut RecordWriter<W>, fail_at: u8) -> Result<RipOutcome> {
        let steps = self.options.failure_steps.max(1);
        let fail_step = failure_step(steps, fail_at);
        self.write_steps(w, fail_step, steps)?;

        w.message(code::COPY_FAILED, "Copy failed")?;
        w.message(code::READ_ERROR, &format!("Read error at {}%", fail_at))?;
        tracing::debug!(fail_at, "mock rip failed as configured");

        Ok(RipOutcome {
            titles_saved: 0,
            failure: Some(format!("simulated read error at {}%", fail_at)),
        })
    }

    /// Emits `PRGV` for steps `0..=last` out of `steps`.
    fn write_steps<W: Write>(&self, w: &mut RecordWriter<W>, last: u32, steps: u32) -> Result<()> {
        let steps = steps.max(1);
        let pause = self.options.delay / steps;
        for step in 0..=last {
            let current = (u64::from(step) * u64::from(PROGRESS_MAX) / u64::from(steps)) as u32;
            w.progress(current, 0, PROGRESS_MAX)?;
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
        }
        Ok(())
    }
}

/// Last progress step emitted before failing at `fail_at` percent:
/// `floor(steps * p / 100)`, at least 1 and at most `steps`.
fn failure_step(steps: u32, fail_at: u8) -> u32 {
    let step = u64::from(steps) * u64::from(fail_at) / 100;
    (step.min(u64::from(steps)) as u32).clamp(1, steps.max(1))
}

fn write_disc_info<W: Write>(w: &mut RecordWriter<W>, profile: &DiscProfile) -> Result<()> {
    w.message(code::STARTUP, "MakeMKV v1.17.6 (mock) started")?;
    w.drive(0, "BD-ROM Mock Drive", &profile.disc_title)?;
    w.disc_attr(attr::TYPE, code::DISC_TYPE_BLURAY, "Blu-ray disc")?;
    w.disc_attr(attr::NAME, 0, &profile.disc_title)?;
    w.disc_attr(attr::PANEL_TITLE, 0, &profile.disc_title)?;
    w.disc_attr(attr::VOLUME_ID, 0, &profile.disc_id)?;
    w.title_count(profile.titles.len() as u32)?;
    for t in &profile.titles {
        w.title_group(t.index, &t.name, t.duration(), t.size, &t.filename)?;
        w.stream_attr(t.index, 0, attr::TYPE, code::STREAM_VIDEO, "Video")?;
        w.stream_attr(t.index, 1, attr::TYPE, code::STREAM_AUDIO, "Audio")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
