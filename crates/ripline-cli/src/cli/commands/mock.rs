//! `ripline mock` – makemkvcon stand-in.

use anyhow::{bail, Context, Result};
use ripline_core::config::RiplineConfig;
use ripline_core::mock::{Materialize, MockOptions, MockRipper, ProfileRegistry, TitleSelection};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Built-in profiles plus the ones from `[mock] profiles_file`.
pub(crate) fn load_registry(cfg: &RiplineConfig) -> Result<ProfileRegistry> {
    match &cfg.mock.profiles_file {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("read profiles file {}", path.display()))?;
            ProfileRegistry::with_toml(&data)
        }
        None => Ok(ProfileRegistry::builtin()),
    }
}

pub(crate) fn mock_options(cfg: &RiplineConfig, delay: Option<Duration>, materialize: Materialize) -> MockOptions {
    MockOptions {
        progress_steps: cfg.mock.progress_steps,
        failure_steps: cfg.mock.failure_steps,
        delay: delay.unwrap_or(Duration::from_millis(cfg.mock.delay_ms)),
        materialize,
    }
}

fn warn_unknown(registry: &ProfileRegistry, profile: &str) {
    if !registry.contains(profile) {
        tracing::warn!("unknown profile {:?}; using the default movie", profile);
        eprintln!("warning: unknown profile {:?}; using the default movie", profile);
    }
}

pub async fn run_mock_info(cfg: &RiplineConfig, profile: &str) -> Result<()> {
    let registry = load_registry(cfg)?;
    warn_unknown(&registry, profile);
    let options = mock_options(cfg, None, Materialize::Nothing);
    let profile = profile.to_string();
    tokio::task::spawn_blocking(move || {
        MockRipper::new(&registry, options).info(&profile, std::io::stdout().lock())
    })
    .await?
}

pub async fn run_mock_mkv(
    cfg: &RiplineConfig,
    profile: &str,
    delay: Option<Duration>,
    titles: &str,
    output_dir: &Path,
    skip_files: bool,
    synthetic: bool,
) -> Result<()> {
    let registry = load_registry(cfg)?;
    warn_unknown(&registry, profile);
    let selection = TitleSelection::parse(titles)?;
    let materialize = if synthetic {
        Materialize::Synthetic {
            ffmpeg: cfg.ffmpeg_path.clone(),
        }
    } else if skip_files {
        Materialize::Placeholder
    } else {
        Materialize::Nothing
    };
    let options = mock_options(cfg, delay, materialize);
    let profile = profile.to_string();
    let output_dir: PathBuf = output_dir.to_path_buf();

    let outcome = tokio::task::spawn_blocking(move || {
        MockRipper::new(&registry, options).mkv(&profile, &selection, &output_dir, std::io::stdout().lock())
    })
    .await??;
    if let Some(reason) = outcome.failure {
        bail!(reason);
    }
    Ok(())
}

pub fn run_mock_profiles(cfg: &RiplineConfig) -> Result<()> {
    let registry = load_registry(cfg)?;
    println!("{:<20} {:<16} {:<7} {}", "PROFILE", "DISC ID", "TITLES", "NOTES");
    for name in registry.names() {
        let p = registry.get(name);
        let notes = match p.fail_at_percent {
            Some(pct) => format!("fails at {}%", pct),
            None => String::new(),
        };
        println!("{:<20} {:<16} {:<7} {}", name, p.disc_id, p.titles.len(), notes);
    }
    Ok(())
}
