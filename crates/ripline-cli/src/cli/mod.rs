//! CLI for the ripline disc ingestion pipeline.

mod commands;

use anyhow::{bail, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ripline_core::config::{self, RiplineConfig};
use ripline_core::model::{JobId, MediaType};
use ripline_core::store::PipelineDb;
use std::path::PathBuf;
use std::time::Duration;

use commands::{
    run_check, run_completions, run_files, run_man, run_mock_info, run_mock_mkv, run_mock_profiles,
    run_rip, run_status, run_transcode, run_validate_state,
};

/// Top-level CLI for ripline.
#[derive(Debug, Parser)]
#[command(name = "ripline")]
#[command(about = "ripline: resumable disc rip and transcode pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Mock makemkvcon: emit robot-mode transcripts from canned disc profiles.
    Mock(MockArgs),

    /// Rip a disc into the staging area and record the job.
    Rip(RipArgs),

    /// Run (or resume) a transcode job.
    Transcode(TranscodeArgs),

    /// Show media items and their jobs.
    Status,

    /// List the transcode files of a job.
    Files {
        /// Job identifier.
        job: JobId,
    },

    /// Re-validate every stored job and report inconsistencies.
    Check,

    /// Validate a `.rip` state directory; exits non-zero if malformed.
    ValidateState {
        /// Path to the `.rip` directory (or the stage directory holding it).
        path: PathBuf,
    },

    /// Print shell completions.
    Completions {
        shell: Shell,
    },

    /// Print the man page.
    Man,
}

/// makemkvcon-compatible flags; accepted anywhere and ignored.
#[derive(Debug, Default, Args)]
pub struct CompatFlags {
    #[arg(short = 'r', long = "robot", global = true)]
    pub robot: bool,
    #[arg(long, global = true)]
    pub noscan: bool,
    #[arg(long, global = true, value_name = "SECS")]
    pub minlength: Option<u32>,
    #[arg(long, global = true, value_name = "FILE", allow_hyphen_values = true)]
    pub messages: Option<String>,
    #[arg(long, global = true, value_name = "FILE", allow_hyphen_values = true)]
    pub progress: Option<String>,
    #[arg(long, global = true)]
    pub debug: bool,
    #[arg(long, global = true, value_name = "BOOL")]
    pub directio: Option<String>,
}

impl CompatFlags {
    /// The flags that were given, spelled as on the command line.
    pub fn given(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.robot {
            flags.push("-r".to_string());
        }
        if self.noscan {
            flags.push("--noscan".to_string());
        }
        if let Some(secs) = self.minlength {
            flags.push(format!("--minlength={}", secs));
        }
        if let Some(v) = &self.messages {
            flags.push(format!("--messages={}", v));
        }
        if let Some(v) = &self.progress {
            flags.push(format!("--progress={}", v));
        }
        if self.debug {
            flags.push("--debug".to_string());
        }
        if let Some(v) = &self.directio {
            flags.push(format!("--directio={}", v));
        }
        flags
    }
}

#[derive(Debug, Args)]
pub struct MockArgs {
    /// Disc profile to emulate.
    #[arg(long, global = true, default_value = ripline_core::mock::DEFAULT_PROFILE)]
    pub profile: String,

    /// Delay per title, e.g. `500ms` or `2s` (bare numbers are milliseconds).
    #[arg(long, global = true, value_parser = parse_delay)]
    pub delay: Option<Duration>,

    #[command(flatten)]
    pub compat: CompatFlags,

    #[command(subcommand)]
    pub action: MockAction,
}

#[derive(Debug, Subcommand)]
pub enum MockAction {
    /// Describe the disc (`makemkvcon info`).
    Info {
        /// Source such as `disc:0`; ignored.
        source: Option<String>,
    },

    /// Rip titles (`makemkvcon mkv <source> <titles> <dir>`).
    Mkv {
        /// Source such as `disc:0`; ignored.
        source: String,
        /// `all` or a comma-separated list of title indices.
        titles: String,
        /// Output directory.
        output_dir: PathBuf,
        /// Write empty placeholder files instead of nothing.
        #[arg(long, conflicts_with = "synthetic")]
        skip_files: bool,
        /// Render short test-pattern clips with ffmpeg.
        #[arg(long)]
        synthetic: bool,
    },

    /// List available profiles.
    Profiles,
}

impl MockAction {
    /// The makemkvcon source argument, when the action takes one.
    pub fn source(&self) -> Option<&str> {
        match self {
            MockAction::Info { source } => source.as_deref(),
            MockAction::Mkv { source, .. } => Some(source),
            MockAction::Profiles => None,
        }
    }
}

#[derive(Debug, Args)]
pub struct RipArgs {
    /// Media type: movie or tv (show).
    #[arg(short = 't', long = "type", value_parser = parse_media_type, required_unless_present = "job")]
    pub media_type: Option<MediaType>,

    /// Media name.
    #[arg(short, long, required_unless_present = "job")]
    pub name: Option<String>,

    /// Season number (TV only).
    #[arg(short, long)]
    pub season: Option<u32>,

    /// Disc number (TV only).
    #[arg(short, long)]
    pub disc: Option<u32>,

    /// makemkvcon source.
    #[arg(long, default_value = "disc:0")]
    pub disc_path: String,

    /// Report into an existing job; type, name, season and disc come from it.
    #[arg(long)]
    pub job: Option<JobId>,

    /// Use the mock generator with this profile instead of makemkvcon.
    #[arg(long, value_name = "PROFILE")]
    pub mock: Option<String>,

    /// With --mock: render synthetic clips with ffmpeg instead of placeholders.
    #[arg(long, requires = "mock")]
    pub synthetic: bool,
}

#[derive(Debug, Args)]
pub struct TranscodeArgs {
    /// Transcode job to run or resume.
    #[arg(long, conflicts_with = "from_job", required_unless_present = "from_job")]
    pub job: Option<JobId>,

    /// Create a transcode job from this completed rip job, then run it.
    #[arg(long)]
    pub from_job: Option<JobId>,

    /// Copy files instead of encoding them.
    #[arg(long)]
    pub skip_transform: bool,

    /// Use Quick Sync hardware encoding regardless of config.
    #[arg(long)]
    pub hardware: bool,
}

fn parse_media_type(s: &str) -> Result<MediaType, String> {
    MediaType::parse(&s.to_ascii_lowercase())
        .ok_or_else(|| format!("invalid type {:?}: must be movie, tv, or show", s))
}

fn parse_delay(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (number, scale) = if let Some(n) = s.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1.0)
    } else {
        (s, 0.001)
    };
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid delay {:?}", s))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("invalid delay {:?}", s));
    }
    Ok(Duration::from_secs_f64(value * scale))
}

async fn open_db(cfg: &RiplineConfig) -> Result<PipelineDb> {
    match &cfg.db_path {
        Some(path) => PipelineDb::open_at(path)
            .await
            .with_context(|| format!("open database {}", path.display())),
        None => PipelineDb::open_default().await,
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        Self::run(cli).await
    }

    async fn run(cli: Cli) -> Result<()> {
        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell, &mut Cli::command()),
            CliCommand::Man => return run_man(Cli::command()),
            CliCommand::ValidateState { path } => {
                if !run_validate_state(&path)? {
                    bail!("{} is not a valid state directory", path.display());
                }
                return Ok(());
            }
            command => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                command.run_with_config(&cfg).await
            }
        }
    }

    async fn run_with_config(self, cfg: &RiplineConfig) -> Result<()> {
        match self {
            CliCommand::Mock(args) => {
                let ignored = args.compat.given();
                if !ignored.is_empty() {
                    tracing::debug!("ignoring makemkvcon flags: {}", ignored.join(" "));
                }
                if let Some(source) = args.action.source() {
                    tracing::debug!("emulating source {}", source);
                }
                match args.action {
                    MockAction::Info { .. } => run_mock_info(cfg, &args.profile).await?,
                    MockAction::Mkv {
                        ref titles,
                        ref output_dir,
                        skip_files,
                        synthetic,
                        ..
                    } => {
                        run_mock_mkv(
                            cfg,
                            &args.profile,
                            args.delay,
                            titles,
                            output_dir,
                            skip_files,
                            synthetic,
                        )
                        .await?
                    }
                    MockAction::Profiles => run_mock_profiles(cfg)?,
                }
            }
            CliCommand::Rip(args) => {
                let db = open_db(cfg).await?;
                run_rip(cfg, &db, &args).await?;
            }
            CliCommand::Transcode(args) => {
                let db = open_db(cfg).await?;
                run_transcode(cfg, &db, &args).await?;
            }
            CliCommand::Status => run_status(&open_db(cfg).await?).await?,
            CliCommand::Files { job } => run_files(&open_db(cfg).await?, job).await?,
            CliCommand::Check => run_check(&open_db(cfg).await?).await?,
            CliCommand::ValidateState { .. } | CliCommand::Completions { .. } | CliCommand::Man => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
