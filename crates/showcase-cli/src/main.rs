//! Showcase planner command line entry point

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use showcase_core::{Pipeline, PlanFormat};

#[derive(Parser, Debug)]
#[command(name = "showcase", version, about = "Plan turntable and lineup showcase renders")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a render job and write stage plans for the renderer host.
    Plan(PlanArgs),
    /// Write a job file with every option at its default.
    InitConfig(InitConfigArgs),
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Scene description exported from the host (RON).
    #[arg(long)]
    pub scene: PathBuf,

    /// Job configuration file (RON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Pipeline to run; overrides the job file.
    #[arg(long, value_enum)]
    pub pipeline: Option<PipelineArg>,

    /// Output directory for plan files.
    #[arg(long)]
    pub out: PathBuf,

    /// Plan file format.
    #[arg(long, value_enum, default_value_t = FormatArg::Ron)]
    pub format: FormatArg,
}

#[derive(Parser, Debug)]
pub struct InitConfigArgs {
    /// Output job file path.
    #[arg(long)]
    pub out: PathBuf,

    /// Fill in the defaults of this pipeline.
    #[arg(long, value_enum)]
    pub pipeline: Option<PipelineArg>,

    /// Overwrite the file if it already exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PipelineArg {
    Turntable,
    Lineup,
}

impl From<PipelineArg> for Pipeline {
    fn from(arg: PipelineArg) -> Self {
        match arg {
            PipelineArg::Turntable => Pipeline::Turntable,
            PipelineArg::Lineup => Pipeline::Lineup,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Ron,
    Json,
}

impl From<FormatArg> for PlanFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Ron => PlanFormat::Ron,
            FormatArg::Json => PlanFormat::Json,
        }
    }
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "showcase_core=info,showcase_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => {
            let written = commands::run_plan(&args)?;
            tracing::info!(files = written.len(), out = %args.out.display(), "Plan complete");
        }
        Command::InitConfig(args) => commands::run_init_config(&args)?,
    }
    Ok(())
}
