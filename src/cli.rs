use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Build the promotions dataset from raw retail extracts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Acquire raw extracts and publish the dataset snapshot
    Build(BuildArgs),
    /// Only make sure the raw extracts are present under canonical names
    Acquire(AcquireArgs),
    /// Preview the first few rows of an extract or snapshot
    Preview(PreviewArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory holding the raw extracts
    #[arg(short = 'w', long = "work-dir")]
    pub work_dir: Option<PathBuf>,
    /// Remote shared folder identifier fetched when no extract is present locally
    #[arg(long, conflicts_with = "mirror")]
    pub folder: Option<String>,
    /// Mounted directory mirrored when no extract is present locally
    #[arg(long)]
    pub mirror: Option<PathBuf>,
    /// Maximum fetch attempts
    #[arg(long)]
    pub attempts: Option<usize>,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
    /// Snapshot destination (replaced on every run)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AcquireArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// File to preview (raw extract, or snapshot with --snapshot)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Treat the input as a published snapshot
    #[arg(long, conflicts_with = "training")]
    pub snapshot: bool,
    /// Show the feature/target view used for training
    #[arg(long)]
    pub training: bool,
    /// Raw extract directory used by --training when the snapshot is missing
    #[arg(short = 'w', long = "work-dir")]
    pub work_dir: Option<PathBuf>,
}
