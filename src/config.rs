use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::limits::{DEFAULT_MAX_INSTRUCTIONS, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_PASSES, Limits};

#[derive(Parser, Debug, Clone)]
#[command(name = "fractal_engine", version, about = "IFS and L-system point generator")]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value_t = DEFAULT_MAX_INSTRUCTIONS)]
    pub max_instructions: u64,

    #[arg(long, global = true, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u64,

    /// Cap on L-system rewriting passes.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_PASSES)]
    pub max_passes: u64,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the built-in presets.
    Presets,
    /// Run an iterated function system.
    Ifs(IfsArgs),
    /// Expand and draw an L-system.
    Lsystem(LSystemArgs),
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Defaults to stdout.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct IfsArgs {
    #[arg(long, value_name = "INDEX_OR_NAME", conflicts_with = "def")]
    pub preset: Option<String>,

    #[arg(long, value_name = "FILE")]
    pub def: Option<PathBuf>,

    #[arg(long)]
    pub iterations: Option<usize>,

    #[arg(long)]
    pub density: Option<f64>,

    /// Seed for rule selection; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct LSystemArgs {
    #[arg(long, value_name = "INDEX_OR_NAME", conflicts_with = "def")]
    pub preset: Option<String>,

    #[arg(long, value_name = "FILE")]
    pub def: Option<PathBuf>,

    #[arg(long)]
    pub iterations: Option<usize>,

    /// Track branch depth (90 degree heading modulus).
    #[arg(long, default_value_t = false)]
    pub time: bool,

    /// Restore segment length on `]`.
    #[arg(long, default_value_t = false)]
    pub scoped_distance: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Summary,
}

impl Config {
    pub fn limits(&self) -> Limits {
        Limits {
            max_instructions: self.max_instructions,
            max_iterations: self.max_iterations,
            max_passes: self.max_passes,
        }
    }
}
