use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "nrhub - IFE grouping and chain-to-chain discrepancy computation for non-redundant RNA 3D structure sets.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Group the chains of each structure into IFEs and write them as CSV.
    Group(GroupArgs),
    /// Compute missing chain-to-chain discrepancies and store them in the data directory.
    Compare(CompareArgs),
    /// List experimental sequence pairs that still need a sequence alignment.
    AlignPairs(AlignArgs),
}

/// Where the tables live and which structures to work on.
#[derive(Args, Debug, Clone)]
pub struct StructureArgs {
    /// Directory holding the CSV tables (chains.csv, interactions.csv, ...).
    #[arg(short, long, required = true, value_name = "DIR")]
    pub data: PathBuf,

    /// PDB ids to process. Defaults to every structure in chains.csv.
    #[arg(value_name = "PDB")]
    pub pdbs: Vec<String>,
}

/// Configuration sources shared by the commands that group chains.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the minimum internal interaction count of a structured chain.
    #[arg(long, value_name = "INT")]
    pub min_bp_count: Option<u32>,

    /// Override the minimum internal interactions per nucleotide of a structured chain.
    #[arg(long, value_name = "FLOAT")]
    pub min_bp_per_nt: Option<f64>,

    /// Override the fraction of the weaker internal count two chains must share to join.
    #[arg(long, value_name = "FLOAT")]
    pub external_internal_fraction: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S selection.comparison-limit=100
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `group` subcommand.
#[derive(Args, Debug)]
pub struct GroupArgs {
    #[command(flatten)]
    pub structures: StructureArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output CSV path. Defaults to stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub structures: StructureArgs,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Override the exact batch size (first chain plus candidates) to compare.
    #[arg(long, value_name = "INT")]
    pub comparison_limit: Option<usize>,

    /// Override the worst resolution, in angstroms, a chain may have.
    #[arg(long, value_name = "FLOAT")]
    pub max_resolution: Option<f64>,
}

/// Arguments for the `align-pairs` subcommand.
#[derive(Args, Debug)]
pub struct AlignArgs {
    #[command(flatten)]
    pub structures: StructureArgs,

    /// Sequences shorter than this only pair with sequences of identical length.
    #[arg(long, value_name = "INT")]
    pub small_cutoff: Option<u32>,

    /// Sequences at or above this length only pair with each other.
    #[arg(long, value_name = "INT")]
    pub huge_cutoff: Option<u32>,

    /// Output CSV path. Defaults to stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
