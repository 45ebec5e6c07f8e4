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
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "psearch CLI - Generates databases of 3D conformers, pharmacophore feature coordinates and pharmacophore fingerprints for pharmacophore-based similarity search.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a conformer/pharmacophore/fingerprint database from 2D structures.
    Generate(GenerateArgs),
    /// Summarize the content of an existing database.
    Inspect(InspectArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    // --- Core Arguments ---
    /// Input file of 2D structures: tab-separated SMILES (.smi, .smiles, .txt) or SDF (.sdf).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Output database file. Must have the .dat extension and must not exist yet.
    #[arg(short = 'o', long = "db", required = true, value_name = "FILENAME.dat")]
    pub db: PathBuf,

    /// Optional configuration file in TOML format.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Generation Overrides ---
    /// Binning step for pharmacophore creation.
    #[arg(short, long, value_name = "NUMERIC")]
    pub bin_step: Option<f64>,

    /// Maximum number of stereoisomers per compound. Specified stereocenters are not altered.
    #[arg(short = 's', long, value_name = "INT")]
    pub nstereo: Option<usize>,

    /// Number of conformers to generate per stereoisomer.
    #[arg(short = 'n', long, value_name = "INT")]
    pub nconf: Option<usize>,

    /// Discard conformers whose energy exceeds the lowest one by more than this value (kcal/mol).
    #[arg(short = 'e', long, value_name = "NUMERIC")]
    pub energy_cutoff: Option<f64>,

    /// Keep only conformers whose pairwise RMS is at least this value (Å).
    #[arg(short = 'r', long, value_name = "NUMERIC")]
    pub rms: Option<f64>,

    /// Seed for conformer embedding. -1 means no seed.
    #[arg(long, value_name = "INT", allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Pharmacophore feature definitions (TOML). Built-in definitions are used if omitted.
    #[arg(short = 'p', long, value_name = "PATH")]
    pub pharm_def: Option<PathBuf>,

    /// Number of worker processes to use.
    #[arg(short = 'c', long, value_name = "INT")]
    pub ncpu: Option<usize>,

    // --- Toolkit Overrides ---
    /// Chemistry toolkit helper program.
    #[arg(long, value_name = "PATH")]
    pub toolkit: Option<PathBuf>,

    /// Extra argument passed to the toolkit helper. Can be used multiple times.
    #[arg(long = "toolkit-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub toolkit_args: Vec<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S generation.nconf=100
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Database file to inspect.
    #[arg(required = true, value_name = "FILENAME.dat")]
    pub db: PathBuf,

    /// Only report the molecule with this identifier.
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,
}
