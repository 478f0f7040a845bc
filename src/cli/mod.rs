//! Command-line parsing for the relic-abundance scanner and cross-section dispatcher.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the scanning and lookup code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::FailurePolicy;
use crate::scan::output::DEFAULT_MARKER;
use crate::xsec::DEFAULT_CUTOFF;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "relic",
    version,
    about = "Dark-matter relic-abundance scans and annihilation cross-section lookup"
)]
pub struct Cli {
    /// Only log warnings and errors (overridden by RELIC_LOG).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Annihilation cross section from the tabulated partial-wave coefficients.
    ///
    /// This is also what `relic -p ... -r ...` runs when no subcommand is given.
    Xsec(XsecArgs),
    /// Scan the relic abundance over the dark matter mass at a fixed splitting.
    ScanMass(ScanMassArgs),
    /// Scan the relic abundance over dark matter mass and mass splitting.
    ScanGrid(ScanGridArgs),
    /// Print the running strong coupling at one or more scales (GeV).
    AlphaS(AlphaSArgs),
    /// Decode a dark-sector particle code into spin, color and processes.
    Identify(IdentifyArgs),
    /// Write a coefficient table with all 36 entries set to zero.
    TableTemplate(TableTemplateArgs),
    /// Validate a coefficient table file.
    TableCheck(TableCheckArgs),
}

#[derive(Debug, Args, Clone)]
pub struct XsecArgs {
    /// Process: sstoqq, sstogg, fftoqq, fftogg, vvtoqq or vvtogg.
    #[arg(short = 'p', long)]
    pub process: String,

    /// Color representation of the annihilating particle (3, 6 or 8).
    #[arg(short = 'r', long = "rep", allow_negative_numbers = true)]
    pub rep: i64,

    /// Mass, relative velocity, alpha_s and alpha_sommerfeld.
    #[arg(
        short = 'v',
        long = "vars",
        num_args = 4,
        value_names = ["M", "V", "ALPHA_S", "ALPHA_SOMMERFELD"],
        allow_negative_numbers = true,
        required = true
    )]
    pub vars: Vec<f64>,

    /// Use the Sommerfeld-corrected coefficients.
    #[arg(short = 's', long)]
    pub sommerfeld: bool,

    /// Highest partial wave included in the sum.
    #[arg(short = 'l', long = "lwave", default_value_t = DEFAULT_CUTOFF)]
    pub lwave: u32,

    /// Print an annotated result instead of the bare number.
    #[arg(short = 'e', long)]
    pub extended: bool,

    /// Coefficient table JSON (defaults to RELIC_XSEC_TABLE).
    #[arg(long, value_name = "JSON")]
    pub table: Option<PathBuf>,
}

/// Options shared by both scan layouts.
#[derive(Debug, Args, Clone)]
pub struct ScanCommonArgs {
    /// Solver command line (defaults to RELIC_SOLVER, then ./main).
    #[arg(long)]
    pub solver: Option<String>,

    /// Parameter file handed to the solver.
    #[arg(long, default_value = "input_micromegas.par")]
    pub param_file: PathBuf,

    /// Results table (defaults to rd_mass.txt / rd_mass_delta.txt).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Text that marks the relic-abundance line in the solver output.
    #[arg(long, default_value = DEFAULT_MARKER)]
    pub marker: String,

    /// Kill a solver run after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// What to do when a grid point fails.
    #[arg(long, value_enum, default_value_t = FailurePolicy::Fail)]
    pub on_error: FailurePolicy,

    /// Append to an existing results table, skipping points already present.
    #[arg(long)]
    pub resume: bool,

    /// Write a JSON run summary.
    #[arg(long, value_name = "JSON")]
    pub summary: Option<PathBuf>,
}

/// Dark matter mass sweep (GeV), inclusive of the upper bound.
#[derive(Debug, Args, Clone)]
pub struct MassRangeArgs {
    #[arg(long, default_value_t = 1.0)]
    pub mass_min: f64,

    #[arg(long, default_value_t = 6001.0)]
    pub mass_max: f64,

    #[arg(long, default_value_t = 25.0)]
    pub mass_step: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ScanMassArgs {
    #[command(flatten)]
    pub mass: MassRangeArgs,

    /// Relative mass splitting of the colored partner.
    #[arg(long, default_value_t = 0.0)]
    pub delta: f64,

    #[command(flatten)]
    pub common: ScanCommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ScanGridArgs {
    #[command(flatten)]
    pub mass: MassRangeArgs,

    #[arg(long, default_value_t = 0.0)]
    pub delta_min: f64,

    #[arg(long, default_value_t = 0.25)]
    pub delta_max: f64,

    #[arg(long, default_value_t = 0.005)]
    pub delta_step: f64,

    #[command(flatten)]
    pub common: ScanCommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct AlphaSArgs {
    /// Scales in GeV.
    #[arg(required = true, value_name = "Q")]
    pub scales: Vec<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct IdentifyArgs {
    /// Particle code, e.g. 9000306.
    #[arg(allow_negative_numbers = true)]
    pub code: i64,
}

#[derive(Debug, Args, Clone)]
pub struct TableTemplateArgs {
    /// Write to a file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TableCheckArgs {
    pub path: PathBuf,
}
