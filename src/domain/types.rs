//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - used as lookup keys by the cross-section dispatcher
//! - carried through the grid scanner and its error values
//! - written to the JSON table/summary files

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::XsecError;

/// Spin of the annihilating particle, the first half of a process name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinFamily {
    Scalar,
    Fermion,
    Vector,
}

impl SpinFamily {
    pub const ALL: [SpinFamily; 3] = [SpinFamily::Scalar, SpinFamily::Fermion, SpinFamily::Vector];

    pub fn display_name(self) -> &'static str {
        match self {
            SpinFamily::Scalar => "scalar",
            SpinFamily::Fermion => "fermion",
            SpinFamily::Vector => "vector",
        }
    }
}

/// Annihilation final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FinalState {
    /// Quark-antiquark pair (`qq`).
    #[value(name = "qq")]
    Quarks,
    /// Gluon pair (`gg`).
    #[value(name = "gg")]
    Gluons,
}

impl FinalState {
    pub const ALL: [FinalState; 2] = [FinalState::Quarks, FinalState::Gluons];
}

/// One of the six annihilation processes, e.g. `sstoqq` (scalars to quarks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Process {
    pub family: SpinFamily,
    pub final_state: FinalState,
}

impl Process {
    pub const ALL: [Process; 6] = [
        Process::new(SpinFamily::Scalar, FinalState::Quarks),
        Process::new(SpinFamily::Scalar, FinalState::Gluons),
        Process::new(SpinFamily::Fermion, FinalState::Quarks),
        Process::new(SpinFamily::Fermion, FinalState::Gluons),
        Process::new(SpinFamily::Vector, FinalState::Quarks),
        Process::new(SpinFamily::Vector, FinalState::Gluons),
    ];

    pub const fn new(family: SpinFamily, final_state: FinalState) -> Self {
        Self { family, final_state }
    }

    pub fn name(self) -> &'static str {
        match (self.family, self.final_state) {
            (SpinFamily::Scalar, FinalState::Quarks) => "sstoqq",
            (SpinFamily::Scalar, FinalState::Gluons) => "sstogg",
            (SpinFamily::Fermion, FinalState::Quarks) => "fftoqq",
            (SpinFamily::Fermion, FinalState::Gluons) => "fftogg",
            (SpinFamily::Vector, FinalState::Quarks) => "vvtoqq",
            (SpinFamily::Vector, FinalState::Gluons) => "vvtogg",
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Process {
    type Err = XsecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Process::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| XsecError::UnknownProcess(s.to_string()))
    }
}

impl TryFrom<String> for Process {
    type Error = XsecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Process> for String {
    fn from(value: Process) -> Self {
        value.name().to_string()
    }
}

/// Color (SU(3)) representation of the annihilating particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Representation {
    Triplet,
    Sextet,
    Octet,
}

impl Representation {
    pub const ALL: [Representation; 3] = [
        Representation::Triplet,
        Representation::Sextet,
        Representation::Octet,
    ];

    pub fn dimension(self) -> u32 {
        match self {
            Representation::Triplet => 3,
            Representation::Sextet => 6,
            Representation::Octet => 8,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dimension())
    }
}

impl TryFrom<i64> for Representation {
    type Error = XsecError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Representation::Triplet),
            6 => Ok(Representation::Sextet),
            8 => Ok(Representation::Octet),
            other => Err(XsecError::InvalidRepresentation(other)),
        }
    }
}

impl From<Representation> for i64 {
    fn from(value: Representation) -> Self {
        i64::from(value.dimension())
    }
}

/// Whether the Sommerfeld-corrected coefficient variant is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionMode {
    Uncorrected,
    Sommerfeld,
}

impl CorrectionMode {
    pub const ALL: [CorrectionMode; 2] = [CorrectionMode::Uncorrected, CorrectionMode::Sommerfeld];

    pub fn from_flag(sommerfeld: bool) -> Self {
        if sommerfeld {
            CorrectionMode::Sommerfeld
        } else {
            CorrectionMode::Uncorrected
        }
    }

    pub fn is_sommerfeld(self) -> bool {
        self == CorrectionMode::Sommerfeld
    }
}

/// Key into the coefficient table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey {
    pub process: Process,
    pub rep: Representation,
    pub mode: CorrectionMode,
}

impl TableKey {
    pub fn new(process: Process, rep: Representation, mode: CorrectionMode) -> Self {
        Self { process, rep, mode }
    }

    /// All 36 keys in a stable order (process, representation, mode).
    pub fn all() -> impl Iterator<Item = TableKey> {
        Process::ALL.into_iter().flat_map(|process| {
            Representation::ALL.into_iter().flat_map(move |rep| {
                CorrectionMode::ALL
                    .into_iter()
                    .map(move |mode| TableKey::new(process, rep, mode))
            })
        })
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            CorrectionMode::Uncorrected => "uncorrected",
            CorrectionMode::Sommerfeld => "sommerfeld",
        };
        write!(f, "{}/{}/{}", self.process, self.rep, mode)
    }
}

/// Physical inputs of the cross section: mass, relative velocity and the two couplings.
///
/// The dispatcher accepts them for interface symmetry with the solver's model.
/// The tabulated coefficients do not depend on them, so any value is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParams {
    pub mass: f64,
    pub velocity: f64,
    pub alpha_s: f64,
    pub alpha_sommerfeld: f64,
}

/// Which physical corrections the solver is asked to switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corrections {
    Baseline,
    Sommerfeld,
    BoundState,
    Both,
}

impl Corrections {
    /// Invocation order within one grid point, also the results column order.
    pub const ALL: [Corrections; 4] = [
        Corrections::Baseline,
        Corrections::Sommerfeld,
        Corrections::BoundState,
        Corrections::Both,
    ];

    /// Trailing flag tokens passed after the parameter file.
    pub fn flags(self) -> &'static [&'static str] {
        match self {
            Corrections::Baseline => &[],
            Corrections::Sommerfeld => &["on"],
            Corrections::BoundState => &["off", "on"],
            Corrections::Both => &["on", "on"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Corrections::Baseline => "baseline",
            Corrections::Sommerfeld => "sommerfeld",
            Corrections::BoundState => "bsf",
            Corrections::Both => "sommerfeld+bsf",
        }
    }
}

impl fmt::Display for Corrections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One point of the mass (x splitting) grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Dark matter mass.
    pub mass_dm: f64,
    /// Mass of the colored partner, `mass_dm * (1 + delta)`.
    pub mass_x: f64,
    /// Relative mass splitting.
    pub delta: f64,
}

impl GridPoint {
    pub fn new(mass_dm: f64, delta: f64) -> Self {
        Self {
            mass_dm,
            mass_x: mass_dm * (1.0 + delta),
            delta,
        }
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mdm = {:.4}, mx = {:.4}, delta = {:.4}",
            self.mass_dm, self.mass_x, self.delta
        )
    }
}

/// Extracted relic abundances for one grid point, ordered as [`Corrections::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub point: GridPoint,
    pub omega: [f64; 4],
}

/// Shape of the scan and of its results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanLayout {
    /// Mass sweep at a fixed splitting.
    Mass,
    /// Nested mass (outer) and splitting (inner) sweep.
    MassDelta,
}

impl ScanLayout {
    pub fn default_output(self) -> &'static str {
        match self {
            ScanLayout::Mass => "rd_mass.txt",
            ScanLayout::MassDelta => "rd_mass_delta.txt",
        }
    }
}

/// What to do when a single grid point fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the scan at the first failing point.
    Fail,
    /// Log the failure, record it in the summary and continue with the next point.
    Skip,
}

/// Inclusive, evenly stepped range of one swept variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl AxisRange {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// A range holding exactly `value`.
    pub fn single(value: f64) -> Self {
        Self {
            start: value,
            stop: value,
            step: 1.0,
        }
    }
}

/// Runtime configuration for a grid scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub layout: ScanLayout,
    pub mass: AxisRange,
    pub delta: AxisRange,
    /// Solver program followed by any fixed leading arguments.
    pub solver: Vec<String>,
    pub param_file: PathBuf,
    pub output: PathBuf,
    pub marker: String,
    pub timeout: Option<Duration>,
    pub on_error: FailurePolicy,
    pub resume: bool,
    pub summary: Option<PathBuf>,
}
