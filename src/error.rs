use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{Corrections, GridPoint};

/// Exit code for invalid input (unknown process, bad flags, broken table).
pub const EXIT_INVALID_INPUT: u8 = 2;
/// Exit code for failures while a scan is running.
pub const EXIT_SCAN_FAILED: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors raised by the cross-section dispatcher and its coefficient table.
#[derive(Debug, Error)]
pub enum XsecError {
    #[error("Process {0} is not known, must be sstoqq, sstogg, fftoqq, fftogg, vvtoqq or vvtogg.")]
    UnknownProcess(String),

    #[error("Color representation {0} is not valid, must be 3, 6, or 8.")]
    InvalidRepresentation(i64),

    #[error("Partial wave l = {requested} is out of range, the table holds orders 0..={max}.")]
    OutOfRangeWave { requested: u32, max: u32 },

    #[error("Coefficient table is invalid: {0}")]
    InvalidTable(String),

    #[error("Failed to read coefficient table '{}': {source}", path.display())]
    TableIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse coefficient table: {0}")]
    TableFormat(#[from] serde_json::Error),
}

/// Errors raised while running a grid scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid scan range for {axis}: {reason}")]
    InvalidRange { axis: &'static str, reason: String },

    #[error("Solver command is empty")]
    EmptySolverCommand,

    #[error("Failed to write parameter file '{}': {source}", path.display())]
    MalformedParameterFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start solver `{command}`: {source}")]
    SolverSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Solver `{command}` ({corrections}) exited with {status} at {point}: {stderr}")]
    SolverInvocation {
        command: String,
        corrections: Corrections,
        point: GridPoint,
        status: String,
        stderr: String,
    },

    #[error("Solver `{command}` ({corrections}) timed out after {seconds}s at {point}")]
    SolverTimeout {
        command: String,
        corrections: Corrections,
        point: GridPoint,
        seconds: u64,
    },

    #[error("Solver output ({corrections}) has no line containing '{marker}' at {point}")]
    MissingMarker {
        marker: String,
        corrections: Corrections,
        point: GridPoint,
    },

    #[error("Solver output ({corrections}) has unparsable value '{token}' after '{marker}' at {point}")]
    UnparsableValue {
        marker: String,
        token: String,
        corrections: Corrections,
        point: GridPoint,
    },

    #[error("Results file '{}': {source}", path.display())]
    Results {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read existing results '{}' for resume: {reason}", path.display())]
    Resume { path: PathBuf, reason: String },
}

impl ScanError {
    /// The grid point the error is attached to, if any.
    pub fn point(&self) -> Option<GridPoint> {
        match self {
            ScanError::SolverInvocation { point, .. }
            | ScanError::SolverTimeout { point, .. }
            | ScanError::MissingMarker { point, .. }
            | ScanError::UnparsableValue { point, .. } => Some(*point),
            _ => None,
        }
    }

    /// Per-point failures may be skipped under `FailurePolicy::Skip`.
    /// I/O problems with the scan's own files never are.
    pub fn is_point_failure(&self) -> bool {
        self.point().is_some()
    }
}

impl From<XsecError> for AppError {
    fn from(err: XsecError) -> Self {
        AppError::new(EXIT_INVALID_INPUT, err.to_string())
    }
}

impl From<crate::physics::ParticleCodeError> for AppError {
    fn from(err: crate::physics::ParticleCodeError) -> Self {
        AppError::new(EXIT_INVALID_INPUT, err.to_string())
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        let code = match &err {
            ScanError::InvalidRange { .. } | ScanError::EmptySolverCommand => EXIT_INVALID_INPUT,
            _ => EXIT_SCAN_FAILED,
        };
        AppError::new(code, err.to_string())
    }
}
