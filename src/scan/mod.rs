//! Relic-abundance grid scanner.
//!
//! - grid generation (`grid`)
//! - external solver invocation (`solver`)
//! - result extraction from solver output (`output`)
//! - the scan loop itself (`runner`)

pub mod grid;
pub mod output;
pub mod runner;
pub mod solver;

pub use runner::{ScanSummary, SkippedPoint, evaluate_point, run_scan};
pub use solver::{ProcessSolver, Solver, SolverFailure};
