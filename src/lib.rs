//! `relic-scan` library crate.
//!
//! The binary (`relic`) is a thin wrapper around this library so that:
//!
//! - the scanner and dispatcher are testable without spawning the binary
//! - the solver can be swapped for a stub behind the `Solver` trait
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod physics;
pub mod report;
pub mod scan;
pub mod xsec;
