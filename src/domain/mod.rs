//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - dispatcher keys (`Process`, `Representation`, `CorrectionMode`, `TableKey`)
//! - physical inputs (`PhysicalParams`)
//! - scan types (`GridPoint`, `Corrections`, `ResultRow`, `ScanConfig`)

pub mod types;

pub use types::*;
