//! Physics helpers: QCD running coupling/Casimirs (`qcd`) and particle-code decoding (`pdg`).

pub mod pdg;
pub mod qcd;

pub use pdg::*;
pub use qcd::*;
