//! Input/output helpers.
//!
//! - solver parameter file (`param_file`)
//! - results table writer + resume reader (`results`)
//! - JSON run summary (`summary`)

pub mod param_file;
pub mod results;
pub mod summary;

pub use param_file::*;
pub use results::*;
pub use summary::*;
