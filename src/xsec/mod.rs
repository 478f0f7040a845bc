//! Cross-section dispatcher.
//!
//! - validated coefficient table (`table`)
//! - request validation + prefix summation (`dispatch`)

pub mod dispatch;
pub mod table;

pub use dispatch::*;
pub use table::*;
