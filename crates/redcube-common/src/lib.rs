#![warn(missing_docs)]

//! Common types shared by the redcube crates.

/// Backtrace capture used by error reporting.
pub mod backtrace;

/// Tensor layouts and the mapping from logical indices to memory offsets.
pub mod layout;

pub use layout::{LayoutError, TensorLayout};
