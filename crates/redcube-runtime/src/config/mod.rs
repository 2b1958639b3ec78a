/// Diagnostics config module.
pub mod diagnostics;
/// Launch logging config module.
pub mod launch;
/// Cube scheduling config module.
pub mod scheduler;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
