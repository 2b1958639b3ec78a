#![warn(missing_docs)]

//! Block-then-grid reductions of strided tensors.
//!
//! Units of a cube fold their share of the input into shared memory, which is then aggregated
//! with a tree reduction. When a launch spans several cubes, the cube that finishes last,
//! elected through an atomic counter, folds the partials of every cube. Instructions are
//! selected at compile time through [ReduceInstruction], or at runtime through [ReduceOp].

#[macro_use]
extern crate derive_new;

mod axis;
mod buffer;
mod config;
mod error;
mod instructions;
mod launch;
mod numeric;
mod primitives;
mod scalar;
mod strategy;

pub use buffer::*;
pub use config::*;
pub use error::*;
pub use instructions::*;
pub use launch::*;
pub use numeric::*;
pub use primitives::aggregate_partials;
pub use scalar::ElectionLog;
pub use strategy::*;
