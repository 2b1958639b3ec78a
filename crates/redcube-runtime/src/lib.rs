#![warn(missing_docs)]

//! Emulated accelerator runtime for redcube kernels.
//!
//! A launch is a grid of cubes, a cube is a group of units sharing a barrier and a shared
//! memory region. Units of a cube run concurrently on their own threads, while cubes are
//! dispatched to a bounded pool of workers in an order that kernels must never rely on.

#[macro_use]
extern crate derive_new;

/// Device atomics and memory fences.
pub mod atomic;
/// In-cube barrier.
pub mod barrier;
/// Compute client module.
pub mod client;
/// Global configuration module.
pub mod config;
/// Device error reporting.
pub mod error;
/// Kernel definition and launch geometry.
pub mod kernel;
/// Device and shared memory.
pub mod memory;
/// Unit execution context.
pub mod unit;

mod scheduler;

pub use atomic::{DeviceAtomic, memory_fence};
pub use client::{ComputeClient, DeviceProperties, HardwareProperties};
pub use error::{DeviceError, DeviceStatus};
pub use kernel::{CubeCount, CubeDim, KernelTask};
pub use memory::{DeviceBuffer, SharedMemory};
pub use unit::UnitContext;
