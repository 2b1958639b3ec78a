use crate::unit::UnitContext;

/// Implement this trait to create a kernel that can be launched on a [ComputeClient](crate::ComputeClient).
///
/// The kernel body is executed once per unit. Units of the same cube share the value returned by
/// [init_shared](KernelTask::init_shared) and synchronize through
/// [sync_cube](UnitContext::sync_cube).
pub trait KernelTask: Send + Sync {
    /// Per-cube shared memory.
    type Shared: Send + Sync;

    /// Name of the kernel for debugging.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Allocates the shared memory of one cube, given the dynamic shared memory size of the
    /// launch in bytes.
    fn init_shared(&self, shared_memory_size: usize) -> Self::Shared;

    /// Runs the kernel body for one unit.
    fn execute(&self, unit: &UnitContext<'_, Self::Shared>);
}

/// Specifies the number of cubes to be dispatched for a kernel.
///
/// This translates to eg. a grid for CUDA, or to `num_workgroups` for wgsl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeCount {
    /// Dispatch a known count of x, y, z cubes.
    Static(u32, u32, u32),
}

impl CubeCount {
    /// Create a new static cube count with the given x = y = z = 1.
    pub fn new_single() -> Self {
        CubeCount::Static(1, 1, 1)
    }

    /// Create a new static cube count with the given x, and y = z = 1.
    pub fn new_1d(x: u32) -> Self {
        CubeCount::Static(x, 1, 1)
    }

    /// Total number of cubes.
    pub fn num_cubes(&self) -> u32 {
        match self {
            CubeCount::Static(x, y, z) => x * y * z,
        }
    }
}

/// The number of units across all 3 axis totalling to the number of working units in a cube.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
pub struct CubeDim {
    /// The number of units in the x axis.
    pub x: u32,
    /// The number of units in the y axis.
    pub y: u32,
    /// The number of units in the z axis.
    pub z: u32,
}

impl CubeDim {
    /// Create a new cube dim with x = y = z = 1.
    pub const fn new_single() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }

    /// Create a new cube dim with the given x, and y = z = 1.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// Total numbers of units per cube
    pub const fn num_elems(&self) -> u32 {
        self.x * self.y * self.z
    }
}
