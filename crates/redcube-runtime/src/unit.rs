use crate::barrier::CubeBarrier;
use crate::kernel::CubeDim;

/// Everything a unit knows about its position in the launch.
#[derive(new)]
pub struct UnitContext<'a, S> {
    unit_pos: u32,
    cube_pos: u32,
    cube_dim: CubeDim,
    cube_count: u32,
    barrier: &'a CubeBarrier,
    shared: &'a S,
}

impl<S> UnitContext<'_, S> {
    /// Position of the unit within its cube.
    pub fn unit_pos(&self) -> u32 {
        self.unit_pos
    }

    /// Position of the cube within the launch.
    pub fn cube_pos(&self) -> u32 {
        self.cube_pos
    }

    /// Number of units per cube.
    pub fn cube_dim(&self) -> u32 {
        self.cube_dim.num_elems()
    }

    /// Number of cubes in the launch.
    pub fn cube_count(&self) -> u32 {
        self.cube_count
    }

    /// Position of the unit within the launch.
    pub fn absolute_pos(&self) -> u32 {
        self.cube_pos * self.cube_dim() + self.unit_pos
    }

    /// Waits until every unit of the cube reached this point.
    ///
    /// Every unit of a cube must call it the same number of times.
    pub fn sync_cube(&self) {
        self.barrier.wait();
    }

    /// The shared memory of the cube.
    pub fn shared(&self) -> &S {
        self.shared
    }
}
