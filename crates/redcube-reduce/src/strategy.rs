use serde::{Deserialize, Serialize};

/// Overrides of the launch geometry chosen by [ReduceConfig](crate::ReduceConfig).
///
/// Values outside of the device limits are clamped.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct ReduceStrategy {
    /// Number of units per cube.
    pub cube_dim: Option<u32>,

    /// Number of cubes.
    pub cube_count: Option<u32>,
}

impl ReduceStrategy {
    /// Forces the number of units per cube.
    pub fn with_cube_dim(mut self, cube_dim: u32) -> Self {
        self.cube_dim = Some(cube_dim);
        self
    }

    /// Forces the number of cubes.
    pub fn with_cube_count(mut self, cube_count: u32) -> Self {
        self.cube_count = Some(cube_count);
        self
    }
}
