use redcube_runtime::{CubeCount, CubeDim, DeviceProperties, HardwareProperties};

use crate::primitives::floor_pow2;
use crate::{Numeric, ReduceStrategy};

const MAX_DEFAULT_CUBE_DIM: u32 = 256;
const MAX_DEFAULT_CUBE_COUNT: u32 = 64;

/// Launch geometry of a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceConfig {
    /// Number of cubes.
    pub cube_count: CubeCount,
    /// Number of units per cube.
    pub cube_dim: CubeDim,
    /// Shared memory of one cube, in bytes: one accumulator per unit.
    pub shared_memory_size: usize,
}

impl ReduceConfig {
    /// Geometry of a scalar reduction over `len` elements using a scratch buffer of `capacity`
    /// slots.
    ///
    /// Without overrides, the cube size is the smallest power of two covering `len`, up to 256,
    /// and there are enough cubes to give every unit one element, up to the scratch capacity.
    /// Units stride over the remaining elements. An overridden cube count may exceed the
    /// capacity.
    pub fn generate<N: Numeric>(
        len: usize,
        capacity: usize,
        properties: &DeviceProperties,
        strategy: &ReduceStrategy,
    ) -> Self {
        let hardware = &properties.hardware;
        let config = Self::new().generate_cube_dim::<N>(len, hardware, strategy);
        let needed = len.div_ceil(config.cube_dim.num_elems() as usize);
        let default_limit = saturating_u32(capacity).min(hardware.max_cube_count);

        config.generate_cube_count(needed, default_limit, hardware.max_cube_count, strategy)
    }

    /// Geometry of a per-segment reduction of `num_segments` segments of `axis_len` elements.
    ///
    /// One cube reduces one segment at a time; cubes stride over the segments when there are
    /// more segments than cubes.
    pub fn generate_axis<N: Numeric>(
        axis_len: usize,
        num_segments: usize,
        properties: &DeviceProperties,
        strategy: &ReduceStrategy,
    ) -> Self {
        let hardware = &properties.hardware;

        Self::new()
            .generate_cube_dim::<N>(axis_len, hardware, strategy)
            .generate_cube_count(
                num_segments,
                hardware.max_cube_count,
                hardware.max_cube_count,
                strategy,
            )
    }

    fn new() -> Self {
        // Placeholder, every field is overwritten by the generate steps.
        Self {
            cube_count: CubeCount::new_single(),
            cube_dim: CubeDim::new_single(),
            shared_memory_size: 0,
        }
    }

    fn generate_cube_dim<N: Numeric>(
        mut self,
        reduce_len: usize,
        hardware: &HardwareProperties,
        strategy: &ReduceStrategy,
    ) -> Self {
        let slot_size = core::mem::size_of::<N>().max(1);
        let max_by_shared = saturating_u32(hardware.max_shared_memory_size / slot_size);
        let max = hardware.max_units_per_cube.min(max_by_shared).max(1);

        let units = match strategy.cube_dim {
            Some(requested) => clamp("cube_dim", requested, max),
            None => {
                let covering = saturating_u32(reduce_len).max(1).next_power_of_two();
                covering.min(MAX_DEFAULT_CUBE_DIM).min(floor_pow2(max))
            }
        };

        self.cube_dim = CubeDim::new_1d(units);
        self.shared_memory_size = units as usize * slot_size;
        self
    }

    // Overrides are only bounded by the hardware, the launcher rejects them when the scratch
    // buffer is too small.
    fn generate_cube_count(
        mut self,
        needed: usize,
        default_limit: u32,
        hardware_limit: u32,
        strategy: &ReduceStrategy,
    ) -> Self {
        let cubes = match strategy.cube_count {
            Some(requested) => clamp("cube_count", requested, hardware_limit.max(1)),
            None => saturating_u32(needed)
                .min(MAX_DEFAULT_CUBE_COUNT)
                .min(default_limit)
                .max(1),
        };

        self.cube_count = CubeCount::new_1d(cubes);
        self
    }

    /// Number of cubes.
    pub fn num_cubes(&self) -> u32 {
        self.cube_count.num_cubes()
    }

    /// Number of units per cube.
    pub fn num_units(&self) -> u32 {
        self.cube_dim.num_elems()
    }
}

fn clamp(name: &str, requested: u32, max: u32) -> u32 {
    let value = requested.clamp(1, max);
    if value != requested {
        log::warn!("Requested {name} {requested} is out of the supported range [1, {max}], using {value}");
    }
    value
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn small_inputs_use_a_single_covering_cube() {
        let config =
            ReduceConfig::generate::<f32>(7, 16, &DeviceProperties::default(), &Default::default());

        assert_eq!(config.num_units(), 8);
        assert_eq!(config.num_cubes(), 1);
        assert_eq!(config.shared_memory_size, 8 * 4);
    }

    #[test]
    fn large_inputs_are_bounded_by_capacity() {
        let config = ReduceConfig::generate::<f64>(
            10_000,
            5,
            &DeviceProperties::default(),
            &Default::default(),
        );

        assert_eq!(config.num_units(), 256);
        assert_eq!(config.num_cubes(), 5);
    }

    #[test]
    fn overrides_are_clamped() {
        let strategy = ReduceStrategy::default()
            .with_cube_dim(4096)
            .with_cube_count(0);
        let config = ReduceConfig::generate::<i32>(100, 8, &DeviceProperties::default(), &strategy);

        assert_eq!(config.num_units(), 1024);
        assert_eq!(config.num_cubes(), 1);
    }

    #[test]
    fn cube_dim_is_bounded_by_shared_memory() {
        let mut properties = DeviceProperties::default();
        properties.hardware.max_shared_memory_size = 100 * 8;
        let config = ReduceConfig::generate_axis::<f64>(1000, 3, &properties, &Default::default());

        assert_eq!(config.num_units(), 64);
        assert_eq!(config.num_cubes(), 3);
    }

    #[test]
    fn cube_count_override_ignores_capacity() {
        let strategy = ReduceStrategy::default().with_cube_count(12);
        let config = ReduceConfig::generate::<u32>(100, 4, &DeviceProperties::default(), &strategy);

        assert_eq!(config.num_cubes(), 12);
    }
}
