use redcube_runtime::{SharedMemory, UnitContext};

use crate::Numeric;
use crate::instructions::ReduceInstruction;

/// Folds the first `valid_count` partials of a cube into `partials[0]`.
///
/// Every unit of the cube must call this function with the same `valid_count`, which must not
/// exceed the cube size nor the length of `partials`. Units at or beyond `valid_count` take part
/// in every synchronization but never touch a slot.
///
/// When `valid_count` isn't a power of two, the slots past the largest power of two are first
/// folded onto the slots at the start of the array. The remaining power-of-two range is then
/// halved until a single slot is left:
///
/// ```text
/// valid_count = 5: [a b c d e] -> [a+e b c d] -> [a+e+c b+d] -> [a+e+c+b+d]
/// ```
pub fn aggregate_partials<N: Numeric, R: ReduceInstruction<N>, S>(
    unit: &UnitContext<'_, S>,
    partials: &SharedMemory<N>,
    valid_count: u32,
    extra_params: &[N],
) {
    let tid = unit.unit_pos();
    let floor = floor_pow2(valid_count);

    if floor != valid_count {
        if tid >= floor && tid < valid_count {
            fold_slot::<N, R>(partials, tid - floor, tid, extra_params);
        }
        unit.sync_cube();
    }

    let mut active = floor / 2;
    while active > 0 {
        if tid < active && tid + active < valid_count {
            fold_slot::<N, R>(partials, tid, tid + active, extra_params);
        }
        unit.sync_cube();
        active /= 2;
    }
}

fn fold_slot<N: Numeric, R: ReduceInstruction<N>>(
    partials: &SharedMemory<N>,
    destination: u32,
    source: u32,
    extra_params: &[N],
) {
    let destination = destination as usize;
    let item = partials.read(source as usize);
    let old = partials.read(destination);
    partials.write(destination, R::update(old, item, extra_params));
}

/// Number of partials a cube holds after its units folded `len` elements.
pub(crate) fn valid_count(cube_dim: u32, len: usize) -> u32 {
    u32::try_from(len).map_or(cube_dim, |len| len.min(cube_dim))
}

/// Largest power of two smaller or equal to `value`, zero for zero.
pub(crate) fn floor_pow2(value: u32) -> u32 {
    match value {
        0 => 0,
        _ => 1 << (u32::BITS - 1 - value.leading_zeros()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::{Max, Min, ReduceOp, Sum};
    use core::marker::PhantomData;
    use redcube_runtime::{ComputeClient, CubeCount, CubeDim, DeviceBuffer, KernelTask};

    /// Loads `valid_count` values in shared memory and aggregates them.
    struct AggregateKernel<'a, N, R> {
        values: &'a DeviceBuffer<N>,
        output: &'a DeviceBuffer<N>,
        valid_count: u32,
        _instruction: PhantomData<R>,
    }

    impl<N: Numeric, R: ReduceInstruction<N>> KernelTask for AggregateKernel<'_, N, R> {
        type Shared = SharedMemory<N>;

        fn init_shared(&self, shared_memory_size: usize) -> Self::Shared {
            SharedMemory::new(
                SharedMemory::<N>::slots_in(shared_memory_size),
                R::starting_value(&[]),
            )
        }

        fn execute(&self, unit: &UnitContext<'_, Self::Shared>) {
            let tid = unit.unit_pos();
            let partials = unit.shared();
            if tid < self.valid_count {
                partials.write(tid as usize, self.values.read(tid as usize));
            }
            unit.sync_cube();

            aggregate_partials::<N, R, _>(unit, partials, self.valid_count, &[]);

            if tid == 0 {
                self.output.write(0, partials.read(0));
            }
        }
    }

    fn aggregate<N: Numeric, R: ReduceInstruction<N>>(
        values: &[N],
        valid_count: u32,
        cube_dim: u32,
    ) -> N {
        let client = ComputeClient::default();
        let values = client.create(values).unwrap();
        let output = client.empty(1, R::starting_value(&[])).unwrap();
        let kernel = AggregateKernel::<N, R> {
            values: &values,
            output: &output,
            valid_count,
            _instruction: PhantomData,
        };

        client
            .launch(
                &kernel,
                CubeCount::new_single(),
                CubeDim::new_1d(cube_dim),
                cube_dim as usize * core::mem::size_of::<N>(),
            )
            .unwrap();

        output.read(0)
    }

    #[test]
    fn sums_five_partials() {
        assert_eq!(aggregate::<i32, Sum>(&[1, 2, 3, 4, 5], 5, 8), 15);
        assert_eq!(aggregate::<i32, Sum>(&[2, 4, 6, 8, 10], 5, 8), 30);
    }

    #[test]
    fn partials_past_valid_count_are_ignored() {
        let values = [1.0f32, 2.0, 3.0, 100.0, 100.0, 100.0];

        assert_eq!(aggregate::<f32, Sum>(&values, 3, 8), 6.0);
    }

    #[test]
    fn every_valid_count_matches_a_sequential_fold() {
        let values: Vec<i64> = (0..16).map(|i| (i * 7919) % 23 - 11).collect();

        for cube_dim in [1, 3, 8, 16] {
            for valid_count in 1..=cube_dim {
                let prefix = &values[..valid_count as usize];
                assert_eq!(
                    aggregate::<i64, Sum>(&values, valid_count, cube_dim),
                    ReduceOp::Sum.fold(prefix, &[]),
                    "sum with cube_dim={cube_dim} valid_count={valid_count}"
                );
                assert_eq!(
                    aggregate::<i64, Max>(&values, valid_count, cube_dim),
                    ReduceOp::Max.fold(prefix, &[]),
                    "max with cube_dim={cube_dim} valid_count={valid_count}"
                );
                assert_eq!(
                    aggregate::<i64, Min>(&values, valid_count, cube_dim),
                    ReduceOp::Min.fold(prefix, &[]),
                    "min with cube_dim={cube_dim} valid_count={valid_count}"
                );
            }
        }
    }

    #[test]
    fn floor_pow2_values() {
        assert_eq!(floor_pow2(0), 0);
        assert_eq!(floor_pow2(1), 1);
        assert_eq!(floor_pow2(5), 4);
        assert_eq!(floor_pow2(256), 256);
    }
}
