use core::marker::PhantomData;

use redcube_common::TensorLayout;
use redcube_runtime::{DeviceBuffer, KernelTask, SharedMemory, UnitContext};

use crate::Numeric;
use crate::instructions::ReduceInstruction;
use crate::primitives::{aggregate_partials, valid_count};

/// Reduces every segment of a tensor along one axis.
///
/// `segments` maps the index of a segment to the offset of its first element, and consecutive
/// elements of a segment are `axis_stride` apart. A cube reduces one segment at a time and
/// strides over the segments, so the cubes never communicate.
#[derive(new)]
pub(crate) struct ReduceAxisKernel<'a, N, R> {
    input: &'a DeviceBuffer<N>,
    segments: &'a TensorLayout,
    axis_len: usize,
    axis_stride: usize,
    extra_params: &'a [N],
    output: &'a DeviceBuffer<N>,
    #[new(default)]
    _instruction: PhantomData<R>,
}

impl<N: Numeric, R: ReduceInstruction<N>> KernelTask for ReduceAxisKernel<'_, N, R> {
    type Shared = SharedMemory<N>;

    fn name(&self) -> &'static str {
        "reduce_axis"
    }

    fn init_shared(&self, shared_memory_size: usize) -> Self::Shared {
        SharedMemory::new(
            SharedMemory::<N>::slots_in(shared_memory_size),
            R::starting_value(self.extra_params),
        )
    }

    fn execute(&self, unit: &UnitContext<'_, Self::Shared>) {
        let extra_params = self.extra_params;
        let tid = unit.unit_pos();
        let cube_dim = unit.cube_dim();
        let partials = unit.shared();
        let valid_count = valid_count(cube_dim, self.axis_len);

        let mut segment = unit.cube_pos() as usize;
        while segment < self.segments.len() {
            let start = self.segments.offset_of(segment);

            let mut accumulator = R::starting_value(extra_params);
            let mut index = tid as usize;
            while index < self.axis_len {
                let item = self.input.read(start + index * self.axis_stride);
                accumulator = R::update(accumulator, R::op(item, extra_params), extra_params);
                index += cube_dim as usize;
            }
            partials.write(tid as usize, accumulator);
            unit.sync_cube();

            aggregate_partials::<N, R, _>(unit, partials, valid_count, extra_params);

            if tid == 0 {
                let result = R::post_process(partials.read(0), self.axis_len, extra_params);
                self.output.write(segment, result);
            }
            // Slot 0 is read before the next segment overwrites it.
            unit.sync_cube();

            segment += unit.cube_count() as usize;
        }
    }
}
