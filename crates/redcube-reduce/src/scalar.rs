use core::marker::PhantomData;

use redcube_common::TensorLayout;
use redcube_runtime::{
    ComputeClient, DeviceBuffer, DeviceError, KernelTask, SharedMemory, UnitContext, memory_fence,
};

use crate::instructions::ReduceInstruction;
use crate::primitives::{aggregate_partials, valid_count};
use crate::{Numeric, ReductionBuffer};

/// Records which cube of a scalar reduction was elected to run the final fold.
///
/// Flags are cleared at the start of every launch. A single-cube launch has no election, its
/// only cube is recorded as the one writing the result.
pub struct ElectionLog {
    flags: DeviceBuffer<bool>,
}

impl ElectionLog {
    /// Allocates a log for launches of up to `num_cubes` cubes.
    pub fn new(client: &ComputeClient, num_cubes: usize) -> Result<Self, DeviceError> {
        Ok(Self {
            flags: client.empty(num_cubes, false)?,
        })
    }

    /// The election flag of every cube, indexed by cube position.
    pub fn flags(&self) -> Vec<bool> {
        self.flags.to_vec()
    }

    /// Number of cubes that were elected.
    pub fn elected_count(&self) -> usize {
        self.flags().into_iter().filter(|elected| *elected).count()
    }

    /// Maximum number of cubes the log can record.
    pub fn capacity(&self) -> usize {
        self.flags.len()
    }

    pub(crate) fn clear(&self) {
        for cube_pos in 0..self.flags.len() {
            self.flags.write(cube_pos, false);
        }
    }

    fn record(&self, cube_pos: u32, elected: bool) {
        self.flags.write(cube_pos as usize, elected);
    }
}

impl core::fmt::Debug for ElectionLog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElectionLog")
            .field("flags", &self.flags)
            .finish()
    }
}

/// Shared memory of one cube of the scalar reduction.
pub(crate) struct ScalarShared<N> {
    partials: SharedMemory<N>,
    is_last: SharedMemory<bool>,
}

/// Reduces a whole strided tensor to a single value.
///
/// Every cube folds its share of the tensor into one partial. With a single cube, that partial
/// is the result. Otherwise every cube publishes its partial to its slot of the scratch buffer
/// and takes a ticket from the scratch counter; the cube drawing the last ticket folds all the
/// slots. No cube ever waits on another one.
#[derive(new)]
pub(crate) struct ReduceScalarKernel<'a, N, R> {
    input: &'a DeviceBuffer<N>,
    layout: &'a TensorLayout,
    extra_params: &'a [N],
    output: &'a DeviceBuffer<N>,
    scratch: &'a ReductionBuffer<N>,
    election: Option<&'a ElectionLog>,
    #[new(default)]
    _instruction: PhantomData<R>,
}

impl<N: Numeric, R: ReduceInstruction<N>> KernelTask for ReduceScalarKernel<'_, N, R> {
    type Shared = ScalarShared<N>;

    fn name(&self) -> &'static str {
        "reduce_scalar"
    }

    fn init_shared(&self, shared_memory_size: usize) -> Self::Shared {
        ScalarShared {
            partials: SharedMemory::new(
                SharedMemory::<N>::slots_in(shared_memory_size),
                R::starting_value(self.extra_params),
            ),
            is_last: SharedMemory::new(1, false),
        }
    }

    fn execute(&self, unit: &UnitContext<'_, Self::Shared>) {
        let extra_params = self.extra_params;
        let tid = unit.unit_pos();
        let cube_dim = unit.cube_dim();
        let cube_count = unit.cube_count();
        let len = self.layout.len();
        let partials = &unit.shared().partials;

        let stride = cube_dim as usize * cube_count as usize;
        let mut accumulator = R::starting_value(extra_params);
        let mut index = unit.absolute_pos() as usize;
        while index < len {
            let item = self.input.read(self.layout.offset_of(index));
            accumulator = R::update(accumulator, R::op(item, extra_params), extra_params);
            index += stride;
        }
        partials.write(tid as usize, accumulator);
        unit.sync_cube();

        aggregate_partials::<N, R, _>(unit, partials, valid_count(cube_dim, len), extra_params);

        if cube_count == 1 {
            if tid == 0 {
                self.scratch.counter_slot().store(0);
                if let Some(election) = self.election {
                    election.record(0, true);
                }
                let result = R::post_process(partials.read(0), len, extra_params);
                self.output.write(0, result);
            }
            return;
        }

        let is_last = &unit.shared().is_last;
        if tid == 0 {
            let cube_pos = unit.cube_pos();
            self.scratch
                .partial_slots()
                .write(cube_pos as usize, partials.read(0));
            memory_fence();

            let ticket = self.scratch.counter_slot().inc_wrapping(cube_count);
            let elected = ticket == cube_count - 1;
            if elected {
                log::debug!("Cube {cube_pos} drew the last ticket of {cube_count}");
            }
            is_last.write(0, elected);
            if let Some(election) = self.election {
                election.record(cube_pos, elected);
            }
        }
        unit.sync_cube();

        if !is_last.read(0) {
            return;
        }

        if tid == 0 {
            self.scratch.counter_slot().store(0);
        }

        let mut accumulator = R::starting_value(extra_params);
        let mut slot = tid;
        while slot < cube_count {
            let item = self.scratch.partial_slots().read(slot as usize);
            accumulator = R::update(accumulator, item, extra_params);
            slot += cube_dim;
        }
        partials.write(tid as usize, accumulator);
        unit.sync_cube();

        aggregate_partials::<N, R, _>(unit, partials, cube_count.min(cube_dim), extra_params);

        if tid == 0 {
            let result = R::post_process(partials.read(0), len, extra_params);
            self.output.write(0, result);
        }
    }
}
