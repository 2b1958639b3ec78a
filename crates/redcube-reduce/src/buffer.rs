use redcube_runtime::{ComputeClient, DeviceAtomic, DeviceBuffer, DeviceError};

use crate::Numeric;

/// Global scratch memory of the grid-wide reduction.
///
/// Holds one partial slot per cube plus the reserved counter slot used for the last cube
/// election. Each cube of a launch writes its own slot exactly once; the counter is only
/// touched atomically and is reset to zero by the kernel itself when a reduction completes, so
/// the buffer can be reused by the next launch without any host intervention.
///
/// A buffer must not be shared by concurrent launches.
pub struct ReductionBuffer<N> {
    partials: DeviceBuffer<N>,
    counter: DeviceAtomic,
}

impl<N: Numeric> ReductionBuffer<N> {
    /// Allocates a buffer able to serve launches of up to `num_slots` cubes, with a zeroed counter.
    pub fn new(client: &ComputeClient, num_slots: usize) -> Result<Self, DeviceError> {
        Ok(Self {
            partials: client.empty(num_slots, N::zero())?,
            counter: DeviceAtomic::new(0),
        })
    }

    /// Maximum number of cubes a launch using this buffer can have.
    pub fn capacity(&self) -> usize {
        self.partials.len()
    }

    /// Current value of the counter slot.
    pub fn counter(&self) -> u32 {
        self.counter.load()
    }

    /// Copies the partial slots back to the host.
    pub fn partials(&self) -> Vec<N> {
        self.partials.to_vec()
    }

    pub(crate) fn reset_counter(&self) {
        self.counter.store(0);
    }

    pub(crate) fn partial_slots(&self) -> &DeviceBuffer<N> {
        &self.partials
    }

    pub(crate) fn counter_slot(&self) -> &DeviceAtomic {
        &self.counter
    }
}

impl<N: Numeric> core::fmt::Debug for ReductionBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReductionBuffer")
            .field("capacity", &self.capacity())
            .field("counter", &self.counter())
            .finish()
    }
}
