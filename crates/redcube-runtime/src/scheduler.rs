use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    barrier::CubeBarrier,
    config::scheduler::{CubeOrder, SchedulerConfig},
    error::DeviceStatus,
    kernel::{CubeDim, KernelTask},
    unit::UnitContext,
};

/// Dispatches the cubes of a launch to a bounded pool of workers.
///
/// A worker executes one cube at a time, spawning one thread per unit. Cubes are taken from a
/// shared queue, so they start and finish in no particular order relative to one another.
#[derive(Debug, Clone)]
pub(crate) struct Scheduler {
    workers: usize,
    order: CubeOrder,
    unit_stack_size: Option<usize>,
}

impl Scheduler {
    pub(crate) fn new(config: &SchedulerConfig) -> Self {
        let workers = config.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1)
        });

        Self {
            workers: workers.max(1),
            order: config.cube_order,
            unit_stack_size: config.unit_stack_size,
        }
    }

    pub(crate) fn with_order(mut self, order: CubeOrder) -> Self {
        self.order = order;
        self
    }

    /// Runs every cube of the launch and returns the status of the first failing cube.
    ///
    /// A unit that faults fails its cube with [DeviceStatus::LaunchFailure]. A unit thread that
    /// can't be spawned fails its cube with [DeviceStatus::LaunchOutOfResources]. Cubes that
    /// didn't start yet when a cube fails are never started.
    pub(crate) fn dispatch<K: KernelTask>(
        &self,
        kernel: &K,
        cube_count: u32,
        cube_dim: CubeDim,
        shared_memory_size: usize,
    ) -> DeviceStatus {
        let queue = self.cube_sequence(cube_count);
        let next = AtomicUsize::new(0);
        let stopped = AtomicBool::new(false);
        let failure = spin::Mutex::new(None);
        let workers = self.workers.min(queue.len());

        std::thread::scope(|scope| {
            for worker in 0..workers {
                let queue = &queue;
                let next = &next;
                let stopped = &stopped;
                let failure = &failure;

                let spawned = std::thread::Builder::new()
                    .name(format!("redcube-worker-{worker}"))
                    .spawn_scoped(scope, move || {
                        log::trace!("Worker {worker} started");
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            if index >= queue.len() || stopped.load(Ordering::Relaxed) {
                                break;
                            }

                            let cube_pos = queue[index];
                            log::trace!("Worker {worker} executes cube {cube_pos}");
                            let status = self.execute_cube(
                                kernel,
                                cube_pos,
                                cube_count,
                                cube_dim,
                                shared_memory_size,
                            );
                            if !status.is_success() {
                                log::debug!(
                                    "Cube {cube_pos} of kernel {} failed with {status:?}",
                                    kernel.name()
                                );
                                record_failure(failure, stopped, status);
                            }
                        }
                        log::trace!("Worker {worker} stopped");
                    });

                if let Err(err) = spawned {
                    log::warn!("Failed to spawn cube worker {worker}: {err}");
                    // Workers already running drain the queue on their own.
                    if worker == 0 {
                        record_failure(&failure, &stopped, DeviceStatus::LaunchOutOfResources);
                    }
                    break;
                }
            }
        });

        failure.into_inner().unwrap_or(DeviceStatus::Success)
    }

    fn cube_sequence(&self, cube_count: u32) -> Vec<u32> {
        let mut cubes: Vec<u32> = (0..cube_count).collect();
        match self.order {
            CubeOrder::Sequential => {}
            CubeOrder::Reversed => cubes.reverse(),
            CubeOrder::Shuffled { seed } => cubes.shuffle(&mut StdRng::seed_from_u64(seed)),
        }
        cubes
    }

    fn execute_cube<K: KernelTask>(
        &self,
        kernel: &K,
        cube_pos: u32,
        cube_count: u32,
        cube_dim: CubeDim,
        shared_memory_size: usize,
    ) -> DeviceStatus {
        let shared = match catch_unwind(AssertUnwindSafe(|| kernel.init_shared(shared_memory_size))) {
            Ok(shared) => shared,
            Err(_) => return DeviceStatus::LaunchFailure,
        };
        let num_units = cube_dim.num_elems();
        let barrier = CubeBarrier::new(num_units as usize);

        std::thread::scope(|scope| {
            let mut units = Vec::with_capacity(num_units as usize);

            for unit_pos in 0..num_units {
                let shared = &shared;
                let barrier = &barrier;

                let mut builder = std::thread::Builder::new();
                if let Some(stack_size) = self.unit_stack_size {
                    builder = builder.stack_size(stack_size);
                }
                let spawned = builder.spawn_scoped(scope, move || {
                    let unit =
                        UnitContext::new(unit_pos, cube_pos, cube_dim, cube_count, barrier, shared);
                    let result = catch_unwind(AssertUnwindSafe(|| kernel.execute(&unit)));
                    match result {
                        Ok(()) => barrier.retire(),
                        Err(_) => barrier.abort(),
                    }
                    result.is_ok()
                });

                match spawned {
                    Ok(unit) => units.push(unit),
                    Err(err) => {
                        log::warn!("Failed to spawn unit {unit_pos} of cube {cube_pos}: {err}");
                        // Units already running unwind on the aborted barrier.
                        barrier.abort();
                        for unit in units {
                            let _ = unit.join();
                        }
                        return DeviceStatus::LaunchOutOfResources;
                    }
                }
            }

            let completed = units
                .into_iter()
                .map(|unit| unit.join().unwrap_or(false))
                .fold(true, |acc, ok| acc && ok);

            match completed {
                true => DeviceStatus::Success,
                false => DeviceStatus::LaunchFailure,
            }
        })
    }
}

fn record_failure(
    failure: &spin::Mutex<Option<DeviceStatus>>,
    stopped: &AtomicBool,
    status: DeviceStatus,
) {
    failure.lock().get_or_insert(status);
    stopped.store(true, Ordering::Relaxed);
}
