use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Reusable barrier for the units of one cube.
///
/// Units that return from the kernel are retired and no longer awaited, like exited threads on
/// real hardware. When a unit faults, the barrier is aborted: every unit waiting on it, or
/// reaching it later, unwinds so that the cube terminates and the launch reports a failure.
#[derive(Debug)]
pub struct CubeBarrier {
    state: Mutex<BarrierState>,
    condvar: Condvar,
}

#[derive(Debug)]
struct BarrierState {
    expected: usize,
    arrived: usize,
    generation: u64,
    aborted: bool,
}

/// Payload of the unwinding triggered in units waiting on an aborted barrier.
#[derive(Debug)]
pub struct CubeAborted;

impl CubeBarrier {
    /// Creates a barrier for `units` units.
    pub fn new(units: usize) -> Self {
        Self {
            state: Mutex::new(BarrierState {
                expected: units,
                arrived: 0,
                generation: 0,
                aborted: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Blocks until every active unit of the cube reached the barrier.
    pub fn wait(&self) {
        let mut state = self.lock();
        if state.aborted {
            drop(state);
            std::panic::resume_unwind(Box::new(CubeAborted));
        }

        state.arrived += 1;
        if state.arrived >= state.expected {
            Self::release(&mut state);
            self.condvar.notify_all();
            return;
        }

        let generation = state.generation;
        while state.generation == generation && !state.aborted {
            state = self
                .condvar
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.generation == generation {
            drop(state);
            std::panic::resume_unwind(Box::new(CubeAborted));
        }
    }

    /// Removes a unit that finished executing from the set of awaited units.
    pub fn retire(&self) {
        let mut state = self.lock();
        state.expected = state.expected.saturating_sub(1);
        if state.arrived > 0 && state.arrived >= state.expected {
            Self::release(&mut state);
            self.condvar.notify_all();
        }
    }

    /// Releases every waiting unit with a fault.
    pub fn abort(&self) {
        let mut state = self.lock();
        state.aborted = true;
        self.condvar.notify_all();
    }

    /// Whether a unit of the cube faulted.
    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    fn release(state: &mut BarrierState) {
        state.arrived = 0;
        state.generation += 1;
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn all_units_observe_writes_before_barrier() {
        let barrier = CubeBarrier::new(8);
        let counter = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    counter.fetch_add(1, Ordering::Relaxed);
                    barrier.wait();
                    assert_eq!(counter.load(Ordering::Relaxed), 8);
                    barrier.wait();
                    counter.fetch_add(1, Ordering::Relaxed);
                });
            }
        });

        assert_eq!(counter.load(Ordering::Relaxed), 16);
    }

    #[test]
    fn retired_units_are_not_awaited() {
        let barrier = CubeBarrier::new(4);

        std::thread::scope(|scope| {
            scope.spawn(|| barrier.retire());
            for _ in 0..3 {
                scope.spawn(|| {
                    barrier.wait();
                    barrier.wait();
                });
            }
        });
    }

    #[test]
    fn abort_unwinds_waiting_units() {
        let barrier = CubeBarrier::new(3);

        let aborted = std::thread::scope(|scope| {
            let waiters: Vec<_> = (0..2)
                .map(|_| {
                    scope.spawn(|| {
                        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| barrier.wait()))
                            .is_err()
                    })
                })
                .collect();
            barrier.abort();
            waiters
                .into_iter()
                .map(|waiter| waiter.join().unwrap())
                .collect::<Vec<_>>()
        });

        assert_eq!(aborted, vec![true, true]);
        assert!(barrier.is_aborted());
    }
}
