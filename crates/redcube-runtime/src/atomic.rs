use core::sync::atomic::{AtomicU32, Ordering, fence};

/// A 32 bits unsigned integer in device memory, only accessed atomically.
#[derive(Debug, Default)]
pub struct DeviceAtomic {
    value: AtomicU32,
}

impl DeviceAtomic {
    /// Creates a new atomic with the given value.
    pub const fn new(value: u32) -> Self {
        Self {
            value: AtomicU32::new(value),
        }
    }

    /// Atomically loads the value.
    pub fn load(&self) -> u32 {
        self.value.load(Ordering::Acquire)
    }

    /// Atomically stores the value.
    pub fn store(&self, value: u32) {
        self.value.store(value, Ordering::Release);
    }

    /// Atomically computes `old >= limit ? 0 : old + 1` and returns `old`.
    ///
    /// Increments are linearizable: with `n` units incrementing a counter starting at zero and
    /// `limit >= n - 1`, every unit observes a distinct value in `0..n`.
    pub fn inc_wrapping(&self, limit: u32) -> u32 {
        let update = |old: u32| Some(if old >= limit { 0 } else { old + 1 });
        match self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, update)
        {
            Ok(old) | Err(old) => old,
        }
    }
}

/// Device-wide memory fence.
///
/// Writes issued before the fence are observed by every other unit of the launch before any
/// write issued after it.
pub fn memory_fence() {
    fence(Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn inc_wrapping_returns_previous_value() {
        let atomic = DeviceAtomic::new(0);

        assert_eq!(atomic.inc_wrapping(2), 0);
        assert_eq!(atomic.inc_wrapping(2), 1);
        assert_eq!(atomic.inc_wrapping(2), 2);
        assert_eq!(atomic.load(), 0);
    }

    #[test]
    fn concurrent_increments_are_distinct() {
        let atomic = Arc::new(DeviceAtomic::new(0));
        let tickets = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let atomic = atomic.clone();
                    scope.spawn(move || atomic.inc_wrapping(16))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<HashSet<_>>()
        });

        assert_eq!(tickets, (0..16).collect());
        assert_eq!(atomic.load(), 16);
    }
}
