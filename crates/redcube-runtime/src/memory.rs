/// A flat region of device memory, addressed only through offsets.
///
/// Buffers are allocated by the [ComputeClient](crate::ComputeClient) and owned by the caller.
/// Every element can be read and written concurrently by any unit of a launch. Accessing an
/// offset outside of the buffer faults the unit, which fails the whole launch.
pub struct DeviceBuffer<T> {
    cells: Box<[spin::Mutex<T>]>,
}

impl<T: Copy> DeviceBuffer<T> {
    pub(crate) fn from_slice(data: &[T]) -> Self {
        Self {
            cells: data.iter().map(|value| spin::Mutex::new(*value)).collect(),
        }
    }

    pub(crate) fn filled(len: usize, value: T) -> Self {
        Self {
            cells: (0..len).map(|_| spin::Mutex::new(value)).collect(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the buffer has no element.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reads the element at the given offset.
    pub fn read(&self, offset: usize) -> T {
        *self.cells[offset].lock()
    }

    /// Writes the element at the given offset.
    pub fn write(&self, offset: usize, value: T) {
        *self.cells[offset].lock() = value;
    }

    /// Copies the buffer content back to the host.
    pub fn to_vec(&self) -> Vec<T> {
        self.cells.iter().map(|cell| *cell.lock()).collect()
    }
}

impl<T: Copy + core::fmt::Debug> core::fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

/// Memory shared by the units of one cube.
///
/// Writes become visible to the other units of the cube once every unit has passed the next
/// [sync_cube](crate::UnitContext::sync_cube).
pub struct SharedMemory<T> {
    cells: Box<[spin::Mutex<T>]>,
}

impl<T: Copy> SharedMemory<T> {
    /// Allocates `len` slots initialized with `value`.
    pub fn new(len: usize, value: T) -> Self {
        Self {
            cells: (0..len).map(|_| spin::Mutex::new(value)).collect(),
        }
    }

    /// Number of slots that fit in `size` bytes.
    pub fn slots_in(size: usize) -> usize {
        size / core::mem::size_of::<T>().max(1)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether there is no slot.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reads a slot.
    pub fn read(&self, index: usize) -> T {
        *self.cells[index].lock()
    }

    /// Writes a slot.
    pub fn write(&self, index: usize, value: T) {
        *self.cells[index].lock() = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_buffer_reads_back_writes() {
        let buffer = DeviceBuffer::from_slice(&[1, 2, 3]);

        buffer.write(1, 7);

        assert_eq!(buffer.to_vec(), vec![1, 7, 3]);
        assert_eq!(buffer.read(2), 3);
    }

    #[test]
    fn shared_memory_slots_from_bytes() {
        assert_eq!(SharedMemory::<f64>::slots_in(64), 8);
        assert_eq!(SharedMemory::<u32>::slots_in(10), 2);
        assert_eq!(SharedMemory::<()>::slots_in(10), 10);
    }
}
