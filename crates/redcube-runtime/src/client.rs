use std::sync::Arc;

use crate::{
    config::{GlobalConfig, Logger, launch::LaunchLogLevel, scheduler::CubeOrder},
    error::{DeviceError, DeviceStatus},
    kernel::{CubeCount, CubeDim, KernelTask},
    memory::DeviceBuffer,
    scheduler::Scheduler,
};

/// Limits of the device.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HardwareProperties {
    /// Maximum number of units in a cube.
    pub max_units_per_cube: u32,
    /// Maximum number of cubes in a launch.
    pub max_cube_count: u32,
    /// Maximum shared memory per cube, in bytes.
    pub max_shared_memory_size: usize,
    /// Maximum size of one allocation, in bytes.
    pub max_allocation_size: usize,
}

impl Default for HardwareProperties {
    fn default() -> Self {
        Self {
            max_units_per_cube: 1024,
            max_cube_count: u16::MAX as u32,
            max_shared_memory_size: 48 * 1024,
            max_allocation_size: 1024 * 1024 * 1024,
        }
    }
}

/// Properties of a device.
#[derive(new, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceProperties {
    /// Name of the device, for debugging.
    pub name: String,
    /// Limits of the device.
    pub hardware: HardwareProperties,
}

impl Default for DeviceProperties {
    fn default() -> Self {
        Self::new("host".to_string(), HardwareProperties::default())
    }
}

/// The compute client is the host handle used to allocate device memory and launch kernels.
///
/// Every native call returns a [DeviceStatus], which the client converts into a [DeviceError]
/// on failure.
#[derive(Clone, Debug)]
pub struct ComputeClient {
    properties: Arc<DeviceProperties>,
    scheduler: Scheduler,
    logger: Arc<spin::Mutex<Logger>>,
}

impl Default for ComputeClient {
    fn default() -> Self {
        Self::new(DeviceProperties::default())
    }
}

impl ComputeClient {
    /// Creates a client for a device with the given properties, scheduled as configured in the
    /// [global config](GlobalConfig).
    pub fn new(properties: DeviceProperties) -> Self {
        let config = GlobalConfig::get();

        Self {
            properties: Arc::new(properties),
            scheduler: Scheduler::new(&config.scheduler),
            logger: Arc::new(spin::Mutex::new(Logger::new())),
        }
    }

    /// Returns a client dispatching cubes in the given order.
    pub fn with_cube_order(mut self, order: CubeOrder) -> Self {
        self.scheduler = self.scheduler.with_order(order);
        self
    }

    /// The properties of the device.
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    /// Allocates a buffer holding a copy of `data`.
    pub fn create<T: Copy>(&self, data: &[T]) -> Result<DeviceBuffer<T>, DeviceError> {
        self.check_allocation::<T>(data.len())
            .check("Failed to allocate device buffer")?;
        Ok(DeviceBuffer::from_slice(data))
    }

    /// Allocates a buffer of `len` elements, all set to `value`.
    pub fn empty<T: Copy>(&self, len: usize, value: T) -> Result<DeviceBuffer<T>, DeviceError> {
        self.check_allocation::<T>(len)
            .check("Failed to allocate device buffer")?;
        Ok(DeviceBuffer::filled(len, value))
    }

    /// Launches a kernel and waits for all of its cubes to complete.
    ///
    /// The launch either runs to completion or fails as a unit; there is no partial result
    /// recovery.
    pub fn launch<K: KernelTask>(
        &self,
        kernel: &K,
        cube_count: CubeCount,
        cube_dim: CubeDim,
        shared_memory_size: usize,
    ) -> Result<(), DeviceError> {
        let context = format!("Failed to launch kernel {}", kernel.name());

        self.validate_launch(cube_count, cube_dim, shared_memory_size)
            .check(&context)?;

        self.log_launch(kernel.name(), cube_count, cube_dim, shared_memory_size);

        self.scheduler
            .dispatch(
                kernel,
                cube_count.num_cubes(),
                cube_dim,
                shared_memory_size,
            )
            .check(&context)
    }

    fn check_allocation<T>(&self, len: usize) -> DeviceStatus {
        let size = len.checked_mul(core::mem::size_of::<T>());
        match size {
            Some(size) if size <= self.properties.hardware.max_allocation_size => {
                DeviceStatus::Success
            }
            _ => DeviceStatus::MemoryAllocation,
        }
    }

    fn validate_launch(
        &self,
        cube_count: CubeCount,
        cube_dim: CubeDim,
        shared_memory_size: usize,
    ) -> DeviceStatus {
        let hardware = &self.properties.hardware;
        let num_cubes = cube_count.num_cubes();
        let num_units = cube_dim.num_elems();

        if num_cubes == 0 || num_cubes > hardware.max_cube_count {
            return DeviceStatus::InvalidConfiguration;
        }
        if num_units == 0 || num_units > hardware.max_units_per_cube {
            return DeviceStatus::InvalidConfiguration;
        }
        if shared_memory_size > hardware.max_shared_memory_size {
            return DeviceStatus::LaunchOutOfResources;
        }

        DeviceStatus::Success
    }

    fn log_launch(
        &self,
        name: &str,
        cube_count: CubeCount,
        cube_dim: CubeDim,
        shared_memory_size: usize,
    ) {
        log::debug!(
            "Launching {name} with {} cubes of {} units, {shared_memory_size} bytes of shared memory",
            cube_count.num_cubes(),
            cube_dim.num_elems()
        );

        let mut logger = self.logger.lock();
        if let LaunchLogLevel::Full = logger.log_level_launch() {
            logger.log_launch(&format!(
                "[{}] {name} cube_count={cube_count:?} cube_dim={cube_dim:?} shared_memory_size={shared_memory_size}",
                self.properties.name
            ));
        }
    }
}
