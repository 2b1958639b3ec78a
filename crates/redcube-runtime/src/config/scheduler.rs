/// Configuration of the cube scheduler.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SchedulerConfig {
    /// Number of workers executing cubes concurrently.
    ///
    /// Defaults to the available parallelism of the host.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Order in which cubes are handed to the workers.
    #[serde(default)]
    pub cube_order: CubeOrder,

    /// Stack size of the thread running each unit, in bytes.
    ///
    /// Defaults to the platform default for spawned threads.
    #[serde(default)]
    pub unit_stack_size: Option<usize>,
}

/// Order in which the cubes of a launch are dispatched.
///
/// Kernels must never depend on it: cubes make no progress guarantee relative to one another.
#[derive(Default, Copy, Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum CubeOrder {
    /// Increasing cube position.
    #[default]
    #[serde(rename = "sequential")]
    Sequential,
    /// Decreasing cube position.
    #[serde(rename = "reversed")]
    Reversed,
    /// A random permutation drawn from the given seed.
    #[serde(rename = "shuffled")]
    Shuffled {
        /// Seed of the permutation.
        seed: u64,
    },
}

impl CubeOrder {
    /// Parses `sequential`, `reversed`, `shuffled` or `shuffled:<seed>`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sequential" => Some(Self::Sequential),
            "reversed" => Some(Self::Reversed),
            "shuffled" => Some(Self::Shuffled { seed: 0 }),
            other => other
                .strip_prefix("shuffled:")
                .and_then(|seed| seed.parse().ok())
                .map(|seed| Self::Shuffled { seed }),
        }
    }
}
