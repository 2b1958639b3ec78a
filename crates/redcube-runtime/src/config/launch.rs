use super::logger::{BinaryLogLevel, LoggerConfig};

/// Configuration for logging kernel launches.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LaunchConfig {
    /// Logger configuration for launches.
    #[serde(default)]
    pub logger: LoggerConfig<LaunchLogLevel>,
}

/// Log level for kernel launches.
pub type LaunchLogLevel = BinaryLogLevel;
