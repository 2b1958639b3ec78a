use super::logger::{LogLevel, LoggerConfig};

/// Configuration of the diagnostics stream, where device errors are reported.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DiagnosticsConfig {
    /// Logger configuration for device errors.
    #[serde(default = "default_logger")]
    pub logger: LoggerConfig<DiagnosticsLogLevel>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            logger: default_logger(),
        }
    }
}

fn default_logger() -> LoggerConfig<DiagnosticsLogLevel> {
    LoggerConfig {
        stderr: true,
        ..Default::default()
    }
}

/// How much is reported when a device error is built.
#[derive(Default, Copy, Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum DiagnosticsLogLevel {
    /// Nothing is reported, errors are only returned to the caller.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// The error message is reported.
    #[serde(rename = "errors")]
    Errors,

    /// The error message is reported along with the call stack captured where the error was
    /// built. The call stack is also attached to the error.
    #[serde(rename = "backtrace")]
    Backtrace,
}

impl LogLevel for DiagnosticsLogLevel {}
