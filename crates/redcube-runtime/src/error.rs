use core::fmt::Write;
use core::sync::atomic::{AtomicI8, Ordering};

use redcube_common::backtrace::BackTrace;
use thiserror::Error;

use crate::config::{GlobalConfig, Logger, diagnostics::DiagnosticsLogLevel};

/// Status returned by every native device call.
///
/// The numeric codes are stable and match the ones reported by common accelerator runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DeviceStatus {
    /// The call succeeded.
    Success = 0,
    /// A parameter is out of its accepted range.
    InvalidValue = 1,
    /// The device can't allocate the requested memory.
    MemoryAllocation = 2,
    /// The launch geometry is invalid for the device.
    InvalidConfiguration = 9,
    /// The launch requested more resources than the device provides.
    LaunchOutOfResources = 701,
    /// A unit faulted during the execution of the kernel.
    LaunchFailure = 719,
}

impl DeviceStatus {
    /// The numeric status code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Finds the status matching a numeric code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::InvalidValue),
            2 => Some(Self::MemoryAllocation),
            9 => Some(Self::InvalidConfiguration),
            701 => Some(Self::LaunchOutOfResources),
            719 => Some(Self::LaunchFailure),
            _ => None,
        }
    }

    /// Whether the call succeeded.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Converts a native status into a result, wrapping failures with the given context.
    pub fn check(self, context: &str) -> Result<(), DeviceError> {
        match self {
            Self::Success => Ok(()),
            status => Err(DeviceError::build(
                format!("{context}: {}", status.description()),
                status.code(),
            )),
        }
    }

    /// Short human readable description.
    pub fn description(self) -> &'static str {
        match self {
            Self::Success => "no error",
            Self::InvalidValue => "invalid argument",
            Self::MemoryAllocation => "out of memory",
            Self::InvalidConfiguration => "invalid configuration argument",
            Self::LaunchOutOfResources => "too many resources requested for launch",
            Self::LaunchFailure => "unspecified launch failure",
        }
    }
}

/// An error returned by the device runtime.
///
/// Every failing native call is converted into this error through [DeviceError::build] before
/// reaching the host caller. There is no recovery at the kernel level.
#[derive(Error, Clone)]
#[error("{message}")]
pub struct DeviceError {
    message: String,
    code: i32,
    backtrace: Option<BackTrace>,
}

impl DeviceError {
    /// Builds an error from a failing native call.
    ///
    /// The message gets `"; Error code: [<code>]"` appended. When diagnostics are enabled, the
    /// message is written to the diagnostics stream right away, and with the `backtrace` level
    /// the current call stack is captured, written and attached to the error.
    pub fn build(message: impl Into<String>, code: i32) -> Self {
        let mut message = message.into();
        let _ = write!(message, "; Error code: [{code}]");

        let backtrace = report(&message);

        Self {
            message,
            code,
            backtrace,
        }
    }

    /// The full error message, including the error code.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The native status code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The status matching the code, if it's a known one.
    pub fn status(&self) -> Option<DeviceStatus> {
        DeviceStatus::from_code(self.code)
    }

    /// The call stack captured when the error was built, if diagnostics asked for it.
    pub fn backtrace(&self) -> Option<&BackTrace> {
        self.backtrace.as_ref()
    }
}

impl core::fmt::Debug for DeviceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.backtrace {
            Some(backtrace) => f.write_fmt(format_args!("{}\nBacktrace:\n{backtrace}", self.message)),
            None => f.write_fmt(format_args!("{}", self.message)),
        }
    }
}

static DIAGNOSTICS_LEVEL: AtomicI8 = AtomicI8::new(-1);
static DIAGNOSTICS_LOGGER: spin::Mutex<Option<Logger>> = spin::Mutex::new(None);

fn diagnostics_level() -> DiagnosticsLogLevel {
    let level = DIAGNOSTICS_LEVEL.load(Ordering::Relaxed);
    let level = if level == -1 {
        let val = match GlobalConfig::get().diagnostics.logger.level {
            DiagnosticsLogLevel::Disabled => 0,
            DiagnosticsLogLevel::Errors => 1,
            DiagnosticsLogLevel::Backtrace => 2,
        };
        DIAGNOSTICS_LEVEL.store(val, Ordering::Relaxed);
        val
    } else {
        level
    };

    match level {
        0 => DiagnosticsLogLevel::Disabled,
        1 => DiagnosticsLogLevel::Errors,
        _ => DiagnosticsLogLevel::Backtrace,
    }
}

fn report(message: &str) -> Option<BackTrace> {
    let level = diagnostics_level();
    if level == DiagnosticsLogLevel::Disabled {
        return None;
    }

    let backtrace = match level {
        DiagnosticsLogLevel::Backtrace => Some(BackTrace::capture()),
        _ => None,
    };

    let mut logger = DIAGNOSTICS_LOGGER.lock();
    let logger = logger.get_or_insert_with(Logger::new);
    logger.log_diagnostics(&format!("[redcube] device error: {message}"));
    if let Some(backtrace) = &backtrace {
        logger.log_diagnostics(&backtrace);
    }

    backtrace
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_appends_error_code() {
        let error = DeviceError::build("native failure", 77);

        assert_eq!(error.message(), "native failure; Error code: [77]");
        assert!(error.to_string().contains("Error code: [77]"));
        assert_eq!(error.code(), 77);
        assert_eq!(error.status(), None);
    }

    #[test]
    fn negative_codes_are_rendered_in_decimal() {
        let error = DeviceError::build("driver", -3);

        assert!(error.message().ends_with("; Error code: [-3]"));
    }

    #[test]
    fn success_status_is_not_an_error() {
        assert!(DeviceStatus::Success.check("noop").is_ok());
    }

    #[test]
    fn failed_status_is_wrapped() {
        let error = DeviceStatus::LaunchFailure
            .check("Failed to launch reduce")
            .unwrap_err();

        assert_eq!(error.status(), Some(DeviceStatus::LaunchFailure));
        assert_eq!(
            error.message(),
            "Failed to launch reduce: unspecified launch failure; Error code: [719]"
        );
    }

    #[test]
    fn status_codes_round_trip() {
        for status in [
            DeviceStatus::Success,
            DeviceStatus::InvalidValue,
            DeviceStatus::MemoryAllocation,
            DeviceStatus::InvalidConfiguration,
            DeviceStatus::LaunchOutOfResources,
            DeviceStatus::LaunchFailure,
        ] {
            assert_eq!(DeviceStatus::from_code(status.code()), Some(status));
        }
    }
}
