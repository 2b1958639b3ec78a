//! Runs in its own process: the diagnostics level is read once per process.

use redcube_runtime::{
    DeviceError,
    config::{GlobalConfig, diagnostics::DiagnosticsLogLevel},
};

#[test]
fn backtrace_is_captured_and_reported() {
    let log_file = std::env::temp_dir().join(format!(
        "redcube-diagnostics-{}.log",
        std::process::id()
    ));
    let mut config = GlobalConfig::default();
    config.diagnostics.logger.level = DiagnosticsLogLevel::Backtrace;
    config.diagnostics.logger.stderr = false;
    config.diagnostics.logger.file = Some(log_file.clone());
    config.diagnostics.logger.append = false;
    GlobalConfig::set(config);

    let error = DeviceError::build("native failure", 77);

    assert!(error.message().contains("Error code: [77]"));
    assert!(error.backtrace().is_some());

    let reported = std::fs::read_to_string(&log_file).unwrap();
    assert!(reported.contains("device error: native failure; Error code: [77]"));
    assert!(format!("{error:?}").contains("Backtrace:"));

    let _ = std::fs::remove_file(log_file);
}
