use super::{
    diagnostics::{DiagnosticsConfig, DiagnosticsLogLevel},
    launch::{LaunchConfig, LaunchLogLevel},
    scheduler::{CubeOrder, SchedulerConfig},
};
use std::sync::Arc;

/// Static mutex holding the global configuration, initialized as `None`.
static REDCUBE_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Represents the global configuration for redcube, combining diagnostics, launch logging and
/// scheduling settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Configuration for device error reporting.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    /// Configuration for kernel launch logging.
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Configuration for the cube scheduler.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `redcube.toml` or `RedCube.toml` in the
    /// current directory or its parents. If no file is found, a default configuration is used.
    ///
    /// # Notes
    ///
    /// Calling this function takes a global lock. Values read on hot paths should be cached in a
    /// local static atomic populated from the global config on first use.
    pub fn get() -> Arc<Self> {
        let mut state = REDCUBE_GLOBAL_CONFIG.lock();

        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                let config = Arc::new(Self::from_current_dir().override_from_env());
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`.
    pub fn set(config: Self) {
        let mut state = REDCUBE_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("REDCUBE_DEBUG_LOG") {
            self.launch.logger.level = LaunchLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.launch.logger.stdout = true;
                }
                "stderr" => {
                    self.launch.logger.stderr = true;
                }
                "1" | "true" => {
                    self.launch.logger.file = Some("/tmp/redcube.log".into());
                }
                "0" | "false" => {
                    self.launch.logger.level = LaunchLogLevel::Disabled;
                }
                file_path => {
                    self.launch.logger.file = Some(file_path.into());
                }
            }
        }

        if let Ok(val) = std::env::var("REDCUBE_BACKTRACE") {
            match val.as_str() {
                "0" | "false" => {
                    self.diagnostics.logger.level = DiagnosticsLogLevel::Disabled;
                }
                "errors" => {
                    self.diagnostics.logger.level = DiagnosticsLogLevel::Errors;
                }
                _ => {
                    self.diagnostics.logger.level = DiagnosticsLogLevel::Backtrace;
                }
            }
        }

        if let Ok(val) = std::env::var("REDCUBE_CUBE_ORDER") {
            match CubeOrder::parse(&val) {
                Some(order) => self.scheduler.cube_order = order,
                None => log::warn!("Ignoring unknown cube order {val:?}"),
            }
        }

        self
    }

    /// Parses a configuration from its toml representation.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    // Loads configuration from `redcube.toml` or `RedCube.toml` in the current directory or its parents.
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            for name in ["redcube.toml", "RedCube.toml"] {
                if let Ok(config) = Self::from_file_path(dir.join(name)) {
                    return config;
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    fn from_file_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match Self::from_toml(&content) {
            Ok(val) => Ok(val),
            Err(err) => panic!("The file provided doesn't have the right format => {err:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_toml() {
        let config = GlobalConfig::from_toml(
            r#"
            [diagnostics.logger]
            level = "backtrace"

            [scheduler]
            workers = 2
            cube_order = "reversed"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.diagnostics.logger.level,
            DiagnosticsLogLevel::Backtrace
        );
        assert!(!config.diagnostics.logger.stderr);
        assert_eq!(config.scheduler.workers, Some(2));
        assert_eq!(config.scheduler.cube_order, CubeOrder::Reversed);
        assert_eq!(config.launch.logger.level, LaunchLogLevel::Disabled);
    }

    #[test]
    fn default_diagnostics_go_to_stderr() {
        let config = GlobalConfig::default();

        assert!(config.diagnostics.logger.stderr);
        assert_eq!(
            config.diagnostics.logger.level,
            DiagnosticsLogLevel::Disabled
        );
    }

    #[test]
    fn shuffled_order_from_toml() {
        let config = GlobalConfig::from_toml(
            r#"
            [scheduler.cube_order.shuffled]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.scheduler.cube_order, CubeOrder::Shuffled { seed: 7 });
    }

    #[test]
    #[serial_test::serial]
    fn cube_order_from_env() {
        std::env::set_var("REDCUBE_CUBE_ORDER", "shuffled:42");
        let config = GlobalConfig::default().override_from_env();
        std::env::set_var("REDCUBE_CUBE_ORDER", "diagonal");
        let unknown = GlobalConfig::default().override_from_env();
        std::env::remove_var("REDCUBE_CUBE_ORDER");

        assert_eq!(config.scheduler.cube_order, CubeOrder::Shuffled { seed: 42 });
        assert_eq!(unknown.scheduler.cube_order, CubeOrder::Sequential);
    }
}
