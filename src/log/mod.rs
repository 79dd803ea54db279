//! Run logging. This is not to be confused with _reporting_: reports record the model's tallies
//! for analysis, while log messages describe what a run is doing as it does it.
//!
//! The five `log` macros are re-exported: `error!`, `warn!`, `info!`, `debug!` and `trace!`.
//! The model emits `info!` for run start, progress and completion, `debug!` for each
//! timestep's tallies, and `trace!` for individual transitions and new infections.
//!
//! Logging is _disabled_ by default. It can be enabled with the command line option
//! `--log-level <level>` or from code:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with priority at least `level`
//!
//! Per-module filters are configured with `set_module_filter()` / `set_module_filters()` and
//! `remove_module_filter()`:
//!
//! ```rust
//! use tiered_resistance::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! set_log_level(LevelFilter::Info);
//! // Show every transition without the rest of the crate's trace output.
//! set_module_filter("tiered_resistance::person", LevelFilter::Trace);
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

#[cfg(all(feature = "logging", feature = "progress_bar"))]
mod progress_bar_encoder;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[cfg(feature = "logging")]
use log4rs::Handle;
use std::sync::LazyLock;
use std::sync::{Mutex, MutexGuard, PoisonError};

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;
// Default module specific filters
const DEFAULT_MODULE_FILTERS: [(&str, LevelFilter); 1] = [
    // Per-person transitions swamp everything else at `trace`.
    ("tiered_resistance::person", LevelFilter::Debug),
];

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A level filter applied to the messages of one module path (e.g.
/// `"tiered_resistance::model"`).
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    module: String,
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Tracks the filter levels of modules and holds a handle to the global logger.
///
/// Loggers are installed globally, so only the singleton behind the free functions below
/// should exist.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// The level filter for modules without an explicitly set filter. `LevelFilter::Off`
    /// disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        let module_configurations = DEFAULT_MODULE_FILTERS
            .map(|(module, level)| (module.to_string(), (module, level).into()));
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: HashMap::from(module_configurations),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    pub(in crate::log) fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                let module_config = entry.get_mut();
                if module_config.level == level {
                    return false;
                }
                module_config.level = level;
            }
            Entry::Vacant(entry) => {
                entry.insert((module, level).into());
            }
        }
        true
    }

    pub(in crate::log) fn set_module_filter(&mut self, module: &str, level: LevelFilter) {
        if self.insert_module_filter(module, level) {
            self.set_config();
        }
    }

    pub(in crate::log) fn set_module_filters(&mut self, module_filters: &[(&str, LevelFilter)]) {
        let mut mutated = false;
        for (module, level) in module_filters {
            mutated |= self.insert_module_filter(module, *level);
        }
        if mutated {
            self.set_config();
        }
    }

    pub(in crate::log) fn remove_module_filter(&mut self, module: &str) {
        if self.module_configurations.remove(module).is_some() {
            self.set_config();
        }
    }
}

/// Enables every log message. Equivalent to `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    get_log_configuration().set_log_level(level);
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    get_log_configuration().set_module_filter(module_path, level_filter);
}

/// Removes the filter for the given module path so the global level applies to it again.
pub fn remove_module_filter(module_path: &str) {
    get_log_configuration().remove_module_filter(module_path);
}

/// Sets the level filters for a set of modules at once.
pub fn set_module_filters(module_filters: &[(&str, LevelFilter)]) {
    get_log_configuration().set_module_filters(module_filters);
}

// A panic while holding the lock leaves the configuration itself consistent.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::{get_log_configuration, remove_module_filter, set_log_level, set_module_filters};
    use log::{error, trace, LevelFilter};
    use std::sync::{LazyLock, Mutex};

    // Force logging tests to run serially for consistent behavior.
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

    #[test]
    fn test_set_log_level() {
        let _guard = TEST_MUTEX.lock().unwrap();
        set_log_level(LevelFilter::Trace);
        set_log_level(LevelFilter::Error);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Error);
            error!("test_set_log_level: global set to error");
            trace!("test_set_log_level: NOT EMITTED");
        }
        set_log_level(LevelFilter::Trace);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Trace);
            assert_eq!(log::max_level(), LevelFilter::Trace);
        }
        set_log_level(LevelFilter::Off);
    }

    #[test]
    fn test_set_remove_module_filters() {
        let _guard = TEST_MUTEX.lock().unwrap();
        set_log_level(LevelFilter::Trace);
        {
            let config = get_log_configuration();
            assert_eq!(config.module_configurations.len(), 1);
            assert_eq!(
                config.module_configurations.get("tiered_resistance::person"),
                Some(&("tiered_resistance::person", LevelFilter::Debug).into())
            );
        }

        let filters = [
            ("tiered_resistance::person", LevelFilter::Error),
            ("tiered_resistance::model", LevelFilter::Info),
        ];
        set_module_filters(&filters);
        {
            let config = get_log_configuration();
            assert_eq!(config.module_configurations.len(), 2);
            for (module_path, level) in filters {
                assert_eq!(
                    config.module_configurations.get(module_path),
                    Some(&(module_path, level).into())
                );
            }
        }

        remove_module_filter("tiered_resistance::model");
        {
            let config = get_log_configuration();
            assert_eq!(config.module_configurations.len(), 1);
            assert!(!config
                .module_configurations
                .contains_key("tiered_resistance::model"));
        }
        set_module_filters(&[("tiered_resistance::person", LevelFilter::Debug)]);
        set_log_level(LevelFilter::Off);
    }
}
