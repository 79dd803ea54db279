//! Stands in for the console logger when the `logging` feature is off. Nothing is written
//! anywhere, but the level functions keep working.

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Sets the global logger to conform to this `LogConfiguration`.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
