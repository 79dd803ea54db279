use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::runtime::ConfigBuilder;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

#[cfg(feature = "progress_bar")]
use super::progress_bar_encoder::PBWrapperEncoder;
use crate::log::{LogConfiguration, ModuleLogConfiguration};

// ISO 8601 timestamp, color coded level tag, then the emitting module
const DEFAULT_LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

impl From<&ModuleLogConfiguration> for Logger {
    fn from(module_config: &ModuleLogConfiguration) -> Self {
        Logger::builder().build(module_config.module.clone(), module_config.level)
    }
}

impl LogConfiguration {
    /// Sets the global logger to conform to this [`LogConfiguration`].
    pub(in crate::log) fn set_config(&mut self) {
        let encoder = Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN));
        #[cfg(feature = "progress_bar")]
        let encoder = Box::new(PBWrapperEncoder::new(encoder));
        // Logs go to stderr so the final state printed on stdout stays machine readable.
        let stderr = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(encoder)
            .build();
        let mut config: ConfigBuilder =
            Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));

        for module_config in self.module_configurations.values() {
            config = config.logger(module_config.into());
        }

        // The `Root` determines the global log level
        let root = Root::builder()
            .appender("stderr")
            .build(self.global_log_level);
        let new_config = match config.build(root) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to build log configuration: {e}");
                return;
            }
        };

        match self.root_handle {
            Some(ref mut handle) => handle.set_config(new_config),
            None => match log4rs::init_config(new_config) {
                Ok(handle) => self.root_handle = Some(handle),
                Err(e) => eprintln!("failed to install logger: {e}"),
            },
        }
    }
}
