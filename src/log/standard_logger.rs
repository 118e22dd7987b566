use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use crate::log::LogConfiguration;

const APPENDER_NAME: &str = "stderr";

// ISO 8601 timestamp, highlighted level, module path
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

impl LogConfiguration {
    fn build_config(&self) -> Result<Config, log4rs::config::runtime::ConfigErrors> {
        let stderr = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();

        Config::builder()
            .appender(Appender::builder().build(APPENDER_NAME, Box::new(stderr)))
            .loggers(
                self.module_filters
                    .iter()
                    .map(|(module, &level)| Logger::builder().build(module.clone(), level)),
            )
            .build(
                Root::builder()
                    .appender(APPENDER_NAME)
                    .build(self.global_log_level),
            )
    }

    /// Installs a log4rs logger matching this configuration, or swaps the configuration of the
    /// one already installed.
    pub(in crate::log) fn set_config(&mut self) {
        let config = match self.build_config() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to build log config: {e}");
                return;
            }
        };

        if let Some(handle) = &self.root_handle {
            handle.set_config(config);
            return;
        }
        match log4rs::init_config(config) {
            Ok(handle) => self.root_handle = Some(handle),
            // Some other logger owns the global slot.
            Err(e) => {
                eprintln!("failed to install logger: {e}");
                log::set_max_level(self.global_log_level);
            }
        }
    }
}
