//! Stand-in used when the `logging` feature is off: no logger is installed, but the level is still
//! forwarded so the `log` macros short-circuit.

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
