//! Diagnostic logging for the engine: world construction, per-step phase summaries, infections,
//! recoveries and deaths. Epidemic statistics are not logged here; they go through
//! [`crate::report`].
//!
//! The usual `log` macros are re-exported, so callers only need this module:
//!
//! ```rust
//! use covidsim::log::{info, set_log_level, set_module_filter, LevelFilter};
//!
//! // Summaries from everywhere, plus every transmission event from the world.
//! set_log_level(LevelFilter::Info);
//! set_module_filter("covidsim::world", LevelFilter::Trace);
//! info!("configured logging");
//! ```
//!
//! Nothing is logged until a level is set. The binary sets one from `--log-level`, and per-module
//! overrides from `--module-filter`. Building without the `logging` feature keeps the API but
//! installs no logger.
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

use std::collections::BTreeMap;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

pub use log::{debug, error, info, trace, warn, LevelFilter};
#[cfg(feature = "logging")]
use log4rs::Handle;

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// The installed logging state: one global level and any number of per-module overrides, keyed
/// by module path (e.g. `"covidsim::world"`).
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// Applies to every module without an override. `Off` silences everything.
    pub(in crate::log) global_log_level: LevelFilter,
    /// Ordered so the generated logger list is stable between reconfigurations.
    pub(in crate::log) module_filters: BTreeMap<String, LevelFilter>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: LevelFilter::Off,
            module_filters: BTreeMap::new(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Applies every `(module, level)` pair and reinstalls the logger if anything changed.
    fn set_module_filters<'a>(
        &mut self,
        module_filters: impl IntoIterator<Item = (&'a str, LevelFilter)>,
    ) {
        let mut changed = false;
        for (module, level) in module_filters {
            changed |= self.module_filters.insert(module.to_string(), level) != Some(level);
        }
        if changed {
            self.set_config();
        }
    }

    fn remove_module_filter(&mut self, module: &str) {
        if self.module_filters.remove(module).is_some() {
            self.set_config();
        }
    }
}

/// Logs everything. Same as `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Same as `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the level for modules without an override.
pub fn set_log_level(level: LevelFilter) {
    log_configuration().set_log_level(level);
}

/// Overrides the level for one module path and everything below it.
pub fn set_module_filter(module_path: &str, level: LevelFilter) {
    log_configuration().set_module_filters([(module_path, level)]);
}

/// Sets several overrides at once, reinstalling the logger at most once.
pub fn set_module_filters(module_filters: &[(&str, LevelFilter)]) {
    log_configuration().set_module_filters(module_filters.iter().copied());
}

/// Drops the override for `module_path`; the global level applies to it again.
pub fn remove_module_filter(module_path: &str) {
    log_configuration().remove_module_filter(module_path);
}

fn log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The configuration is global, so tests that touch it take turns.
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

    #[test]
    fn global_level_round_trips() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Warn);
        assert_eq!(log_configuration().global_log_level, LevelFilter::Warn);
        warn!("global level is warn");
        debug!("not emitted");

        enable_logging();
        assert_eq!(log_configuration().global_log_level, LevelFilter::Trace);
        disable_logging();
        assert_eq!(log_configuration().global_log_level, LevelFilter::Off);
    }

    #[test]
    fn module_filters_are_set_and_removed() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Info);
        set_module_filters(&[
            ("covidsim::spatial_index", LevelFilter::Error),
            ("covidsim::world", LevelFilter::Debug),
        ]);
        set_module_filter("covidsim::world", LevelFilter::Trace);
        {
            let config = log_configuration();
            assert_eq!(
                config.module_filters.get("covidsim::spatial_index"),
                Some(&LevelFilter::Error)
            );
            assert_eq!(
                config.module_filters.get("covidsim::world"),
                Some(&LevelFilter::Trace)
            );
        }

        remove_module_filter("covidsim::spatial_index");
        remove_module_filter("covidsim::not_a_module");
        {
            let config = log_configuration();
            assert!(!config.module_filters.contains_key("covidsim::spatial_index"));
            assert_eq!(config.module_filters.len(), 1);
        }

        remove_module_filter("covidsim::world");
        disable_logging();
    }
}
