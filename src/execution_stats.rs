// Loss of precision is allowable in this module's use cases.
#![allow(clippy::cast_precision_loss)]

use std::time::{Duration, Instant};

use humantime::format_duration;
use log::info;

/// Final statistics of a run. If no step was taken, the per step statistic is zero.
#[derive(Debug)]
pub struct ExecutionStatistics {
    pub wall_time: Duration,
    pub steps: u64,
    pub population: usize,
    pub simulated_days: f64,
    pub wall_time_per_step: Duration,
}

pub(crate) struct ExecutionProfilingCollector {
    /// Run start time, used to compute elapsed wall time
    start_time: Instant,
}

impl ExecutionProfilingCollector {
    pub fn new() -> ExecutionProfilingCollector {
        ExecutionProfilingCollector {
            start_time: Instant::now(),
        }
    }

    pub fn compute_final_statistics(
        &self,
        steps: u64,
        population: usize,
        simulated_days: f64,
    ) -> ExecutionStatistics {
        let wall_time = self.start_time.elapsed();
        let wall_time_per_step = if steps > 0 {
            Duration::from_secs_f64(wall_time.as_secs_f64() / steps as f64)
        } else {
            Duration::ZERO
        };
        ExecutionStatistics {
            wall_time,
            steps,
            population,
            simulated_days,
            wall_time_per_step,
        }
    }
}

/// Logs a human-readable summary at `info` level.
pub fn log_execution_statistics(stats: &ExecutionStatistics) {
    info!("Execution complete.");
    info!(
        "Simulated {:.2} days for {} agents in {} steps",
        stats.simulated_days, stats.population, stats.steps
    );
    info!("Wall time: {}", format_duration(truncate(stats.wall_time)));
    info!(
        "Wall time per step: {}",
        format_duration(truncate(stats.wall_time_per_step))
    );
}

/// Drops sub-microsecond noise so `humantime` output stays short.
fn truncate(duration: Duration) -> Duration {
    Duration::from_micros(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
}
