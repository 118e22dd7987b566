use std::path::{Path, PathBuf};

use clap::{Args, Command, FromArgMatches as _};
use log::{info, LevelFilter};

use crate::error::SimError;
use crate::execution_stats::{log_execution_statistics, ExecutionProfilingCollector};
use crate::log::{set_log_level, set_module_filters};
use crate::parameters::{load_parameters, Parameters};
use crate::random::SeededRandom;
use crate::report::ReportWriter;
use crate::world::World;

/// Name of the statistics report written to `--output-dir`.
pub const STATS_REPORT_NAME: &str = "stats.csv";

/// Default cli arguments for the covidsim runner
#[derive(Args, Debug, Clone)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path for a JSON parameters file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional directory for the statistics report
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Enable logging at the given level (error, warn, info, debug, trace)
    #[arg(short, long, value_parser = parse_level_filter)]
    pub log_level: Option<LevelFilter>,

    /// Per-module log level as MODULE=LEVEL, e.g. covidsim::world=trace (repeatable)
    #[arg(long, value_parser = parse_module_filter)]
    pub module_filter: Vec<(String, LevelFilter)>,

    /// Simulated seconds per step
    #[arg(short, long, default_value = "3600")]
    pub time_step: f64,

    /// Stop after this many simulated days even if the epidemic is still running
    #[arg(short, long, default_value = "365")]
    pub max_days: f64,

    /// Simulated days between report rows
    #[arg(long, default_value = "1")]
    pub report_period: f64,
}

impl Default for BaseArgs {
    fn default() -> Self {
        BaseArgs {
            random_seed: 0,
            config: String::new(),
            output_dir: String::new(),
            log_level: None,
            module_filter: Vec::new(),
            time_step: 3600.0,
            max_days: 365.0,
            report_period: 1.0,
        }
    }
}

fn parse_level_filter(level: &str) -> Result<LevelFilter, String> {
    level
        .parse()
        .map_err(|_| format!("unknown log level `{level}`"))
}

fn parse_module_filter(filter: &str) -> Result<(String, LevelFilter), String> {
    let (module, level) = filter
        .split_once('=')
        .ok_or_else(|| format!("expected MODULE=LEVEL, got `{filter}`"))?;
    if module.is_empty() {
        return Err(format!("missing module path in `{filter}`"));
    }
    Ok((module.to_string(), parse_level_filter(level)?))
}

/// The first multiple of `period` strictly after `elapsed_days`. When `period` is too small to
/// move past `elapsed_days` in floating point, every following step is reported.
fn next_report_day_after(elapsed_days: f64, period: f64) -> f64 {
    ((elapsed_days / period).floor() + 1.0) * period
}

fn create_covidsim_cli() -> Command {
    let cli = Command::new("covidsim");
    BaseArgs::augment_args(cli)
}

/// Runs a simulation configured from the command line.
///
/// # Errors
/// Returns an error if argument parsing, parameter loading or the run itself fails
pub fn run_with_args() -> Result<World, Box<dyn std::error::Error>> {
    let matches = create_covidsim_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run(&args)?)
}

fn positive_arg(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::IllegalParameter(format!(
            "--{name} must be a finite, positive number (got {value})"
        )))
    }
}

/// Builds a world from `args` and steps it until no one is infected or `max_days` have been
/// simulated. With an output directory, a statistics row is written at the start, every
/// `report_period` days, and at the end.
///
/// # Errors
/// Returns an error if the arguments or parameters are invalid or the report cannot be written
pub fn run(args: &BaseArgs) -> Result<World, SimError> {
    if let Some(level) = args.log_level {
        set_log_level(level);
    }
    if !args.module_filter.is_empty() {
        let filters: Vec<(&str, LevelFilter)> = args
            .module_filter
            .iter()
            .map(|(module, level)| (module.as_str(), *level))
            .collect();
        set_module_filters(&filters);
    }
    positive_arg("time-step", args.time_step)?;
    positive_arg("report-period", args.report_period)?;
    if !(args.max_days >= 0.0) {
        return Err(SimError::IllegalParameter(format!(
            "--max-days must be non-negative (got {})",
            args.max_days
        )));
    }

    let parameters = if args.config.is_empty() {
        Parameters::default()
    } else {
        info!("Loading parameters from: {}", args.config);
        load_parameters(Path::new(&args.config))?
    };

    let mut report = if args.output_dir.is_empty() {
        None
    } else {
        let path = PathBuf::from(&args.output_dir).join(STATS_REPORT_NAME);
        Some(ReportWriter::create(&path)?)
    };

    let mut world = World::new(parameters, SeededRandom::new(args.random_seed))?;
    let collector = ExecutionProfilingCollector::new();

    if let Some(report) = report.as_mut() {
        report.send(&world.snapshot())?;
    }
    let mut next_report_day = args.report_period;
    let mut reported_last_step = true;

    while !world.is_done() && world.elapsed_days() < args.max_days {
        world.step(args.time_step)?;
        reported_last_step = false;
        if world.elapsed_days() >= next_report_day {
            if let Some(report) = report.as_mut() {
                report.send(&world.snapshot())?;
            }
            reported_last_step = true;
            next_report_day = next_report_day_after(world.elapsed_days(), args.report_period);
        }
    }
    if !reported_last_step {
        if let Some(report) = report.as_mut() {
            report.send(&world.snapshot())?;
        }
    }

    let stats = collector.compute_final_statistics(
        world.steps(),
        world.population(),
        world.elapsed_days(),
    );
    log_execution_statistics(&stats);
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsSnapshot;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn quick_args() -> BaseArgs {
        BaseArgs {
            max_days: 30.0,
            ..BaseArgs::default()
        }
    }

    fn small_config() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let json = r#"{
            "population": 200,
            "initial_infected": 4,
            "incubation_period": 2,
            "symptomatic_period": 3
        }"#;
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_run_with_defaults() {
        let world = run(&quick_args()).unwrap();
        assert_eq!(world.population(), Parameters::default().population);
        assert!(world.is_done() || world.elapsed_days() >= 30.0);
    }

    #[test]
    fn test_run_with_random_seed() {
        let config = small_config();
        let args = BaseArgs {
            random_seed: 42,
            config: config.path().to_str().unwrap().to_string(),
            ..quick_args()
        };
        let first = run(&args).unwrap();
        let second = run(&args).unwrap();
        assert_eq!(first.agents(), second.agents());
    }

    #[test]
    fn test_run_with_config_path() {
        let config = small_config();
        let args = BaseArgs {
            config: config.path().to_str().unwrap().to_string(),
            ..quick_args()
        };
        let world = run(&args).unwrap();
        assert_eq!(world.population(), 200);
        // Incubation plus symptomatic is 5 days, so the seeded cohort has resolved.
        assert!(world.agents()[196..].iter().all(|agent| !agent.is_infected()));
    }

    #[test]
    fn test_run_with_output_dir() {
        let config = small_config();
        let output_dir = tempdir().unwrap();
        let args = BaseArgs {
            config: config.path().to_str().unwrap().to_string(),
            output_dir: output_dir.path().to_str().unwrap().to_string(),
            ..quick_args()
        };
        let world = run(&args).unwrap();

        let report_path = output_dir.path().join(STATS_REPORT_NAME);
        let mut reader = csv::Reader::from_path(report_path).unwrap();
        let rows: Vec<StatsSnapshot> = reader.deserialize().map(Result::unwrap).collect();
        assert!(rows.len() >= 2);
        assert_eq!(rows[0].elapsed_days, 0.0);
        assert_eq!(rows.last().unwrap(), &world.snapshot());
        for row in &rows {
            assert_eq!(row.total(), 200);
        }
        for pair in rows.windows(2) {
            assert!(pair[0].elapsed_days < pair[1].elapsed_days);
        }
    }

    #[test]
    fn test_next_report_day_after() {
        assert_eq!(next_report_day_after(0.0, 1.0), 1.0);
        assert_eq!(next_report_day_after(1.0, 1.0), 2.0);
        assert_eq!(next_report_day_after(2.5, 1.0), 3.0);
        assert_eq!(next_report_day_after(0.5, 0.25), 0.75);
    }

    #[test]
    fn test_run_with_tiny_report_period() {
        let output_dir = tempdir().unwrap();
        let args = BaseArgs {
            output_dir: output_dir.path().to_str().unwrap().to_string(),
            report_period: 1e-18,
            max_days: 0.25,
            ..BaseArgs::default()
        };
        let world = run(&args).unwrap();
        assert_eq!(world.steps(), 6);

        let report_path = output_dir.path().join(STATS_REPORT_NAME);
        let mut reader = csv::Reader::from_path(report_path).unwrap();
        let rows: Vec<StatsSnapshot> = reader.deserialize().map(Result::unwrap).collect();
        // The initial row plus one per step
        assert_eq!(rows.len(), 7);
    }

    #[test]
    fn test_parse_level_filter() {
        assert_eq!(parse_level_filter("debug"), Ok(LevelFilter::Debug));
        assert_eq!(parse_level_filter("OFF"), Ok(LevelFilter::Off));
        assert!(parse_level_filter("loud").is_err());
    }

    #[test]
    fn test_parse_module_filter() {
        assert_eq!(
            parse_module_filter("covidsim::world=trace"),
            Ok(("covidsim::world".to_string(), LevelFilter::Trace))
        );
        assert!(parse_module_filter("covidsim::world").is_err());
        assert!(parse_module_filter("=debug").is_err());
        assert!(parse_module_filter("covidsim::world=chatty").is_err());
    }

    #[test]
    fn test_run_rejects_bad_arguments() {
        let args = BaseArgs {
            time_step: 0.0,
            ..quick_args()
        };
        assert!(matches!(run(&args), Err(SimError::IllegalParameter(_))));

        let args = BaseArgs {
            config: "/nonexistent/covidsim.json".to_string(),
            ..quick_args()
        };
        assert!(matches!(run(&args), Err(SimError::IoError(_))));
    }
}
