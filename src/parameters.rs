//! Simulation parameters and their validation.
//!
//! Parameters are usually read from a JSON file. Every field has a default, so a file only needs
//! to name the values it overrides:
//!
//! ```json
//! {
//!     "population": 500,
//!     "initial_infected": 5,
//!     "immunity_fraction": 0.1
//! }
//! ```
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde_derive::{Deserialize, Serialize};

use crate::error::SimError;
use crate::spatial_index::Neighborhood;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Number of agents. Fixed for the lifetime of a world.
    pub population: usize,
    /// Expected number of walks an idle, mobile agent starts per day.
    pub walks_per_day: f64,
    /// Distance from the starting point to each walk target.
    pub walk_distance: f64,
    /// Contacts closer than this distance transmit.
    pub infection_distance: f64,
    /// Area of the domain per agent; the domain is a square of `population * area_per_agent`.
    pub area_per_agent: f64,
    /// Size of the infected cohort seeded at creation.
    pub initial_infected: usize,
    /// Probability of death over the symptomatic period for vulnerable agents.
    pub vulnerable_death_rate: f64,
    /// Probability of death over the symptomatic period for everyone else.
    pub non_vulnerable_death_rate: f64,
    pub vulnerable_fraction: f64,
    /// Days from infection to symptoms.
    pub incubation_period: f64,
    /// Days from symptom onset to recovery.
    pub symptomatic_period: f64,
    pub immunity_fraction: f64,
    pub mobile_fraction: f64,
    /// Walking speed in distance units per second.
    pub walk_speed: f64,
    pub seconds_per_day: f64,
    /// A walk ends once the remaining distance to the target is at most this.
    pub walk_epsilon: f64,
    pub neighborhood: Neighborhood,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            population: 1000,
            walks_per_day: 2.0,
            walk_distance: 20.0,
            infection_distance: 2.0,
            area_per_agent: 100.0,
            initial_infected: 10,
            vulnerable_death_rate: 0.15,
            non_vulnerable_death_rate: 0.01,
            vulnerable_fraction: 0.2,
            incubation_period: 5.0,
            symptomatic_period: 10.0,
            immunity_fraction: 0.0,
            mobile_fraction: 1.0,
            walk_speed: 0.005,
            seconds_per_day: 86_400.0,
            walk_epsilon: 0.01,
            neighborhood: Neighborhood::Linear,
        }
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::IllegalParameter(format!(
            "{name} must be a finite, non-negative number (got {value})"
        )))
    }
}

fn positive(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::IllegalParameter(format!(
            "{name} must be a finite, positive number (got {value})"
        )))
    }
}

fn probability(name: &str, value: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::IllegalParameter(format!(
            "{name} must be in [0, 1] (got {value})"
        )))
    }
}

impl Parameters {
    /// Checks every documented constraint.
    ///
    /// # Errors
    ///
    /// Returns `SimError::IllegalParameter` naming the first violated constraint.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.initial_infected > self.population {
            return Err(SimError::IllegalParameter(format!(
                "initial_infected ({}) must not exceed population ({})",
                self.initial_infected, self.population
            )));
        }

        non_negative("walks_per_day", self.walks_per_day)?;
        non_negative("walk_distance", self.walk_distance)?;
        non_negative("infection_distance", self.infection_distance)?;
        positive("area_per_agent", self.area_per_agent)?;
        non_negative("incubation_period", self.incubation_period)?;
        non_negative("symptomatic_period", self.symptomatic_period)?;
        non_negative("walk_speed", self.walk_speed)?;
        positive("seconds_per_day", self.seconds_per_day)?;
        non_negative("walk_epsilon", self.walk_epsilon)?;

        probability("vulnerable_death_rate", self.vulnerable_death_rate)?;
        probability("non_vulnerable_death_rate", self.non_vulnerable_death_rate)?;
        probability("vulnerable_fraction", self.vulnerable_fraction)?;
        probability("immunity_fraction", self.immunity_fraction)?;
        probability("mobile_fraction", self.mobile_fraction)?;
        Ok(())
    }

    /// Side length of the square domain.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn side_length(&self) -> f64 {
        (self.population as f64 * self.area_per_agent).sqrt()
    }

    #[must_use]
    pub fn death_rate(&self, vulnerable: bool) -> f64 {
        if vulnerable {
            self.vulnerable_death_rate
        } else {
            self.non_vulnerable_death_rate
        }
    }
}

/// Reads parameters from a JSON file and validates them.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON for [`Parameters`], or holds
/// values that fail [`Parameters::validate`].
pub fn load_parameters(path: &Path) -> Result<Parameters, SimError> {
    debug!("loading parameters from {}", path.display());
    let file = File::open(path)?;
    let parameters: Parameters = serde_json::from_reader(BufReader::new(file))?;
    parameters.validate()?;
    Ok(parameters)
}
