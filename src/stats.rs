//! Population tallies for display and reporting.
use serde_derive::{Deserialize, Serialize};

use crate::agent::{Agent, HealthState};

/// Mutually exclusive display buckets. Classification checks, in order: immune, dead, recovered,
/// infected (split on the incubation period), and finally vulnerability for the susceptible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthCategory {
    SusceptibleVulnerable,
    SusceptibleNonVulnerable,
    Asymptomatic,
    Symptomatic,
    Recovered,
    Dead,
    Immune,
}

impl HealthCategory {
    pub const ALL: [HealthCategory; 7] = [
        HealthCategory::SusceptibleVulnerable,
        HealthCategory::SusceptibleNonVulnerable,
        HealthCategory::Asymptomatic,
        HealthCategory::Symptomatic,
        HealthCategory::Recovered,
        HealthCategory::Dead,
        HealthCategory::Immune,
    ];

    #[must_use]
    pub fn classify(agent: &Agent, incubation_period: f64) -> HealthCategory {
        if agent.is_immune() {
            return HealthCategory::Immune;
        }
        match agent.health() {
            HealthState::Dead => HealthCategory::Dead,
            HealthState::Recovered => HealthCategory::Recovered,
            HealthState::Infected if agent.is_symptomatic(incubation_period) => {
                HealthCategory::Symptomatic
            }
            HealthState::Infected => HealthCategory::Asymptomatic,
            HealthState::Susceptible if agent.is_vulnerable() => {
                HealthCategory::SusceptibleVulnerable
            }
            HealthState::Susceptible => HealthCategory::SusceptibleNonVulnerable,
        }
    }
}

/// Counts per [`HealthCategory`] and the mean number of transmissions per agent that is or has
/// been infected. Flat so that it serializes to a single CSV row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub elapsed_days: f64,
    pub susceptible_vulnerable: usize,
    pub susceptible_non_vulnerable: usize,
    pub asymptomatic: usize,
    pub symptomatic: usize,
    pub recovered: usize,
    pub dead: usize,
    pub immune: usize,
    pub mean_transmissions: f64,
}

impl StatsSnapshot {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn collect(agents: &[Agent], incubation_period: f64, elapsed_days: f64) -> Self {
        let mut snapshot = StatsSnapshot {
            elapsed_days,
            ..StatsSnapshot::default()
        };
        let mut ever_infected = 0_usize;
        let mut transmissions = 0_u64;

        for agent in agents {
            *snapshot.count_mut(HealthCategory::classify(agent, incubation_period)) += 1;
            if agent.has_been_infected() {
                ever_infected += 1;
                transmissions += u64::from(agent.transmission_count());
            }
        }

        if ever_infected > 0 {
            snapshot.mean_transmissions = transmissions as f64 / ever_infected as f64;
        }
        snapshot
    }

    fn count_mut(&mut self, category: HealthCategory) -> &mut usize {
        match category {
            HealthCategory::SusceptibleVulnerable => &mut self.susceptible_vulnerable,
            HealthCategory::SusceptibleNonVulnerable => &mut self.susceptible_non_vulnerable,
            HealthCategory::Asymptomatic => &mut self.asymptomatic,
            HealthCategory::Symptomatic => &mut self.symptomatic,
            HealthCategory::Recovered => &mut self.recovered,
            HealthCategory::Dead => &mut self.dead,
            HealthCategory::Immune => &mut self.immune,
        }
    }

    #[must_use]
    pub fn count(&self, category: HealthCategory) -> usize {
        match category {
            HealthCategory::SusceptibleVulnerable => self.susceptible_vulnerable,
            HealthCategory::SusceptibleNonVulnerable => self.susceptible_non_vulnerable,
            HealthCategory::Asymptomatic => self.asymptomatic,
            HealthCategory::Symptomatic => self.symptomatic,
            HealthCategory::Recovered => self.recovered,
            HealthCategory::Dead => self.dead,
            HealthCategory::Immune => self.immune,
        }
    }

    /// Sum over all categories; equals the population.
    #[must_use]
    pub fn total(&self) -> usize {
        HealthCategory::ALL
            .iter()
            .map(|&category| self.count(category))
            .sum()
    }

    /// Agents currently counted as asymptomatic or symptomatic.
    #[must_use]
    pub fn infected(&self) -> usize {
        self.asymptomatic + self.symptomatic
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.infected() == 0
    }
}
