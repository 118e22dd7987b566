//! The simulation engine.
//!
//! A [`World`] owns the population, the spatial index over it and the random source, and
//! advances them together. Each call to [`World::step`] runs four phases in a fixed order, each
//! over the whole population as left by the previous phase:
//!
//! 1. mobilization: idle, mobile, living agents start a walk with a per-tick probability,
//! 2. movement: walking agents move toward their targets and the index follows them,
//! 3. health progression: infected agents age and may recover or die,
//! 4. transmission: every walking agent is checked against its grid neighbors.
//!
//! Only walking agents are checked for contact in phase 4. Two stationary agents never infect
//! each other until one of them starts a walk.
use log::{info, trace};

use crate::agent::{Agent, HealthState};
use crate::error::SimError;
use crate::parameters::Parameters;
use crate::point::Point;
use crate::random::{clamp_probability, RandomSource, SeededRandom};
use crate::spatial_index::SpatialIndex;
use crate::stats::StatsSnapshot;

/// Elapsed simulated time. Runs of equal deltas are kept as a count so that `n` steps of `dt`
/// read back as exactly `n * dt`.
#[derive(Debug, Clone, Default)]
struct Clock {
    origin: f64,
    delta: f64,
    ticks: u64,
}

impl Clock {
    #[allow(clippy::cast_precision_loss)]
    fn now(&self) -> f64 {
        self.origin + self.delta * self.ticks as f64
    }

    #[allow(clippy::float_cmp)]
    fn advance(&mut self, delta: f64) {
        if self.ticks > 0 && delta == self.delta {
            self.ticks += 1;
        } else {
            self.origin = self.now();
            self.delta = delta;
            self.ticks = 1;
        }
    }
}

pub struct World<R: RandomSource = SeededRandom> {
    parameters: Parameters,
    side_length: f64,
    agents: Vec<Agent>,
    index: SpatialIndex,
    random: R,
    clock: Clock,
    steps: u64,
    /// Reused across transmission checks.
    neighbor_buffer: Vec<usize>,
}

impl<R: RandomSource> World<R> {
    /// Creates a world with a randomly placed population: the susceptible agents first, then the
    /// seeded infected cohort. Each agent gets a uniform position in the domain and independent
    /// draws for its vulnerable, immune and mobile traits.
    ///
    /// # Errors
    ///
    /// Returns `SimError::IllegalParameter` if `parameters` fails validation.
    pub fn new(parameters: Parameters, mut random: R) -> Result<Self, SimError> {
        parameters.validate()?;
        let side_length = parameters.side_length();
        let susceptible = parameters.population - parameters.initial_infected;

        let mut agents = Vec::with_capacity(parameters.population);
        for i in 0..parameters.population {
            let position = Point::new(
                random.uniform_real(0.0, side_length),
                random.uniform_real(0.0, side_length),
            );
            agents.push(Agent::new(
                position,
                random.coin_flip(parameters.vulnerable_fraction),
                random.coin_flip(parameters.immunity_fraction),
                random.coin_flip(parameters.mobile_fraction),
                i >= susceptible,
            ));
        }

        info!(
            "created world: {} agents ({} infected) on a {:.2} x {:.2} domain",
            parameters.population, parameters.initial_infected, side_length, side_length
        );
        Ok(Self::assemble(parameters, agents, random))
    }

    /// Creates a world from an explicit population. `population` and `initial_infected` in
    /// `parameters` are replaced by the size of `agents` and its infected count.
    ///
    /// # Errors
    ///
    /// Returns `SimError::IllegalParameter` if the remaining parameters fail validation.
    pub fn from_agents(
        parameters: Parameters,
        agents: Vec<Agent>,
        random: R,
    ) -> Result<Self, SimError> {
        let parameters = Parameters {
            population: agents.len(),
            initial_infected: agents.iter().filter(|agent| agent.is_infected()).count(),
            ..parameters
        };
        parameters.validate()?;
        info!(
            "created world from {} given agents ({} infected)",
            parameters.population, parameters.initial_infected
        );
        Ok(Self::assemble(parameters, agents, random))
    }

    fn assemble(parameters: Parameters, agents: Vec<Agent>, random: R) -> Self {
        let side_length = parameters.side_length();
        let index = SpatialIndex::build(&agents, side_length, parameters.neighborhood);
        World {
            parameters,
            side_length,
            agents,
            index,
            random,
            clock: Clock::default(),
            steps: 0,
            neighbor_buffer: Vec::new(),
        }
    }

    /// Advances the world by `time_delta` seconds.
    ///
    /// # Errors
    ///
    /// Returns `SimError::IllegalParameter` if `time_delta` is negative or not finite. The world
    /// is left untouched in that case.
    pub fn step(&mut self, time_delta: f64) -> Result<(), SimError> {
        if !(time_delta.is_finite() && time_delta >= 0.0) {
            return Err(SimError::IllegalParameter(format!(
                "time delta must be a finite, non-negative number of seconds (got {time_delta})"
            )));
        }

        let started = self.mobilize(time_delta);
        let relocated = self.move_agents(time_delta);
        self.progress_health(time_delta);
        let infections = self.transmit();
        self.clock.advance(time_delta);
        self.steps += 1;

        trace!(
            "step {} (t={}): {} walks started, {} agents changed cell, {} new infections",
            self.steps,
            self.clock.now(),
            started,
            relocated,
            infections
        );
        Ok(())
    }

    /// Phase 1. Returns the number of walks started.
    fn mobilize(&mut self, time_delta: f64) -> usize {
        let probability = clamp_probability(
            self.parameters.walks_per_day * time_delta / self.parameters.seconds_per_day,
        );
        let mut started = 0;
        for agent in &mut self.agents {
            if agent.can_start_walk() && self.random.coin_flip(probability) {
                let target = self
                    .random
                    .random_point_on_disc(agent.position(), self.parameters.walk_distance);
                agent.start_walk(target);
                started += 1;
            }
        }
        started
    }

    /// Phase 2. Returns the number of agents that changed cell.
    fn move_agents(&mut self, time_delta: f64) -> usize {
        let step_length = self.parameters.walk_speed * time_delta;
        let mut relocated = 0;
        for (agent_id, agent) in self.agents.iter_mut().enumerate() {
            if !agent.is_walking() {
                continue;
            }
            agent.advance(step_length, self.parameters.walk_epsilon);
            if self
                .index
                .relocate(agent_id, agent.domain_position(self.side_length))
            {
                relocated += 1;
            }
        }
        relocated
    }

    /// Phase 3.
    fn progress_health(&mut self, time_delta: f64) {
        for (agent_id, agent) in self.agents.iter_mut().enumerate() {
            if let Some(state) = agent.progress(time_delta, &self.parameters, &mut self.random) {
                match state {
                    HealthState::Recovered => trace!("agent {agent_id} recovered"),
                    HealthState::Dead => trace!("agent {agent_id} died"),
                    _ => {}
                }
            }
        }
    }

    /// Phase 4. An infected walker infects every susceptible neighbor in range. A susceptible
    /// walker is infected by the first infected neighbor in range, who is credited with the
    /// transmission. Returns the number of new infections.
    fn transmit(&mut self) -> usize {
        let range_squared = self.parameters.infection_distance * self.parameters.infection_distance;
        let mut neighbors = std::mem::take(&mut self.neighbor_buffer);
        let mut infections = 0;

        for agent_id in 0..self.agents.len() {
            let agent = &self.agents[agent_id];
            if !agent.is_walking() {
                continue;
            }
            let position = agent.domain_position(self.side_length);
            neighbors.clear();
            neighbors.extend(
                self.index
                    .neighbors_of(agent_id)
                    .filter(|&other| other != agent_id),
            );

            if agent.is_infected() {
                for &other in &neighbors {
                    let target = &mut self.agents[other];
                    if target.is_susceptible()
                        && target
                            .domain_position(self.side_length)
                            .distance_squared(position)
                            < range_squared
                        && target.infect()
                    {
                        trace!("agent {agent_id} infected agent {other}");
                        self.agents[agent_id].record_transmission();
                        infections += 1;
                    }
                }
            } else if agent.is_susceptible() {
                let source = neighbors.iter().copied().find(|&other| {
                    let candidate = &self.agents[other];
                    candidate.is_infected()
                        && candidate
                            .domain_position(self.side_length)
                            .distance_squared(position)
                            < range_squared
                });
                if let Some(source) = source {
                    trace!("agent {source} infected agent {agent_id}");
                    self.agents[agent_id].infect();
                    self.agents[source].record_transmission();
                    infections += 1;
                }
            }
        }

        self.neighbor_buffer = neighbors;
        infections
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn agent(&self, agent_id: usize) -> Option<&Agent> {
        self.agents.get(agent_id)
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn side_length(&self) -> f64 {
        self.side_length
    }

    /// Positions folded into `[0, side_length)`, in agent id order.
    pub fn agent_positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.agents
            .iter()
            .map(|agent| agent.domain_position(self.side_length))
    }

    #[must_use]
    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    #[must_use]
    pub fn random(&self) -> &R {
        &self.random
    }

    /// Simulated seconds since creation.
    #[must_use]
    pub fn elapsed_time(&self) -> f64 {
        self.clock.now()
    }

    #[must_use]
    pub fn elapsed_days(&self) -> f64 {
        self.clock.now() / self.parameters.seconds_per_day
    }

    /// Number of completed calls to [`World::step`].
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot::collect(
            &self.agents,
            self.parameters.incubation_period,
            self.elapsed_days(),
        )
    }

    /// True once no agent is counted as asymptomatic or symptomatic.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.snapshot().is_done()
    }
}
