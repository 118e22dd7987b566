//! A single simulated person and its movement and disease state machines.
//!
//! Movement: an agent is either idle or walking toward a target. The world starts walks; a walk
//! ends on its own once the agent is within `walk_epsilon` of the target.
//!
//! Disease: `Susceptible -> Infected -> {Recovered, Dead}`. Recovered and dead agents never
//! become infected again, and an immune agent can never be infected by contact.
use serde_derive::{Deserialize, Serialize};

use crate::parameters::Parameters;
use crate::point::Point;
use crate::random::{clamp_probability, RandomSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthState {
    Susceptible,
    Infected,
    Recovered,
    Dead,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Unbounded position. Drift accumulates across walks; see [`Agent::domain_position`].
    position: Point,
    vulnerable: bool,
    immune: bool,
    mobile: bool,
    health: HealthState,
    /// Days since infection. Frozen once the agent recovers or dies.
    infection_age: f64,
    walking: bool,
    walk_target: Point,
    transmission_count: u32,
}

impl Agent {
    /// Creates an idle agent. Seeded infections bypass the immunity check.
    #[must_use]
    pub fn new(
        position: Point,
        vulnerable: bool,
        immune: bool,
        mobile: bool,
        infected: bool,
    ) -> Self {
        Agent {
            position,
            vulnerable,
            immune,
            mobile,
            health: if infected {
                HealthState::Infected
            } else {
                HealthState::Susceptible
            },
            infection_age: 0.0,
            walking: false,
            walk_target: position,
            transmission_count: 0,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// The position folded into the domain, used for indexing, distance tests and display.
    #[must_use]
    pub fn domain_position(&self, side_length: f64) -> Point {
        self.position.fold(side_length)
    }

    #[must_use]
    pub fn is_vulnerable(&self) -> bool {
        self.vulnerable
    }

    #[must_use]
    pub fn is_immune(&self) -> bool {
        self.immune
    }

    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.mobile
    }

    #[must_use]
    pub fn health(&self) -> HealthState {
        self.health
    }

    #[must_use]
    pub fn infection_age(&self) -> f64 {
        self.infection_age
    }

    #[must_use]
    pub fn is_walking(&self) -> bool {
        self.walking
    }

    #[must_use]
    pub fn walk_target(&self) -> Point {
        self.walk_target
    }

    #[must_use]
    pub fn transmission_count(&self) -> u32 {
        self.transmission_count
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        self.health == HealthState::Infected
    }

    /// True for agents that are infected now or were at some point.
    #[must_use]
    pub fn has_been_infected(&self) -> bool {
        self.health != HealthState::Susceptible
    }

    /// True when contact with an infectious agent would infect this one.
    #[must_use]
    pub fn is_susceptible(&self) -> bool {
        self.health == HealthState::Susceptible && !self.immune
    }

    /// Infected and past the incubation period.
    #[must_use]
    pub fn is_symptomatic(&self, incubation_period: f64) -> bool {
        self.is_infected() && self.infection_age > incubation_period
    }

    /// Idle, mobile and alive.
    #[must_use]
    pub fn can_start_walk(&self) -> bool {
        self.mobile && !self.walking && self.health != HealthState::Dead
    }

    pub(crate) fn start_walk(&mut self, target: Point) {
        self.walking = true;
        self.walk_target = target;
    }

    /// Moves toward the walk target by at most `step_length`, never overshooting on either axis.
    /// A walk that is already within `epsilon` of its target ends without moving.
    pub(crate) fn advance(&mut self, step_length: f64, epsilon: f64) {
        if !self.walking {
            return;
        }
        let dx = self.walk_target.x - self.position.x;
        let dy = self.walk_target.y - self.position.y;
        let remaining = dx.hypot(dy);
        if remaining <= epsilon {
            self.walking = false;
            return;
        }

        let mut step_x = dx / remaining * step_length;
        let mut step_y = dy / remaining * step_length;
        if step_x.abs() > dx.abs() {
            step_x = dx;
        }
        if step_y.abs() > dy.abs() {
            step_y = dy;
        }
        self.position.x += step_x;
        self.position.y += step_y;
    }

    /// Transitions a susceptible, non-immune agent to infected. Returns whether it happened.
    pub(crate) fn infect(&mut self) -> bool {
        if !self.is_susceptible() {
            return false;
        }
        self.health = HealthState::Infected;
        self.infection_age = 0.0;
        true
    }

    pub(crate) fn record_transmission(&mut self) {
        self.transmission_count += 1;
    }

    /// Ages an infected agent by `time_delta` seconds. Past incubation plus the symptomatic
    /// period the agent recovers; during the symptomatic window it dies with a per-tick
    /// probability proportional to `time_delta`. Returns the new state on a transition.
    pub(crate) fn progress(
        &mut self,
        time_delta: f64,
        parameters: &Parameters,
        random: &mut impl RandomSource,
    ) -> Option<HealthState> {
        if self.health != HealthState::Infected {
            return None;
        }
        self.infection_age += time_delta / parameters.seconds_per_day;

        if self.infection_age > parameters.incubation_period + parameters.symptomatic_period {
            self.health = HealthState::Recovered;
            return Some(HealthState::Recovered);
        }

        if self.infection_age > parameters.incubation_period {
            let death_probability = clamp_probability(
                parameters.death_rate(self.vulnerable) * time_delta
                    / (parameters.symptomatic_period * parameters.seconds_per_day),
            );
            if random.coin_flip(death_probability) {
                self.health = HealthState::Dead;
                self.walking = false;
                return Some(HealthState::Dead);
            }
        }
        None
    }
}
