//! A spatial agent-based model of infectious disease spread.
//!
//! Agents wander a bounded square domain, and an infected agent that comes within the infection
//! distance of a susceptible one passes the disease on. The central object is the [`World`], which
//! owns the population and advances it in discrete steps:
//!
//! ```rust
//! use covidsim::{Parameters, SeededRandom, World};
//!
//! let parameters = Parameters {
//!     population: 200,
//!     initial_infected: 2,
//!     ..Parameters::default()
//! };
//! let mut world = World::new(parameters, SeededRandom::new(42)).unwrap();
//! while !world.is_done() && world.elapsed_days() < 30.0 {
//!     world.step(3600.0).unwrap();
//! }
//! let snapshot = world.snapshot();
//! assert_eq!(snapshot.total(), 200);
//! ```
//!
//! The world is built from a few modules:
//! * [`agent`]: the per-person movement and disease state machines.
//! * [`spatial_index`]: a uniform grid answering "who is near this agent".
//! * [`random`]: the injected [`RandomSource`] capability, seeded for reproducible runs.
//! * [`stats`]: read-only tallies of the population by health category.
//!
//! Around the engine, [`parameters`] loads and validates configuration, [`report`] writes
//! statistics to CSV, and [`runner`] drives a complete run from the command line.
pub mod agent;
pub mod error;
pub mod execution_stats;
pub mod log;
mod macros;
pub mod numeric;
pub mod parameters;
pub mod point;
pub mod random;
pub mod report;
pub mod runner;
pub mod spatial_index;
pub mod stats;
pub mod world;

pub use agent::{Agent, HealthState};
pub use error::SimError;
pub use parameters::{load_parameters, Parameters};
pub use point::Point;
pub use random::{RandomSource, SeededRandom};
pub use spatial_index::{Neighborhood, SpatialIndex};
pub use stats::{HealthCategory, StatsSnapshot};
pub use world::World;
