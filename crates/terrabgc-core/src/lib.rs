//! Daily integration engine for coupled soil-plant water, carbon and
//! nitrogen cycling.
//!
//! A [`simulation::Simulation`] owns the state of one soil column and its
//! vegetation. Each call to [`simulation::Simulation::step_day`] zeroes the
//! daily flux aggregates, lets every process module populate them, commits
//! them to state in a fixed order and then checks mass balance.

pub mod allocation;
pub mod balance;
pub mod canopy;
pub mod config;
pub mod constants;
pub mod decomp;
pub mod disturbance;
pub mod epv;
pub mod error;
pub mod flux;
pub mod forcing;
pub mod hydrology;
pub mod layers;
pub mod nitrogen;
pub mod outputs;
pub mod params;
pub mod phenology;
pub mod respiration;
pub mod restart;
pub mod roots;
pub mod simulation;
pub mod soil_temperature;
pub mod state;
pub mod transport;
pub mod update;

pub use config::SimulationConfig;
pub use error::{BgcError, BgcResult};
pub use simulation::Simulation;
