//! Simulated annealing over the group tree.
//!
//! A single-solution trajectory search: random swap moves, Metropolis
//! acceptance against a geometrically cooling temperature, and an
//! adaptive round length driven by the observed uphill acceptance rate.
//! The starting temperature is not configured but *calibrated* from the
//! cost landscape, by sampling uphill deltas until the chosen quantile
//! would be accepted with the target probability.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast Computing Machines"

mod config;
mod mutation;
mod runner;

pub use config::AnnealConfig;
pub use mutation::{MoveKind, MoveTable};
pub use runner::{AnnealResult, AnnealRunner, StopReason};
