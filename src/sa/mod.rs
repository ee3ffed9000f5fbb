//! Simulated annealing for appointment scheduling.
//!
//! A single-solution trajectory search over assignment vectors. Accepts
//! worsening moves with a probability that decreases as the temperature
//! cools, allowing the search to escape local optima. Energy is the total
//! assignment cost plus fixed penalties per conflicting pair and per
//! unassigned appointment.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"

mod config;
mod runner;

pub use config::SaConfig;
pub use runner::{SaResult, SaRunner};
