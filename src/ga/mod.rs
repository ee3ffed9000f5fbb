//! Genetic algorithm for appointment scheduling.
//!
//! Evolves a population of assignment chromosomes (one gene per appointment,
//! holding the chosen resource or `None`) toward a weighted fitness that
//! rewards assignment coverage, conflict-freedom, and cost efficiency.
//! Genes are drawn only from capability-eligible resources, so capability
//! requirements are honored by construction.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, rates, convergence)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Final optimization result with statistics
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
mod runner;

pub use config::GaConfig;
pub use runner::{GaResult, GaRunner};
