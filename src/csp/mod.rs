//! Backtracking constraint-satisfaction solver.
//!
//! Exhaustive depth-first search with constraint propagation through the
//! partial assignment, hardest-first variable ordering, and
//! cheapest-first value ordering. A bounded attempt counter keeps
//! pathological inputs from blowing up exponentially; the search then
//! returns the best partial assignment instead of an error.
//!
//! Deterministic: two runs over the same input produce identical schedules.
//!
//! # References
//!
//! - Russell & Norvig (2020), *Artificial Intelligence: A Modern Approach*,
//!   Ch. 6 (CSPs, backtracking search, variable/value ordering)

mod config;
mod runner;

pub use config::CspConfig;
pub use runner::{CspResult, CspRunner};
