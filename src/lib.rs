//! Appointment scheduling optimization.
//!
//! Assigns appointments to capability-matched resources using three
//! interchangeable algorithms over one shared constraint evaluator:
//!
//! - **CSP**: Deterministic backtracking search with a hardest-first
//!   variable order, cost-ranked candidates, and a bounded attempt budget.
//! - **Genetic Algorithm (GA)**: Population-based search over assignment
//!   chromosomes with tournament selection, elitism, and a weighted
//!   fitness of coverage, conflicts, and cost efficiency.
//! - **Simulated Annealing (SA)**: Single-solution trajectory search with
//!   geometric cooling and four neighborhood move kinds.
//!
//! The [`harness`] module runs all three concurrently on the same
//! instance, ranks the outcomes by efficiency score, and independently
//! validates any schedule against the resource pool.
//!
//! # Example
//!
//! ```
//! use appt_solver::harness::{Harness, Algorithm};
//! use appt_solver::model::{Appointment, Resource, ResourceType};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2025, 6, 2)
//!     .unwrap()
//!     .and_hms_opt(9, 0, 0)
//!     .unwrap();
//! let appointments = vec![
//!     Appointment::new("checkup", "Annual checkup", start, 30).unwrap(),
//! ];
//! let resources = vec![
//!     Resource::new("dr-kim", "Dr. Kim", ResourceType::Staff).with_cost(120.0),
//! ];
//!
//! let schedule = Harness::new()
//!     .with_seed(42)
//!     .optimize(Algorithm::Csp, &appointments, &resources);
//! assert_eq!(schedule.resource_for("checkup"), Some("dr-kim"));
//! ```

pub mod csp;
pub mod eval;
pub mod ga;
pub mod harness;
pub mod model;
pub mod sa;

mod error;

pub use error::SchedulingError;
