//! Side-by-side algorithm comparison.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::csp::{CspConfig, CspRunner};
use crate::error::SchedulingError;
use crate::ga::{GaConfig, GaRunner};
use crate::model::{Appointment, Resource, Schedule};
use crate::sa::{SaConfig, SaRunner};

/// The optimization algorithms the harness can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// Backtracking constraint-satisfaction search.
    Csp,
    /// Genetic algorithm.
    Ga,
    /// Simulated annealing.
    Sa,
}

impl Algorithm {
    /// All algorithms, in comparison order.
    pub const ALL: [Algorithm; 3] = [Algorithm::Csp, Algorithm::Ga, Algorithm::Sa];

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Csp => "csp",
            Algorithm::Ga => "ga",
            Algorithm::Sa => "sa",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| s.eq_ignore_ascii_case(a.name()))
            .ok_or_else(|| SchedulingError::UnknownAlgorithm(s.to_string()))
    }
}

/// Outcome of one algorithm on one instance.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    /// Which algorithm produced this result.
    pub algorithm: Algorithm,

    /// The finalized schedule.
    pub schedule: Schedule,

    /// Wall-clock time of the run.
    pub execution_time: Duration,

    /// Algorithm-specific work counter: backtracks for CSP, generations
    /// for GA, iterations for SA.
    pub iterations: usize,

    /// Efficiency score of the schedule, in [0, 100].
    pub efficiency_score: f64,

    /// Total cost of all assignments.
    pub total_cost: f64,

    /// Number of conflicting appointment pairs.
    pub conflict_count: usize,
}

/// Runs the three optimizers on the same instance and ranks the outcomes.
///
/// # Usage
///
/// ```ignore
/// let harness = Harness::new().with_seed(42);
/// let results = harness.compare_all(&appointments, &resources);
/// if let Some(best) = Harness::best_result(&results) {
///     println!("{} wins with {:.1}", best.algorithm, best.efficiency_score);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Harness {
    /// CSP solver configuration.
    pub csp: CspConfig,
    /// Genetic algorithm configuration.
    pub ga: GaConfig,
    /// Simulated annealing configuration.
    pub sa: SaConfig,
}

impl Harness {
    /// Harness with default configurations for all three algorithms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the CSP configuration.
    pub fn with_csp(mut self, config: CspConfig) -> Self {
        self.csp = config;
        self
    }

    /// Sets the GA configuration.
    pub fn with_ga(mut self, config: GaConfig) -> Self {
        self.ga = config;
        self
    }

    /// Sets the SA configuration.
    pub fn with_sa(mut self, config: SaConfig) -> Self {
        self.sa = config;
        self
    }

    /// Seeds both stochastic algorithms for a reproducible comparison.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.ga = self.ga.with_seed(seed);
        self.sa = self.sa.with_seed(seed);
        self
    }

    /// Runs one algorithm and returns only its schedule.
    pub fn optimize(
        &self,
        algorithm: Algorithm,
        appointments: &[Appointment],
        resources: &[Resource],
    ) -> Schedule {
        self.run_one(algorithm, appointments, resources, None)
            .schedule
    }

    /// Runs the algorithm named by `name` ("csp", "ga", or "sa",
    /// case-insensitive).
    pub fn optimize_named(
        &self,
        name: &str,
        appointments: &[Appointment],
        resources: &[Resource],
    ) -> Result<Schedule, SchedulingError> {
        let algorithm = name.parse()?;
        Ok(self.optimize(algorithm, appointments, resources))
    }

    /// Runs all three algorithms concurrently on the same instance.
    pub fn compare_all(
        &self,
        appointments: &[Appointment],
        resources: &[Resource],
    ) -> HashMap<Algorithm, ComparisonResult> {
        self.compare_all_with_cancel(appointments, resources, None)
    }

    /// Runs all three algorithms concurrently, sharing one cancellation
    /// token. Cancelled runs still contribute their best-so-far schedule.
    pub fn compare_all_with_cancel(
        &self,
        appointments: &[Appointment],
        resources: &[Resource],
        cancel: Option<Arc<AtomicBool>>,
    ) -> HashMap<Algorithm, ComparisonResult> {
        Algorithm::ALL
            .into_par_iter()
            .map(|algorithm| {
                (
                    algorithm,
                    self.run_one(algorithm, appointments, resources, cancel.clone()),
                )
            })
            .collect()
    }

    /// The result with the highest efficiency score. Ties break toward
    /// the earlier algorithm in [`Algorithm::ALL`] so the outcome is
    /// deterministic.
    pub fn best_result(
        results: &HashMap<Algorithm, ComparisonResult>,
    ) -> Option<&ComparisonResult> {
        results.values().max_by(|a, b| {
            a.efficiency_score
                .partial_cmp(&b.efficiency_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.algorithm.cmp(&a.algorithm))
        })
    }

    fn run_one(
        &self,
        algorithm: Algorithm,
        appointments: &[Appointment],
        resources: &[Resource],
        cancel: Option<Arc<AtomicBool>>,
    ) -> ComparisonResult {
        let started = Instant::now();
        let (schedule, iterations) = match algorithm {
            Algorithm::Csp => {
                let result = CspRunner::run_with_cancel(appointments, resources, &self.csp, cancel);
                (result.schedule, result.backtracks)
            }
            Algorithm::Ga => {
                let result = GaRunner::run_with_cancel(appointments, resources, &self.ga, cancel);
                (result.schedule, result.generations)
            }
            Algorithm::Sa => {
                let result = SaRunner::run_with_cancel(appointments, resources, &self.sa, cancel);
                (result.schedule, result.iterations)
            }
        };
        let execution_time = started.elapsed();

        ComparisonResult {
            algorithm,
            execution_time,
            iterations,
            efficiency_score: schedule.metrics().efficiency_score,
            total_cost: schedule.total_cost(),
            conflict_count: schedule.conflict_count(),
            schedule,
        }
    }
}
