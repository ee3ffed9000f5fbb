//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

/// Configuration for the genetic algorithm.
///
/// # Defaults
///
/// ```
/// use appt_solver::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 1000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use appt_solver::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_tournament_size(5)
///     .with_mutation_rate(0.2)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
pub struct GaConfig {
    /// Number of chromosomes in the population.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Tournament sample size for parent selection.
    ///
    /// Higher values increase selection pressure.
    pub tournament_size: usize,

    /// Probability of applying crossover to a pair of parents (0.0-1.0).
    ///
    /// When crossover is not applied, the parents are cloned.
    pub crossover_rate: f64,

    /// Probability of mutating a non-elite offspring at all (0.0-1.0).
    pub mutation_rate: f64,

    /// Per-appointment reassignment probability inside a mutation (0.0-1.0).
    pub gene_mutation_rate: f64,

    /// Fraction of the population preserved unchanged each generation.
    pub elite_ratio: f64,

    /// Convergence threshold: the run stops when best and mean population
    /// fitness differ by less than this epsilon.
    pub convergence_epsilon: f64,

    /// Whether to evaluate chromosomes in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 1000,
            tournament_size: 5,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            gene_mutation_rate: 0.1,
            elite_ratio: 0.1,
            convergence_epsilon: 0.01,
            parallel: true,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the tournament sample size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k.max(1);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-offspring mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-appointment reassignment probability.
    pub fn with_gene_mutation_rate(mut self, rate: f64) -> Self {
        self.gene_mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the convergence epsilon (clamped non-negative).
    pub fn with_convergence_epsilon(mut self, epsilon: f64) -> Self {
        self.convergence_epsilon = epsilon.max(0.0);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for quick runs: small population, few generations.
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.max_generations == 0 {
            return Err("max_generations must be at least 1".into());
        }
        if self.tournament_size == 0 {
            return Err("tournament_size must be at least 1".into());
        }
        let elite_count = (self.population_size as f64 * self.elite_ratio) as usize;
        if elite_count >= self.population_size {
            return Err("elite_ratio too high: elites fill entire population".into());
        }
        Ok(())
    }
}
