//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process over
//! assignment chromosomes: initialization → evaluation → selection →
//! crossover → mutation → repeat.

use super::config::GaConfig;
use crate::eval;
use crate::model::{Appointment, Resource, Schedule};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Result of a GA optimization run.
///
/// Contains the best schedule found, along with statistics about the
/// evolutionary process.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The best schedule found during the entire run.
    pub schedule: Schedule,

    /// Fitness of the best chromosome (higher is better).
    pub best_fitness: f64,

    /// Total number of generations executed.
    pub generations: usize,

    /// Whether the run stopped because the population converged.
    pub converged: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Best fitness after initialization and after each generation.
    pub fitness_history: Vec<f64>,
}

/// A candidate schedule encoded as one gene per appointment.
///
/// A gene holds the index of the assigned resource, or `None` when the
/// appointment is left unassigned.
#[derive(Debug, Clone)]
struct Chromosome {
    genes: Vec<Option<usize>>,
    fitness: f64,
}

/// Precomputed view of the scheduling instance shared by all chromosomes.
struct Instance<'a> {
    appointments: &'a [Appointment],
    resources: &'a [Resource],
    /// Per-appointment indices of resources passing the hard eligibility check.
    eligible: Vec<Vec<usize>>,
}

impl<'a> Instance<'a> {
    fn new(appointments: &'a [Appointment], resources: &'a [Resource]) -> Self {
        let eligible = appointments
            .iter()
            .map(|a| eval::eligible_indices(a, resources))
            .collect();
        Self {
            appointments,
            resources,
            eligible,
        }
    }

    /// Builds a random chromosome. Appointments with no eligible resource
    /// stay unassigned.
    fn random_chromosome<R: Rng>(&self, rng: &mut R) -> Chromosome {
        let genes = self
            .eligible
            .iter()
            .map(|candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    Some(candidates[rng.random_range(0..candidates.len())])
                }
            })
            .collect();
        Chromosome {
            genes,
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Weighted fitness of a gene vector (higher is better).
    ///
    /// Combines assignment rate, a conflict penalty that loses 10% per
    /// conflicting pair, and cost efficiency (priority-weighted score per
    /// unit cost), weighted 30/40/30 and scaled by 100.
    fn fitness(&self, genes: &[Option<usize>]) -> f64 {
        let total = self.appointments.len();
        let mut assigned = 0usize;
        let mut cost = 0.0;
        let mut score = 0.0;
        for (appointment, gene) in self.appointments.iter().zip(genes) {
            if let Some(r) = gene {
                assigned += 1;
                cost += self.resources[*r].cost_for(appointment.duration_minutes);
                score += appointment.score();
            }
        }
        let conflicts = eval::count_conflicts_by(self.appointments, |i| genes[i]);

        let assignment_rate = if total > 0 {
            assigned as f64 / total as f64
        } else {
            0.0
        };
        let conflict_penalty = (1.0 - 0.1 * conflicts as f64).max(0.0);
        let cost_efficiency = if cost > 0.0 { score / cost } else { score };

        (0.3 * assignment_rate + 0.4 * conflict_penalty + 0.3 * cost_efficiency) * 100.0
    }

    /// Single-point crossover producing two children.
    fn crossover<R: Rng>(
        &self,
        p1: &Chromosome,
        p2: &Chromosome,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        let n = p1.genes.len();
        if n < 2 {
            return (p1.clone(), p2.clone());
        }
        let point = rng.random_range(1..n);
        let mut c1 = Vec::with_capacity(n);
        let mut c2 = Vec::with_capacity(n);
        for i in 0..n {
            if i < point {
                c1.push(p1.genes[i]);
                c2.push(p2.genes[i]);
            } else {
                c1.push(p2.genes[i]);
                c2.push(p1.genes[i]);
            }
        }
        (
            Chromosome {
                genes: c1,
                fitness: f64::NEG_INFINITY,
            },
            Chromosome {
                genes: c2,
                fitness: f64::NEG_INFINITY,
            },
        )
    }

    /// Reassigns each gene with probability `gene_rate`, always to an
    /// eligible resource.
    fn mutate<R: Rng>(&self, chromosome: &mut Chromosome, gene_rate: f64, rng: &mut R) {
        for (gene, candidates) in chromosome.genes.iter_mut().zip(&self.eligible) {
            if candidates.is_empty() {
                continue;
            }
            if rng.random_range(0.0..1.0) < gene_rate {
                *gene = Some(candidates[rng.random_range(0..candidates.len())]);
            }
        }
    }

    /// Converts the best chromosome into a finalized schedule.
    fn to_schedule(&self, genes: &[Option<usize>]) -> Schedule {
        let mut schedule = Schedule::new("ga", self.appointments);
        for (appointment, gene) in self.appointments.iter().zip(genes) {
            match gene {
                Some(r) => schedule.assign(&appointment.id, &self.resources[*r].id),
                None => schedule.mark_unassigned(&appointment.id),
            }
        }
        schedule.finalize(self.resources);
        schedule
    }
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let config = GaConfig::default().with_seed(42);
/// let result = GaRunner::run(&appointments, &resources, &config);
/// println!("Best fitness: {:.2}", result.best_fitness);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`GaConfig::validate`]
    /// first to get a descriptive error).
    pub fn run(
        appointments: &[Appointment],
        resources: &[Resource],
        config: &GaConfig,
    ) -> GaResult {
        Self::run_with_cancel(appointments, resources, config, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA stops
    /// at the start of the next generation and returns the best schedule
    /// found so far.
    pub fn run_with_cancel(
        appointments: &[Appointment],
        resources: &[Resource],
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> GaResult {
        config.validate().expect("invalid GaConfig");

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let instance = Instance::new(appointments, resources);

        // 1. Initialize population
        let mut population: Vec<Chromosome> = (0..config.population_size)
            .map(|_| instance.random_chromosome(&mut rng))
            .collect();

        // 2. Evaluate initial population
        evaluate_population(&instance, &mut population, config.parallel);

        // 3. Track best
        let mut best = find_best(&population).clone();
        let mut fitness_history = Vec::with_capacity(config.max_generations + 1);
        fitness_history.push(best.fitness);

        let mut generations = 0usize;
        let mut converged = false;
        let mut cancelled = false;

        let elite_count = (config.population_size as f64 * config.elite_ratio) as usize;

        // 4. Evolutionary loop
        for _ in 0..config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(AtomicOrdering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            // Convergence check: best and mean population fitness agree
            let mean =
                population.iter().map(|c| c.fitness).sum::<f64>() / population.len() as f64;
            let pop_best = find_best(&population).fitness;
            if (pop_best - mean).abs() < config.convergence_epsilon {
                converged = true;
                break;
            }

            generations += 1;

            // Sort population by fitness (descending = best first)
            population.sort_by(|a, b| {
                b.fitness
                    .partial_cmp(&a.fitness)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            // Elite preservation
            let mut next_gen: Vec<Chromosome> = population[..elite_count].to_vec();

            // Generate offspring
            while next_gen.len() < config.population_size {
                let p1 = tournament(&population, config.tournament_size, &mut rng);
                let p2 = tournament(&population, config.tournament_size, &mut rng);

                let (c1, c2) = if rng.random_range(0.0..1.0) < config.crossover_rate {
                    instance.crossover(&population[p1], &population[p2], &mut rng)
                } else {
                    (population[p1].clone(), population[p2].clone())
                };

                for mut child in [c1, c2] {
                    if next_gen.len() >= config.population_size {
                        break;
                    }
                    if rng.random_range(0.0..1.0) < config.mutation_rate {
                        instance.mutate(&mut child, config.gene_mutation_rate, &mut rng);
                    }
                    next_gen.push(child);
                }
            }

            // Evaluate new individuals (elites carry their fitness over)
            evaluate_slice(&instance, &mut next_gen[elite_count..], config.parallel);

            population = next_gen;

            // Update best
            let gen_best = find_best(&population);
            if gen_best.fitness > best.fitness {
                best = gen_best.clone();
            }

            fitness_history.push(best.fitness);
        }

        GaResult {
            schedule: instance.to_schedule(&best.genes),
            best_fitness: best.fitness,
            generations,
            converged,
            cancelled,
            fitness_history,
        }
    }

    /// Convenience wrapper returning only the best schedule.
    pub fn optimize(
        appointments: &[Appointment],
        resources: &[Resource],
        config: &GaConfig,
    ) -> Schedule {
        Self::run(appointments, resources, config).schedule
    }
}

/// Tournament selection: samples `k` chromosomes and returns the index of
/// the fittest.
fn tournament<R: Rng>(population: &[Chromosome], k: usize, rng: &mut R) -> usize {
    let mut winner = rng.random_range(0..population.len());
    for _ in 1..k {
        let challenger = rng.random_range(0..population.len());
        if population[challenger].fitness > population[winner].fitness {
            winner = challenger;
        }
    }
    winner
}

fn evaluate_population(instance: &Instance<'_>, population: &mut [Chromosome], parallel: bool) {
    evaluate_slice(instance, population, parallel);
}

fn evaluate_slice(instance: &Instance<'_>, chromosomes: &mut [Chromosome], parallel: bool) {
    if parallel {
        chromosomes.par_iter_mut().for_each(|c| {
            c.fitness = instance.fitness(&c.genes);
        });
    } else {
        for c in chromosomes.iter_mut() {
            c.fitness = instance.fitness(&c.genes);
        }
    }
}

/// Find the chromosome with the best (highest) fitness.
fn find_best(population: &[Chromosome]) -> &Chromosome {
    population
        .iter()
        .max_by(|a, b| {
            a.fitness
                .partial_cmp(&b.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .expect("population must not be empty")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, ResourceType};
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn appointment(id: &str, hour: u32, duration: i64) -> Appointment {
        Appointment::new(id, id, at(hour, 0), duration).unwrap()
    }

    fn resource(id: &str, cost: f64) -> Resource {
        Resource::new(id, id, ResourceType::Staff).with_cost(cost)
    }

    fn test_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(40)
            .with_max_generations(60)
            .with_seed(42)
            .with_parallel(false)
    }

    #[test]
    fn test_assigns_disjoint_appointments() {
        let appointments = vec![
            appointment("a1", 9, 30),
            appointment("a2", 10, 30),
            appointment("a3", 11, 30),
        ];
        let resources = vec![resource("r1", 50.0)];

        let result = GaRunner::run(&appointments, &resources, &test_config());

        assert_eq!(result.schedule.assigned_count(), 3);
        assert_eq!(result.schedule.conflict_count(), 0);
    }

    #[test]
    fn test_resolves_overlap_across_resources() {
        // Both appointments overlap; two resources are available, so a
        // conflict-free assignment exists and the GA should find it.
        let appointments = vec![appointment("a1", 9, 60), appointment("a2", 9, 60)];
        let resources = vec![resource("r1", 50.0), resource("r2", 50.0)];

        let result = GaRunner::run(&appointments, &resources, &test_config());

        assert_eq!(result.schedule.assigned_count(), 2);
        assert_eq!(result.schedule.conflict_count(), 0);
        assert_ne!(
            result.schedule.resource_for("a1"),
            result.schedule.resource_for("a2")
        );
    }

    #[test]
    fn test_capabilities_are_hard() {
        let needs_surgery = appointment("a1", 9, 60).with_required_capability("surgery");
        let appointments = vec![needs_surgery, appointment("a2", 10, 30)];

        let surgeon = resource("surgeon", 200.0).with_capability("surgery");
        let resources = vec![surgeon, resource("nurse", 40.0)];

        let result = GaRunner::run(&appointments, &resources, &test_config());

        assert_eq!(result.schedule.resource_for("a1"), Some("surgeon"));
    }

    #[test]
    fn test_zero_resources() {
        let appointments = vec![appointment("a1", 9, 30)];
        let result = GaRunner::run(&appointments, &[], &test_config());

        assert_eq!(result.schedule.assigned_count(), 0);
        assert_eq!(result.schedule.unassigned().len(), 1);
        assert!((result.schedule.total_cost() - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_appointments() {
        let resources = vec![resource("r1", 50.0)];
        let result = GaRunner::run(&[], &resources, &test_config());

        assert_eq!(result.schedule.appointments().len(), 0);
        assert_eq!(result.schedule.assigned_count(), 0);
    }

    #[test]
    fn test_fitness_history_monotone() {
        let appointments = vec![
            appointment("a1", 9, 60),
            appointment("a2", 9, 60),
            appointment("a3", 10, 60),
        ];
        let resources = vec![resource("r1", 50.0), resource("r2", 80.0)];

        let result = GaRunner::run(&appointments, &resources, &test_config());

        assert!(!result.fitness_history.is_empty());
        for window in result.fitness_history.windows(2) {
            assert!(
                window[1] >= window[0],
                "best fitness must never regress with elitism: {} < {}",
                window[1],
                window[0]
            );
        }
        assert!((result.best_fitness - *result.fitness_history.last().unwrap()).abs() < 1e-10);
    }

    #[test]
    fn test_seed_reproducibility() {
        let appointments = vec![
            appointment("a1", 9, 60),
            appointment("a2", 9, 45),
            appointment("a3", 10, 30),
            appointment("a4", 11, 90),
        ];
        let resources = vec![resource("r1", 50.0), resource("r2", 70.0), resource("r3", 30.0)];

        let config = test_config();
        let first = GaRunner::run(&appointments, &resources, &config);
        let second = GaRunner::run(&appointments, &resources, &config);

        assert_eq!(first.schedule.assignments(), second.schedule.assignments());
        assert!((first.best_fitness - second.best_fitness).abs() < 1e-10);
    }

    #[test]
    fn test_preferred_appointments_stay_within_eligible() {
        let urgent = appointment("a1", 9, 30)
            .with_priority(Priority::Urgent)
            .with_required_capability("xray");
        let appointments = vec![urgent];

        let resources = vec![
            resource("r1", 20.0),
            resource("r2", 60.0).with_capability("xray"),
        ];

        let result = GaRunner::run(&appointments, &resources, &test_config());

        // Only r2 is eligible, so the assignment must land there.
        assert_eq!(result.schedule.resource_for("a1"), Some("r2"));
    }

    #[test]
    fn test_convergence_on_trivial_instance() {
        // Single appointment, single resource: every chromosome is
        // identical, so best and mean coincide after evaluation.
        let appointments = vec![appointment("a1", 9, 30)];
        let resources = vec![resource("r1", 50.0)];

        let result = GaRunner::run(&appointments, &resources, &test_config());

        assert!(result.converged);
        assert_eq!(result.generations, 0);
    }

    #[test]
    fn test_cancellation() {
        let appointments = vec![appointment("a1", 9, 60), appointment("a2", 9, 60)];
        let resources = vec![resource("r1", 50.0)];

        let cancel = Arc::new(AtomicBool::new(true));
        let result =
            GaRunner::run_with_cancel(&appointments, &resources, &test_config(), Some(cancel));

        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        // The initial best is still returned as a valid schedule.
        assert_eq!(
            result.schedule.assignments().len() + result.schedule.unassigned().len(),
            2
        );
    }

    #[test]
    #[should_panic(expected = "invalid GaConfig")]
    fn test_invalid_config_panics() {
        let config = GaConfig::default().with_population_size(1);
        GaRunner::run(&[], &[], &config);
    }
}
