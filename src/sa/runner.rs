//! SA execution loop.

use super::config::SaConfig;
use crate::eval;
use crate::model::{Appointment, Resource, Schedule};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Weight applied to each conflicting pair in the energy function.
const CONFLICT_PENALTY: f64 = 100.0;

/// Weight applied to each unassigned appointment in the energy function.
const UNASSIGNED_PENALTY: f64 = 200.0;

/// Result of a simulated annealing run.
#[derive(Debug, Clone)]
pub struct SaResult {
    /// The best schedule found.
    pub schedule: Schedule,

    /// Energy of the best solution (lower is better).
    pub best_energy: f64,

    /// Total number of iterations (neighbor evaluations).
    pub iterations: usize,

    /// Final temperature when the algorithm stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of improving moves.
    pub improving_moves: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best energy sampled every 100 iterations.
    pub energy_history: Vec<f64>,
}

/// Executes the simulated annealing algorithm over assignment vectors.
///
/// A solution is one gene per appointment holding the index of the
/// assigned resource, or `None` when unassigned. Neighbors are produced
/// by four move kinds: single reassignment, swap between two assigned
/// appointments, block reassignment, and a shift of a flexible
/// appointment (which degrades to a reassignment because start times
/// stay fixed).
pub struct SaRunner;

impl SaRunner {
    /// Runs SA optimization.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`SaConfig::validate`]
    /// first to get a descriptive error).
    pub fn run(
        appointments: &[Appointment],
        resources: &[Resource],
        config: &SaConfig,
    ) -> SaResult {
        Self::run_with_cancel(appointments, resources, config, None)
    }

    /// Runs SA with an optional cancellation token.
    pub fn run_with_cancel(
        appointments: &[Appointment],
        resources: &[Resource],
        config: &SaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SaResult {
        config.validate().expect("invalid SaConfig");

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let instance = Instance::new(appointments, resources);

        // Initialize
        let mut current = instance.random_solution(&mut rng);
        let mut current_energy = instance.energy(&current);
        let mut best = current.clone();
        let mut best_energy = current_energy;

        let mut temperature = config.initial_temperature;
        let mut iterations = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut cancelled = false;

        let mut energy_history = Vec::new();
        energy_history.push(best_energy);

        while temperature > config.min_temperature && iterations < config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            let neighbor = instance.neighbor(&current, config.block_size, &mut rng);
            let neighbor_energy = instance.energy(&neighbor);
            let delta = neighbor_energy - current_energy;

            // Metropolis acceptance criterion
            let accept = if delta < 0.0 {
                improving_moves += 1;
                true
            } else {
                rng.random_range(0.0..1.0) < (-delta / temperature).exp()
            };

            if accept {
                current = neighbor;
                current_energy = neighbor_energy;
                accepted_moves += 1;

                if current_energy < best_energy {
                    best = current.clone();
                    best_energy = current_energy;
                }
            }

            temperature *= config.cooling_rate;
            iterations += 1;

            if iterations % 100 == 0 {
                energy_history.push(best_energy);
            }
        }

        // Final history entry
        if energy_history
            .last()
            .is_none_or(|&last| (last - best_energy).abs() > 1e-15)
        {
            energy_history.push(best_energy);
        }

        SaResult {
            schedule: instance.to_schedule(&best),
            best_energy,
            iterations,
            final_temperature: temperature,
            accepted_moves,
            improving_moves,
            cancelled,
            energy_history,
        }
    }

    /// Convenience wrapper returning only the best schedule.
    pub fn optimize(
        appointments: &[Appointment],
        resources: &[Resource],
        config: &SaConfig,
    ) -> Schedule {
        Self::run(appointments, resources, config).schedule
    }
}

/// Precomputed view of the scheduling instance.
struct Instance<'a> {
    appointments: &'a [Appointment],
    resources: &'a [Resource],
    /// Per-appointment indices of resources passing the hard eligibility check.
    eligible: Vec<Vec<usize>>,
    /// Indices of flexible appointments, for the shift move.
    flexible: Vec<usize>,
}

impl<'a> Instance<'a> {
    fn new(appointments: &'a [Appointment], resources: &'a [Resource]) -> Self {
        let eligible: Vec<Vec<usize>> = appointments
            .iter()
            .map(|a| eval::eligible_indices(a, resources))
            .collect();
        let flexible = appointments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_flexible)
            .map(|(i, _)| i)
            .collect();
        Self {
            appointments,
            resources,
            eligible,
            flexible,
        }
    }

    /// Random assignment vector. Appointments without an eligible resource
    /// stay unassigned.
    fn random_solution<R: Rng>(&self, rng: &mut R) -> Vec<Option<usize>> {
        self.eligible
            .iter()
            .map(|candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    Some(candidates[rng.random_range(0..candidates.len())])
                }
            })
            .collect()
    }

    /// Energy of a solution (lower is better): total assignment cost plus
    /// penalties for conflicting pairs and unassigned appointments.
    fn energy(&self, genes: &[Option<usize>]) -> f64 {
        let mut cost = 0.0;
        let mut unassigned = 0usize;
        for (appointment, gene) in self.appointments.iter().zip(genes) {
            match gene {
                Some(r) => cost += self.resources[*r].cost_for(appointment.duration_minutes),
                None => unassigned += 1,
            }
        }
        let conflicts = eval::count_conflicts_by(self.appointments, |i| genes[i]);
        cost + CONFLICT_PENALTY * conflicts as f64 + UNASSIGNED_PENALTY * unassigned as f64
    }

    /// Produces a neighbor by one of four move kinds.
    fn neighbor<R: Rng>(
        &self,
        genes: &[Option<usize>],
        block_size: usize,
        rng: &mut R,
    ) -> Vec<Option<usize>> {
        let mut next = genes.to_vec();
        if next.is_empty() {
            return next;
        }
        match rng.random_range(0..4u8) {
            0 => self.reassign_one(&mut next, rng),
            1 => self.swap_pair(&mut next, rng),
            2 => {
                for _ in 0..block_size {
                    self.reassign_one(&mut next, rng);
                }
            }
            _ => self.shift_flexible(&mut next, rng),
        }
        next
    }

    /// Reassigns one random appointment to a random eligible resource.
    fn reassign_one<R: Rng>(&self, genes: &mut [Option<usize>], rng: &mut R) {
        let i = rng.random_range(0..genes.len());
        let candidates = &self.eligible[i];
        if !candidates.is_empty() {
            genes[i] = Some(candidates[rng.random_range(0..candidates.len())]);
        }
    }

    /// Swaps the resources of two assigned appointments, provided each
    /// resource is eligible for the other appointment.
    fn swap_pair<R: Rng>(&self, genes: &mut [Option<usize>], rng: &mut R) {
        if genes.len() < 2 {
            return;
        }
        let i = rng.random_range(0..genes.len());
        let mut j = rng.random_range(0..genes.len());
        if i == j {
            j = (j + 1) % genes.len();
        }
        if let (Some(ri), Some(rj)) = (genes[i], genes[j]) {
            if self.eligible[i].contains(&rj) && self.eligible[j].contains(&ri) {
                genes[i] = Some(rj);
                genes[j] = Some(ri);
            }
        }
    }

    /// Moves a flexible appointment to another eligible resource. With
    /// fixed start times this is the closest analogue of a time shift.
    /// Falls back to a plain reassignment when nothing is flexible.
    fn shift_flexible<R: Rng>(&self, genes: &mut [Option<usize>], rng: &mut R) {
        if self.flexible.is_empty() {
            self.reassign_one(genes, rng);
            return;
        }
        let i = self.flexible[rng.random_range(0..self.flexible.len())];
        let candidates = &self.eligible[i];
        if !candidates.is_empty() {
            genes[i] = Some(candidates[rng.random_range(0..candidates.len())]);
        }
    }

    fn to_schedule(&self, genes: &[Option<usize>]) -> Schedule {
        let mut schedule = Schedule::new("sa", self.appointments);
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
