//! Backtracking search execution.
//!
//! Deterministic depth-first assignment with undo-on-failure. Appointments
//! are ordered hardest-first (priority level, then score, descending);
//! candidate resources are ordered cheapest-and-best-matching-first. A
//! global attempt counter bounds the search; exhausting it keeps the
//! partial assignment found so far instead of failing.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use super::config::CspConfig;
use crate::eval;
use crate::model::{Appointment, Resource, Schedule};

/// Result of a backtracking run.
#[derive(Debug, Clone)]
pub struct CspResult {
    /// The (possibly partial) schedule.
    pub schedule: Schedule,
    /// Backtracking attempts consumed.
    pub backtracks: usize,
    /// Whether the attempt cap stopped the search.
    pub exhausted: bool,
    /// Whether cancelled externally.
    pub cancelled: bool,
}

/// Executes the backtracking solver.
///
/// Deterministic for a fixed input ordering: no randomness is involved,
/// and all tie-breaks fall back to input order.
pub struct CspRunner;

impl CspRunner {
    /// Runs the solver and returns the schedule plus search statistics.
    pub fn run(
        appointments: &[Appointment],
        resources: &[Resource],
        config: &CspConfig,
    ) -> CspResult {
        Self::run_with_cancel(appointments, resources, config, None)
    }

    /// Runs the solver with an optional cancellation token, checked at the
    /// head of every backtracking step. Cancellation keeps the partial
    /// assignment found so far.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`CspConfig::validate`]
    /// first to get a descriptive error).
    pub fn run_with_cancel(
        appointments: &[Appointment],
        resources: &[Resource],
        config: &CspConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> CspResult {
        config.validate().expect("invalid CspConfig");

        // Private, hardest-first copy of the input. The sort is stable, so
        // determinism holds even with equal keys.
        let mut sorted: Vec<Appointment> = appointments.to_vec();
        sorted.sort_by(|a, b| {
            b.priority
                .level()
                .cmp(&a.priority.level())
                .then_with(|| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal))
        });

        // Appointments with no eligible resource at all can never be
        // placed; excluding them up front keeps the search budget for
        // branches that can actually succeed.
        let hopeless: Vec<bool> = sorted
            .iter()
            .map(|a| eval::eligible_resources(a, resources).is_empty())
            .collect();

        let mut search = Search {
            appointments: &sorted,
            resources,
            assignments: vec![None; sorted.len()],
            hopeless,
            backtracks: 0,
            max_backtracks: config.max_backtracks,
            stopped: false,
            cancel,
            cancelled: false,
        };
        search.solve();

        let mut schedule = Schedule::new("csp", &sorted);
        for (idx, slot) in search.assignments.iter().enumerate() {
            if let Some(r) = slot {
                schedule.assign(sorted[idx].id.clone(), resources[*r].id.clone());
            }
        }
        schedule.finalize(resources);

        CspResult {
            schedule,
            backtracks: search.backtracks,
            exhausted: search.stopped && !search.cancelled,
            cancelled: search.cancelled,
        }
    }

    /// Convenience wrapper returning only the schedule.
    pub fn optimize(
        appointments: &[Appointment],
        resources: &[Resource],
        config: &CspConfig,
    ) -> Schedule {
        Self::run(appointments, resources, config).schedule
    }
}

struct Search<'a> {
    appointments: &'a [Appointment],
    resources: &'a [Resource],
    /// Resource index per appointment position, `None` = unassigned.
    assignments: Vec<Option<usize>>,
    /// Positions with no eligible resource at all, fixed before the search.
    hopeless: Vec<bool>,
    backtracks: usize,
    max_backtracks: usize,
    stopped: bool,
    cancel: Option<Arc<AtomicBool>>,
    cancelled: bool,
}

impl Search<'_> {
    /// Backtracking first; when no complete assignment of the placeable
    /// appointments exists, fall back to a deterministic greedy pass so the
    /// unplaceable remainder is marked unassigned instead of sinking the
    /// whole schedule.
    fn solve(&mut self) {
        if !self.backtrack(0) {
            self.greedy();
        }
    }

    /// Depth-first assignment from position `idx`. Returns `true` when
    /// every placeable position from `idx` on is assigned, or when the
    /// budget/cancellation froze the partial assignment built so far.
    fn backtrack(&mut self, idx: usize) -> bool {
        if idx >= self.appointments.len() {
            return true;
        }
        if self.hopeless[idx] {
            return self.backtrack(idx + 1);
        }
        if self.out_of_budget() {
            self.stopped = true;
            return true;
        }
        self.backtracks += 1;

        for r in self.candidates(idx) {
            self.assignments[idx] = Some(r);
            if self.backtrack(idx + 1) {
                return true;
            }
            self.assignments[idx] = None;
        }
        false
    }

    /// First-fit pass over the sorted appointments. Used only after the
    /// exhaustive search has proven that no conflict-free complete
    /// assignment exists.
    fn greedy(&mut self) {
        self.assignments.fill(None);
        for idx in 0..self.appointments.len() {
            if self.hopeless[idx] {
                continue;
            }
            self.assignments[idx] = self.candidates(idx).first().copied();
        }
    }

    fn out_of_budget(&mut self) -> bool {
        if let Some(ref flag) = self.cancel {
            if flag.load(AtomicOrdering::Relaxed) {
                self.cancelled = true;
                return true;
            }
        }
        self.backtracks >= self.max_backtracks
    }

    /// Candidate resource indices for `appointments[idx]`, filtered against
    /// the committed partial assignment and ordered ascending by
    /// `cost - capability match` (cheaper, better-matching first).
    fn candidates(&self, idx: usize) -> Vec<usize> {
        let appointment = &self.appointments[idx];
        let mut candidates: Vec<usize> = (0..self.resources.len())
            .filter(|&r| eval::is_eligible(appointment, &self.resources[r]))
            .filter(|&r| self.compatible_with_partial(idx, r))
            .collect();
        candidates.sort_by(|&a, &b| {
            let key = |r: usize| {
                eval::resource_cost(&self.resources[r], appointment.duration_minutes)
                    - eval::capability_match(&self.resources[r], appointment)
            };
            key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal)
        });
        candidates
    }

    /// Whether assigning `resource` to `appointments[idx]` collides with an
    /// earlier commitment: a same-resource time overlap, or an overlap on a
    /// resource declared mutually exclusive with this one.
    fn compatible_with_partial(&self, idx: usize, resource: usize) -> bool {
        for (other, slot) in self.assignments.iter().enumerate().take(idx) {
            let Some(assigned) = slot else { continue };
            let same = *assigned == resource;
            let excluded = self.resources[*assigned].conflicts_with(&self.resources[resource]);
            if (same || excluded)
                && eval::conflicts_in_time(&self.appointments[idx], &self.appointments[other])
            {
                return false;
            }
        }
        true
    }
}
