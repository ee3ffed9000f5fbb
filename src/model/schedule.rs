//! Schedule: the output artifact of one optimization run.
//!
//! A schedule is built incrementally by the owning optimizer (`assign` /
//! `mark_unassigned`) and finalized exactly once before being returned;
//! afterwards it is treated as immutable.

use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

use crate::eval;
use crate::model::{Appointment, Resource, ScheduleMetrics};

/// A one-to-one-or-none mapping from appointments to resources, with
/// aggregate totals and derived metrics.
///
/// # Invariant
///
/// After [`finalize`](Schedule::finalize), every input appointment id is in
/// exactly one of `assignments` or `unassigned`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    /// Identifier of this run, e.g. `"csp"`.
    pub id: String,
    /// Earliest appointment start, `None` for an empty input.
    pub horizon_start: Option<NaiveDateTime>,
    /// Latest appointment end, `None` for an empty input.
    pub horizon_end: Option<NaiveDateTime>,
    appointments: Vec<Appointment>,
    assignments: HashMap<String, String>,
    unassigned: HashSet<String>,
    total_cost: f64,
    total_score: f64,
    conflict_count: usize,
    metrics: ScheduleMetrics,
}

impl Schedule {
    /// Creates an empty schedule over the given appointment set.
    ///
    /// The horizon is derived from the appointments; all ids start out
    /// neither assigned nor unassigned until `assign`/`finalize` sort them.
    pub fn new(id: impl Into<String>, appointments: &[Appointment]) -> Self {
        let horizon_start = appointments.iter().map(|a| a.start).min();
        let horizon_end = appointments.iter().map(|a| a.end()).max();
        Self {
            id: id.into(),
            horizon_start,
            horizon_end,
            appointments: appointments.to_vec(),
            assignments: HashMap::new(),
            unassigned: HashSet::new(),
            total_cost: 0.0,
            total_score: 0.0,
            conflict_count: 0,
            metrics: ScheduleMetrics::default(),
        }
    }

    /// Assigns an appointment to a resource.
    pub fn assign(&mut self, appointment_id: impl Into<String>, resource_id: impl Into<String>) {
        let appointment_id = appointment_id.into();
        self.unassigned.remove(&appointment_id);
        self.assignments.insert(appointment_id, resource_id.into());
    }

    /// Records an appointment as unassigned.
    pub fn mark_unassigned(&mut self, appointment_id: impl Into<String>) {
        let appointment_id = appointment_id.into();
        self.assignments.remove(&appointment_id);
        self.unassigned.insert(appointment_id);
    }

    /// Computes totals and derived metrics. Called exactly once by the
    /// owning optimizer before the schedule is returned.
    ///
    /// Any appointment not explicitly assigned is marked unassigned here,
    /// which establishes the partition invariant.
    pub fn finalize(&mut self, resources: &[Resource]) {
        let ids: Vec<String> = self
            .appointments
            .iter()
            .filter(|a| !self.assignments.contains_key(&a.id))
            .map(|a| a.id.clone())
            .collect();
        for id in ids {
            self.unassigned.insert(id);
        }

        let by_id: HashMap<&str, &Resource> =
            resources.iter().map(|r| (r.id.as_str(), r)).collect();

        self.total_cost = self
            .appointments
            .iter()
            .filter_map(|a| {
                let rid = self.assignments.get(&a.id)?;
                let resource = by_id.get(rid.as_str())?;
                Some(eval::resource_cost(resource, a.duration_minutes))
            })
            .sum();
        self.total_score = self.appointments.iter().map(|a| a.score()).sum();
        self.conflict_count = eval::count_conflicts(&self.appointments, &self.assignments);

        let metrics = ScheduleMetrics::derive(self, resources);
        self.metrics = metrics;
    }

    /// The appointments this schedule was optimized over.
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    /// The appointment-id → resource-id assignment map.
    pub fn assignments(&self) -> &HashMap<String, String> {
        &self.assignments
    }

    /// Ids of appointments left without a resource.
    pub fn unassigned(&self) -> &HashSet<String> {
        &self.unassigned
    }

    /// The resource assigned to an appointment, if any.
    pub fn resource_for(&self, appointment_id: &str) -> Option<&str> {
        self.assignments.get(appointment_id).map(String::as_str)
    }

    /// All appointments assigned to a resource.
    pub fn appointments_on(&self, resource_id: &str) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| self.resource_for(&a.id) == Some(resource_id))
            .collect()
    }

    /// Number of assigned appointments.
    pub fn assigned_count(&self) -> usize {
        self.assignments.len()
    }

    /// Total cost of all assigned appointments.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Total score over all appointments.
    pub fn total_score(&self) -> f64 {
        self.total_score
    }

    /// Same-resource overlapping pairs, counted once per unordered pair.
    pub fn conflict_count(&self) -> usize {
        self.conflict_count
    }

    /// Whether any conflict survived into this schedule.
    pub fn has_conflicts(&self) -> bool {
        self.conflict_count > 0
    }

    /// Derived metrics, populated by `finalize`.
    pub fn metrics(&self) -> &ScheduleMetrics {
        &self.metrics
    }
}
