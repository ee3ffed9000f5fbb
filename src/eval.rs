//! Shared constraint evaluation.
//!
//! Pure, side-effect-free functions consumed by all three optimizers, the
//! schedule finalizer, and the validator. Keeping eligibility, overlap, and
//! conflict counting here means every algorithm scores solutions with the
//! same rules — a conflict means the same thing to the CSP solver, the GA
//! fitness function, the SA energy function, and the validator.
//!
//! Conflicts are counted once per **unordered** pair of appointments that
//! share a resource with overlapping time windows. No double-count-and-halve
//! step exists anywhere in the crate.

use std::collections::HashMap;

use crate::model::{Appointment, Resource};

/// Whether `resource` may host `appointment` at all: the resource is
/// active, its capability set is a superset of the appointment's required
/// capabilities, and the appointment's time window lies inside the
/// resource's availability window.
pub fn is_eligible(appointment: &Appointment, resource: &Resource) -> bool {
    resource.is_active
        && resource.has_capabilities(&appointment.required_capabilities)
        && resource.is_available_for(appointment.start, appointment.duration_minutes)
}

/// Half-open interval overlap: `a.start < b.end && b.start < a.end`.
///
/// Identical ids never conflict with themselves.
pub fn conflicts_in_time(a: &Appointment, b: &Appointment) -> bool {
    a.overlaps(b)
}

/// Cost of occupying `resource` for `duration_minutes`.
pub fn resource_cost(resource: &Resource, duration_minutes: i64) -> f64 {
    resource.cost_for(duration_minutes)
}

/// Soft-match bonus of a resource for an appointment: 1.0 when the required
/// capabilities are covered, plus 0.5 when any preferred capability is.
pub fn capability_match(resource: &Resource, appointment: &Appointment) -> f64 {
    let required = if resource.has_capabilities(&appointment.required_capabilities) {
        1.0
    } else {
        0.0
    };
    let preferred = if appointment
        .preferred_capabilities
        .iter()
        .any(|c| resource.capabilities.contains(c))
    {
        0.5
    } else {
        0.0
    };
    required + preferred
}

/// All resources eligible for an appointment, in input order.
pub fn eligible_resources<'a>(
    appointment: &Appointment,
    resources: &'a [Resource],
) -> Vec<&'a Resource> {
    resources
        .iter()
        .filter(|r| is_eligible(appointment, r))
        .collect()
}

/// Indices of all resources eligible for an appointment, in input order.
///
/// The index form suits optimizers that encode assignments as positions
/// into the resource slice.
pub fn eligible_indices(appointment: &Appointment, resources: &[Resource]) -> Vec<usize> {
    (0..resources.len())
        .filter(|&r| is_eligible(appointment, &resources[r]))
        .collect()
}

/// Counts same-resource overlapping pairs under an arbitrary assignment
/// representation.
///
/// `assignment(i)` returns the resource key assigned to `appointments[i]`,
/// or `None` when unassigned. Each conflicting unordered pair is counted
/// exactly once.
pub fn count_conflicts_by<K, F>(appointments: &[Appointment], assignment: F) -> usize
where
    K: PartialEq,
    F: Fn(usize) -> Option<K>,
{
    let mut conflicts = 0;
    for i in 0..appointments.len() {
        let Some(ri) = assignment(i) else { continue };
        for j in (i + 1)..appointments.len() {
            let Some(rj) = assignment(j) else { continue };
            if ri == rj && conflicts_in_time(&appointments[i], &appointments[j]) {
                conflicts += 1;
            }
        }
    }
    conflicts
}

/// Counts same-resource overlapping pairs under an appointment-id →
/// resource-id assignment map.
pub fn count_conflicts(
    appointments: &[Appointment],
    assignments: &HashMap<String, String>,
) -> usize {
    count_conflicts_by(appointments, |i| assignments.get(&appointments[i].id))
}
