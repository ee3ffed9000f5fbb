//! Independent schedule validation.
//!
//! Re-derives every check from the appointment and resource data instead
//! of trusting the totals a schedule carries. Hard violations become
//! errors; conditions worth a second look become warnings.

use std::collections::HashMap;

use crate::eval;
use crate::model::{Resource, Schedule};

/// Outcome of validating a schedule.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Hard constraint violations. A schedule with any is not executable.
    pub errors: Vec<String>,

    /// Non-fatal findings, such as unassigned appointments.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether the schedule has no hard violations.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any warnings were recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validates a schedule against the resource pool.
///
/// Errors: assignment to an unknown or inactive resource, a capability
/// requirement the resource cannot meet, an appointment outside the
/// resource's availability window, and any same-resource double-booking.
/// Warnings: unassigned appointments, with a distinct message for those
/// no resource in the pool could ever host.
pub fn validate(schedule: &Schedule, resources: &[Resource]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let by_id: HashMap<&str, &Resource> =
        resources.iter().map(|r| (r.id.as_str(), r)).collect();

    for appointment in schedule.appointments() {
        let Some(resource_id) = schedule.resource_for(&appointment.id) else {
            if eval::eligible_indices(appointment, resources).is_empty() {
                report.warnings.push(format!(
                    "appointment `{}` has no eligible resource in the pool",
                    appointment.id
                ));
            } else {
                report.warnings.push(format!(
                    "appointment `{}` is unassigned",
                    appointment.id
                ));
            }
            continue;
        };

        let Some(resource) = by_id.get(resource_id) else {
            report.errors.push(format!(
                "appointment `{}` assigned to unknown resource `{resource_id}`",
                appointment.id
            ));
            continue;
        };

        if !resource.is_active {
            report.errors.push(format!(
                "appointment `{}` assigned to inactive resource `{}`",
                appointment.id, resource.id
            ));
        }
        if !resource.has_capabilities(&appointment.required_capabilities) {
            report.errors.push(format!(
                "resource `{}` lacks required capabilities for appointment `{}`",
                resource.id, appointment.id
            ));
        }
        if !resource.is_available_for(appointment.start, appointment.duration_minutes) {
            report.errors.push(format!(
                "appointment `{}` falls outside the availability window of resource `{}`",
                appointment.id, resource.id
            ));
        }
    }

    // Double-bookings, reported per conflicting pair.
    let appointments = schedule.appointments();
    for i in 0..appointments.len() {
        let Some(ri) = schedule.resource_for(&appointments[i].id) else {
            continue;
        };
        for j in (i + 1)..appointments.len() {
            let Some(rj) = schedule.resource_for(&appointments[j].id) else {
                continue;
            };
            if ri == rj && eval::conflicts_in_time(&appointments[i], &appointments[j]) {
                report.errors.push(format!(
                    "resource `{ri}` double-booked: `{}` overlaps `{}`",
                    appointments[i].id, appointments[j].id
                ));
            }
        }
    }

    report
}
