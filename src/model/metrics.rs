//! Derived schedule metrics.
//!
//! `ScheduleMetrics` is always produced by a single derivation step over a
//! finalized [`Schedule`]; it is never constructed field-by-field, so its
//! values cannot drift out of sync with the schedule they describe.

use std::collections::HashMap;

use crate::model::{AppointmentType, Priority, Resource, Schedule};

/// Aggregate statistics derived from a finalized schedule.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleMetrics {
    /// Cost of all assigned appointments.
    pub total_cost: f64,
    /// Mean cost per assigned appointment.
    pub average_cost_per_appointment: f64,
    /// Score over all appointments.
    pub total_score: f64,
    /// Mean score per appointment.
    pub average_score_per_appointment: f64,
    /// Number of input appointments.
    pub total_appointments: usize,
    /// Number of appointments holding a resource.
    pub assigned_appointments: usize,
    /// Number of appointments without a resource.
    pub unassigned_appointments: usize,
    /// Same-resource overlapping pairs.
    pub conflict_count: usize,
    /// Scheduled minutes over available resource-minutes, in [0, 1].
    pub utilization_rate: f64,
    /// Weighted quality score, in [0, 100].
    pub efficiency_score: f64,
    /// Minutes of assigned appointment time.
    pub total_scheduled_minutes: i64,
    /// Horizon minutes summed over the resources in use.
    pub total_available_minutes: i64,
    /// Assigned appointment count per resource id.
    pub resource_utilization: HashMap<String, usize>,
    /// Appointment count per priority.
    pub priority_distribution: HashMap<Priority, usize>,
    /// Appointment count per appointment type.
    pub type_distribution: HashMap<AppointmentType, usize>,
}

impl ScheduleMetrics {
    /// Derives all metrics from a finalized schedule.
    pub fn derive(schedule: &Schedule, _resources: &[Resource]) -> Self {
        let appointments = schedule.appointments();
        let total_appointments = appointments.len();
        let assigned_appointments = schedule.assigned_count();
        let unassigned_appointments = schedule.unassigned().len();
        let conflict_count = schedule.conflict_count();

        let mut resource_utilization: HashMap<String, usize> = HashMap::new();
        let mut priority_distribution: HashMap<Priority, usize> = HashMap::new();
        let mut type_distribution: HashMap<AppointmentType, usize> = HashMap::new();
        let mut total_scheduled_minutes = 0i64;

        for appointment in appointments {
            *priority_distribution
                .entry(appointment.priority)
                .or_insert(0) += 1;
            *type_distribution
                .entry(appointment.appointment_type)
                .or_insert(0) += 1;
            if let Some(resource_id) = schedule.resource_for(&appointment.id) {
                *resource_utilization
                    .entry(resource_id.to_string())
                    .or_insert(0) += 1;
                total_scheduled_minutes += appointment.duration_minutes;
            }
        }

        let horizon_minutes = match (schedule.horizon_start, schedule.horizon_end) {
            (Some(start), Some(end)) => (end - start).num_minutes(),
            _ => 0,
        };
        let total_available_minutes = horizon_minutes * resource_utilization.len() as i64;
        let utilization_rate = if total_available_minutes > 0 {
            (total_scheduled_minutes as f64 / total_available_minutes as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let assignment_fraction = if total_appointments > 0 {
            assigned_appointments as f64 / total_appointments as f64
        } else {
            0.0
        };
        let conflict_penalty = (1.0 - conflict_count as f64 * 0.1).max(0.0);
        let efficiency_score = ((utilization_rate * 0.4
            + conflict_penalty * 0.4
            + assignment_fraction * 0.2)
            * 100.0)
            .clamp(0.0, 100.0);

        Self {
            total_cost: schedule.total_cost(),
            average_cost_per_appointment: if assigned_appointments > 0 {
                schedule.total_cost() / assigned_appointments as f64
            } else {
                0.0
            },
            total_score: schedule.total_score(),
            average_score_per_appointment: if total_appointments > 0 {
                schedule.total_score() / total_appointments as f64
            } else {
                0.0
            },
            total_appointments,
            assigned_appointments,
            unassigned_appointments,
            conflict_count,
            utilization_rate,
            efficiency_score,
            total_scheduled_minutes,
            total_available_minutes,
            resource_utilization,
            priority_distribution,
            type_distribution,
        }
    }

    /// Percentage of appointments holding a resource.
    pub fn assignment_rate(&self) -> f64 {
        if self.total_appointments > 0 {
            self.assigned_appointments as f64 / self.total_appointments as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Conflicts per appointment, as a percentage.
    pub fn conflict_rate(&self) -> f64 {
        if self.total_appointments > 0 {
            self.conflict_count as f64 / self.total_appointments as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Resource with the most assigned appointments.
    pub fn most_utilized_resource(&self) -> Option<&str> {
        self.resource_utilization
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(id, _)| id.as_str())
    }

    /// Resource with the fewest assigned appointments.
    pub fn least_utilized_resource(&self) -> Option<&str> {
        self.resource_utilization
            .iter()
            .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
            .map(|(id, _)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Appointment, ResourceType};
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn appt(id: &str, hour: u32, duration: i64) -> Appointment {
        Appointment::new(id, id, dt(hour, 0), duration).unwrap()
    }

    fn finalized(
        appointments: &[Appointment],
        assignments: &[(&str, &str)],
        resources: &[Resource],
    ) -> Schedule {
        let mut s = Schedule::new("test", appointments);
        for (a, r) in assignments {
            s.assign(*a, *r);
        }
        s.finalize(resources);
        s
    }

    #[test]
    fn test_counts_and_rates() {
        let appointments = vec![appt("A1", 9, 60), appt("A2", 10, 60), appt("A3", 11, 60)];
        let resources = vec![Resource::new("R1", "r", ResourceType::Staff).with_cost(30.0)];
        let s = finalized(&appointments, &[("A1", "R1"), ("A2", "R1")], &resources);
        let m = s.metrics();

        assert_eq!(m.total_appointments, 3);
        assert_eq!(m.assigned_appointments, 2);
        assert_eq!(m.unassigned_appointments, 1);
        assert!((m.assignment_rate() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.conflict_count, 0);
        assert!((m.conflict_rate() - 0.0).abs() < 1e-10);
        assert!((m.average_cost_per_appointment - 15.0).abs() < 1e-10);
    }

    #[test]
    fn test_utilization_over_horizon() {
        // Horizon 9:00-12:00 = 180 min, one resource in use, 120 min scheduled.
        let appointments = vec![appt("A1", 9, 60), appt("A2", 11, 60)];
        let resources = vec![Resource::new("R1", "r", ResourceType::Room)];
        let s = finalized(&appointments, &[("A1", "R1"), ("A2", "R1")], &resources);

        assert!((s.metrics().utilization_rate - 120.0 / 180.0).abs() < 1e-10);
        assert_eq!(s.metrics().total_available_minutes, 180);
        assert_eq!(s.metrics().total_scheduled_minutes, 120);
    }

    #[test]
    fn test_efficiency_bounds() {
        // Fully assigned, no conflicts: well above zero, never above 100.
        let appointments = vec![appt("A1", 9, 60)];
        let resources = vec![Resource::new("R1", "r", ResourceType::Room)];
        let s = finalized(&appointments, &[("A1", "R1")], &resources);
        let score = s.metrics().efficiency_score;
        assert!((0.0..=100.0).contains(&score));
        assert!(score > 50.0);

        // Nothing assigned at all.
        let mut empty = Schedule::new("test", &appointments);
        empty.finalize(&resources);
        let score = empty.metrics().efficiency_score;
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn test_heavy_conflicts_floor_the_penalty() {
        // Eleven mutually overlapping appointments on one resource:
        // 55 conflict pairs, penalty floors at 0 instead of going negative.
        let appointments: Vec<Appointment> =
            (0..11).map(|i| appt(&format!("A{i}"), 9, 60)).collect();
        let assignments: Vec<(&str, &str)> = appointments
            .iter()
            .map(|a| (a.id.as_str(), "R1"))
            .collect();
        let resources = vec![Resource::new("R1", "r", ResourceType::Room)];
        let s = finalized(&appointments, &assignments, &resources);

        assert_eq!(s.metrics().conflict_count, 55);
        assert!((0.0..=100.0).contains(&s.metrics().efficiency_score));
    }

    #[test]
    fn test_distributions() {
        let appointments = vec![
            appt("A1", 9, 30).with_priority(Priority::High),
            appt("A2", 10, 30).with_priority(Priority::High),
            appt("A3", 11, 30).with_type(AppointmentType::Surgery),
        ];
        let resources = vec![Resource::new("R1", "r", ResourceType::Room)];
        let s = finalized(&appointments, &[("A1", "R1")], &resources);
        let m = s.metrics();

        assert_eq!(m.priority_distribution[&Priority::High], 2);
        assert_eq!(m.priority_distribution[&Priority::Medium], 1);
        assert_eq!(m.type_distribution[&AppointmentType::Surgery], 1);
        assert_eq!(m.type_distribution[&AppointmentType::Consultation], 2);
    }

    #[test]
    fn test_most_and_least_utilized() {
        let appointments = vec![appt("A1", 9, 30), appt("A2", 10, 30), appt("A3", 11, 30)];
        let resources = vec![
            Resource::new("R1", "r", ResourceType::Room),
            Resource::new("R2", "r", ResourceType::Room),
        ];
        let s = finalized(
            &appointments,
            &[("A1", "R1"), ("A2", "R1"), ("A3", "R2")],
            &resources,
        );

        assert_eq!(s.metrics().most_utilized_resource(), Some("R1"));
        assert_eq!(s.metrics().least_utilized_resource(), Some("R2"));
    }

    #[test]
    fn test_empty_schedule_metrics() {
        let mut s = Schedule::new("test", &[]);
        s.finalize(&[]);
        let m = s.metrics();
        assert_eq!(m.total_appointments, 0);
        assert!((m.assignment_rate() - 0.0).abs() < 1e-10);
        assert!((m.utilization_rate - 0.0).abs() < 1e-10);
        assert!(m.most_utilized_resource().is_none());
    }
}
