//! Appointment model.
//!
//! An appointment is a schedulable unit of work with a fixed time window,
//! a priority, and capability requirements. The end time is always derived
//! from `start + duration` and can never diverge from it.

use chrono::{NaiveDateTime, TimeDelta};
use std::collections::HashSet;

use crate::error::SchedulingError;

/// Priority levels, ordered from least to most urgent.
///
/// Each level contributes a score multiplier via a static lookup table
/// (see [`Priority::multiplier`]); the enum itself carries no behavior
/// branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Score multipliers indexed by priority variant.
const PRIORITY_MULTIPLIERS: [f64; 4] = [1.0, 1.5, 2.0, 3.0];

impl Priority {
    /// Numeric level, 1 (Low) through 4 (Urgent).
    pub fn level(self) -> u8 {
        self as u8 + 1
    }

    /// Multiplier applied to an appointment's importance score.
    pub fn multiplier(self) -> f64 {
        PRIORITY_MULTIPLIERS[self as usize]
    }
}

/// Appointment classification.
///
/// Each type has a conventional default duration and a complexity factor,
/// both static table lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AppointmentType {
    Consultation,
    FollowUp,
    Treatment,
    Emergency,
    Surgery,
    Diagnostic,
    Therapy,
    Vaccination,
}

const DEFAULT_DURATION_MINUTES: [i64; 8] = [30, 15, 60, 45, 120, 45, 50, 20];
const COMPLEXITY_FACTORS: [f64; 8] = [1.0, 0.8, 1.5, 3.0, 2.5, 1.2, 1.1, 0.9];

impl AppointmentType {
    /// Conventional duration for this appointment type, in minutes.
    pub fn default_duration_minutes(self) -> i64 {
        DEFAULT_DURATION_MINUTES[self as usize]
    }

    /// Relative complexity weight for this appointment type.
    pub fn complexity_factor(self) -> f64 {
        COMPLEXITY_FACTORS[self as usize]
    }
}

/// Lifecycle status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Unscheduled,
}

/// A schedulable unit of work.
///
/// # Invariants
///
/// - `duration_minutes >= 0`, enforced at construction.
/// - `end() == start + duration` at all times; there is no independent
///   end field to drift.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Appointment {
    /// Unique appointment identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Start of the time window.
    pub start: NaiveDateTime,
    /// Length of the time window, in minutes.
    pub duration_minutes: i64,
    /// Appointment classification.
    pub appointment_type: AppointmentType,
    /// Scheduling priority.
    pub priority: Priority,
    /// Lifecycle status.
    pub status: AppointmentStatus,
    /// Resource assigned by a previous scheduling run, if any.
    pub resource_id: Option<String>,
    /// Owning client, if any.
    pub client_id: Option<String>,
    /// Capabilities a resource must hold (hard constraint).
    pub required_capabilities: HashSet<String>,
    /// Capabilities that improve the match (soft, scoring only).
    pub preferred_capabilities: HashSet<String>,
    /// Whether the start time may shift within the flexibility window.
    pub is_flexible: bool,
    /// Maximum shift of the start time in either direction, in minutes.
    pub flexibility_window_minutes: i64,
    /// Positive importance weight (default 1.0).
    pub importance_score: f64,
}

impl Appointment {
    /// Creates an appointment with the mandatory fields.
    ///
    /// Rejects a negative duration: an appointment whose end would precede
    /// its start violates a domain invariant and must never reach an
    /// optimizer.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> Result<Self, SchedulingError> {
        let id = id.into();
        if duration_minutes < 0 {
            return Err(SchedulingError::InvalidAppointment {
                id,
                reason: format!("duration must be non-negative, got {duration_minutes} minutes"),
            });
        }
        Ok(Self {
            id,
            title: title.into(),
            description: String::new(),
            start,
            duration_minutes,
            appointment_type: AppointmentType::Consultation,
            priority: Priority::Medium,
            status: AppointmentStatus::Pending,
            resource_id: None,
            client_id: None,
            required_capabilities: HashSet::new(),
            preferred_capabilities: HashSet::new(),
            is_flexible: false,
            flexibility_window_minutes: 0,
            importance_score: 1.0,
        })
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the appointment type.
    pub fn with_type(mut self, appointment_type: AppointmentType) -> Self {
        self.appointment_type = appointment_type;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the owning client.
    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Adds a required capability.
    pub fn with_required_capability(mut self, capability: impl Into<String>) -> Self {
        self.required_capabilities.insert(capability.into());
        self
    }

    /// Adds a preferred capability.
    pub fn with_preferred_capability(mut self, capability: impl Into<String>) -> Self {
        self.preferred_capabilities.insert(capability.into());
        self
    }

    /// Marks the appointment flexible within `window_minutes` of its start.
    pub fn with_flexibility(mut self, window_minutes: i64) -> Self {
        self.is_flexible = true;
        self.flexibility_window_minutes = window_minutes.max(0);
        self
    }

    /// Sets the importance score (clamped positive).
    pub fn with_importance(mut self, score: f64) -> Self {
        self.importance_score = score.max(0.0);
        self
    }

    /// End of the time window, derived from `start + duration`.
    pub fn end(&self) -> NaiveDateTime {
        self.start + TimeDelta::minutes(self.duration_minutes)
    }

    /// Duration as a `TimeDelta`.
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(self.duration_minutes)
    }

    /// Combined score: importance weighted by the priority multiplier.
    pub fn score(&self) -> f64 {
        self.importance_score * self.priority.multiplier()
    }

    /// Half-open interval overlap test with another appointment.
    ///
    /// An appointment never overlaps itself (same id), and appointments
    /// that merely touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        if self.id == other.id {
            return false;
        }
        self.start < other.end() && other.start < self.end()
    }

    /// Whether this appointment may legally start at `new_start`.
    ///
    /// Inflexible appointments admit only their fixed start; flexible ones
    /// admit any start within the flexibility window.
    pub fn can_start_at(&self, new_start: NaiveDateTime) -> bool {
        if !self.is_flexible {
            return new_start == self.start;
        }
        let window = TimeDelta::minutes(self.flexibility_window_minutes);
        new_start >= self.start - window && new_start <= self.start + window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn test_end_derived_from_start_and_duration() {
        let a = Appointment::new("A1", "Checkup", dt(9, 0), 45).unwrap();
        assert_eq!(a.end(), dt(9, 45));
        assert_eq!(a.duration(), TimeDelta::minutes(45));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = Appointment::new("A1", "Checkup", dt(9, 0), -15).unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::InvalidAppointment { ref id, .. } if id == "A1"
        ));
    }

    #[test]
    fn test_zero_duration_allowed() {
        let a = Appointment::new("A1", "Ping", dt(9, 0), 0).unwrap();
        assert_eq!(a.end(), a.start);
    }

    #[test]
    fn test_priority_levels_and_multipliers() {
        assert_eq!(Priority::Low.level(), 1);
        assert_eq!(Priority::Urgent.level(), 4);
        assert!(Priority::Urgent > Priority::High);
        assert!((Priority::Low.multiplier() - 1.0).abs() < 1e-10);
        assert!((Priority::Medium.multiplier() - 1.5).abs() < 1e-10);
        assert!((Priority::High.multiplier() - 2.0).abs() < 1e-10);
        assert!((Priority::Urgent.multiplier() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_type_tables() {
        assert_eq!(AppointmentType::Surgery.default_duration_minutes(), 120);
        assert_eq!(AppointmentType::FollowUp.default_duration_minutes(), 15);
        assert!((AppointmentType::Emergency.complexity_factor() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_score_combines_importance_and_priority() {
        let a = Appointment::new("A1", "Op", dt(9, 0), 60)
            .unwrap()
            .with_priority(Priority::Urgent)
            .with_importance(2.0);
        assert!((a.score() - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_overlap_half_open() {
        let a = Appointment::new("A1", "a", dt(9, 0), 60).unwrap();
        let b = Appointment::new("A2", "b", dt(9, 30), 60).unwrap();
        let c = Appointment::new("A3", "c", dt(10, 0), 30).unwrap();

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Touching endpoints do not overlap.
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_overlap_never_with_self() {
        let a = Appointment::new("A1", "a", dt(9, 0), 60).unwrap();
        let same = a.clone();
        assert!(!a.overlaps(&same));
    }

    #[test]
    fn test_flexibility_window() {
        let fixed = Appointment::new("A1", "a", dt(9, 0), 30).unwrap();
        assert!(fixed.can_start_at(dt(9, 0)));
        assert!(!fixed.can_start_at(dt(9, 15)));

        let flex = Appointment::new("A2", "b", dt(9, 0), 30)
            .unwrap()
            .with_flexibility(30);
        assert!(flex.can_start_at(dt(8, 30)));
        assert!(flex.can_start_at(dt(9, 30)));
        assert!(!flex.can_start_at(dt(9, 31)));
    }

    #[test]
    fn test_importance_clamped_non_negative() {
        let a = Appointment::new("A1", "a", dt(9, 0), 30)
            .unwrap()
            .with_importance(-3.0);
        assert!((a.importance_score - 0.0).abs() < 1e-10);
    }
}
