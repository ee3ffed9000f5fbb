//! Resource model.
//!
//! A resource is a capacity provider — a room, a piece of equipment, a
//! staff member — with a capability set, an hourly cost, an availability
//! window, and a set of mutually exclusive resources (shared equipment).

use chrono::{NaiveDateTime, TimeDelta};
use std::collections::HashSet;

/// Resource classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceType {
    /// Physical space for appointments.
    Room,
    /// Medical or technical equipment.
    Equipment,
    /// Human resources: doctors, nurses, technicians.
    Staff,
    /// Transportation.
    Vehicle,
    /// Online meeting spaces or other virtual capacity.
    Virtual,
}

/// A schedulable capacity provider.
///
/// A resource is usable only while `is_active` and only for appointments
/// whose time window lies inside `[available_from, available_to]`
/// (`None` bounds are unbounded).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    /// Unique resource identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Resource classification.
    pub resource_type: ResourceType,
    /// Capabilities this resource provides.
    pub capabilities: HashSet<String>,
    /// Hourly cost, never negative.
    pub cost_per_hour: f64,
    /// Simultaneous units available, at least 1.
    pub capacity: u32,
    /// Whether the resource is currently usable.
    pub is_active: bool,
    /// Start of the availability window (`None` = unbounded).
    pub available_from: Option<NaiveDateTime>,
    /// End of the availability window (`None` = unbounded).
    pub available_to: Option<NaiveDateTime>,
    /// Ids of resources that cannot be in use at the same time as this one.
    pub conflicts: HashSet<String>,
}

impl Resource {
    /// Creates a resource with the mandatory fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        resource_type: ResourceType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resource_type,
            capabilities: HashSet::new(),
            cost_per_hour: 0.0,
            capacity: 1,
            is_active: true,
            available_from: None,
            available_to: None,
            conflicts: HashSet::new(),
        }
    }

    /// Adds a capability.
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Sets the hourly cost (clamped non-negative).
    pub fn with_cost(mut self, cost_per_hour: f64) -> Self {
        self.cost_per_hour = cost_per_hour.max(0.0);
        self
    }

    /// Sets the capacity (at least 1).
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Sets the availability window.
    pub fn with_availability(mut self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.available_from = Some(from);
        self.available_to = Some(to);
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// Declares a mutually exclusive resource.
    pub fn with_conflict(mut self, resource_id: impl Into<String>) -> Self {
        self.conflicts.insert(resource_id.into());
        self
    }

    /// Whether this resource provides every capability in `required`.
    ///
    /// An empty requirement set is always satisfied.
    pub fn has_capabilities(&self, required: &HashSet<String>) -> bool {
        required.iter().all(|c| self.capabilities.contains(c))
    }

    /// Whether the window `[start, start + duration)` lies inside the
    /// availability window of an active resource.
    pub fn is_available_for(&self, start: NaiveDateTime, duration_minutes: i64) -> bool {
        if !self.is_active {
            return false;
        }
        let end = start + TimeDelta::minutes(duration_minutes);
        if let Some(from) = self.available_from {
            if start < from {
                return false;
            }
        }
        if let Some(to) = self.available_to {
            if end > to {
                return false;
            }
        }
        true
    }

    /// Cost of using this resource for `duration_minutes`.
    pub fn cost_for(&self, duration_minutes: i64) -> f64 {
        self.cost_per_hour * duration_minutes as f64 / 60.0
    }

    /// Symmetric mutual-exclusion test against another resource.
    pub fn conflicts_with(&self, other: &Resource) -> bool {
        if self.id == other.id {
            return false;
        }
        self.conflicts.contains(&other.id) || other.conflicts.contains(&self.id)
    }
}
