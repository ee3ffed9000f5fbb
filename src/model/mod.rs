//! Domain model: appointments, resources, schedules, and derived metrics.
//!
//! Pure data plus small derived-value helpers (overlap tests, cost and
//! score calculation, capability tests). All search logic lives in the
//! optimizer modules; the model knows nothing about any algorithm.

mod appointment;
mod metrics;
mod resource;
mod schedule;

pub use appointment::{Appointment, AppointmentStatus, AppointmentType, Priority};
pub use metrics::ScheduleMetrics;
pub use resource::{Resource, ResourceType};
pub use schedule::Schedule;
