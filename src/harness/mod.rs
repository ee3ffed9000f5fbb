//! Comparison harness and independent validation.
//!
//! The harness runs the three optimizers concurrently on the same
//! instance and ranks their schedules by efficiency score. The validator
//! re-derives every constraint check from raw appointment and resource
//! data, so it catches disagreements between an optimizer and the shared
//! evaluation rules.

mod compare;
mod validate;

pub use compare::{Algorithm, ComparisonResult, Harness};
pub use validate::{validate, ValidationReport};
