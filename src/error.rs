//! Crate error type.
//!
//! Only two situations are hard errors (everything else — degenerate input,
//! exhausted search budgets, unassignable appointments — is a normal
//! partial-result return):
//!
//! - a domain invariant violated at construction time
//! - an unknown algorithm name requested from the harness

use thiserror::Error;

/// Errors produced by the scheduling crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    /// An appointment violated a construction-time invariant
    /// (e.g. negative duration).
    #[error("invalid appointment `{id}`: {reason}")]
    InvalidAppointment { id: String, reason: String },

    /// An algorithm name not known to the harness was requested.
    #[error("unknown algorithm `{0}` (expected one of: csp, ga, sa)")]
    UnknownAlgorithm(String),
}
