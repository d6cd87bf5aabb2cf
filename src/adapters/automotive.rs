//! Automotive vertical adapter.
//!
//! The accelerated path compares `used * 10` against `capacity * 7`
//! (equivalent to the catalog's 70% threshold without a division),
//! matching the safety-critical profile's watchdog-trip degradation.
//! Watchdog deadline and fault-code context are observability-only.

use crate::adapters::{verify_isomorphism, ProofPoint};
use crate::error::Error;
use crate::profile::{OverloadDecision, Profile};

/// Observability-only context for a single automotive decision.
#[derive(Debug, Clone, Copy)]
pub struct AutomotiveAnnotations {
    /// Remaining nanoseconds before the watchdog trips.
    pub watchdog_deadline_ns: u64,
    /// The active fault code, if any.
    pub fault_code: Option<u16>,
}

/// The automotive accelerated overload decision.
#[must_use]
pub fn accelerated_decision(used: u32, capacity: u32, _annotations: AutomotiveAnnotations) -> OverloadDecision {
    if capacity == 0 {
        return OverloadDecision::Backpressure;
    }
    if u64::from(used) * 10 >= u64::from(capacity) * 7 {
        OverloadDecision::Backpressure
    } else {
        OverloadDecision::Admit
    }
}

/// The declared proof set this adapter's isomorphism is checked against.
#[must_use]
pub fn proof_set() -> Vec<ProofPoint> {
    vec![
        ProofPoint { used: 0, capacity: 100 },
        ProofPoint { used: 69, capacity: 100 },
        ProofPoint { used: 70, capacity: 100 },
        ProofPoint { used: 100, capacity: 100 },
        ProofPoint { used: 0, capacity: 0 },
    ]
}

/// Verifies the accelerated path against the catalog fallback over
/// [`proof_set`].
///
/// # Errors
/// See [`verify_isomorphism`].
pub fn verify() -> Result<(), Error> {
    verify_isomorphism(Profile::Automotive, &proof_set(), |point| {
        accelerated_decision(
            point.used,
            point.capacity,
            AutomotiveAnnotations { watchdog_deadline_ns: 0, fault_code: None },
        )
    })
}
