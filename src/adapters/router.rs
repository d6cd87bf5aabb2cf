//! Embedded-router vertical adapter.
//!
//! The accelerated path compares `used * 10` against `capacity * 8`
//! (the catalog's 80% threshold without a division), matching the
//! fixed-memory profile's backpressure posture. Per-interface queue depth
//! is observability-only.

use crate::adapters::{verify_isomorphism, ProofPoint};
use crate::error::Error;
use crate::profile::{OverloadDecision, Profile};

/// Observability-only context for a single router decision.
#[derive(Debug, Clone, Copy)]
pub struct RouterAnnotations {
    /// The interface index this decision was evaluated for.
    pub interface_index: u16,
}

/// The router accelerated overload decision.
#[must_use]
pub fn accelerated_decision(used: u32, capacity: u32, _annotations: RouterAnnotations) -> OverloadDecision {
    if capacity == 0 {
        return OverloadDecision::Backpressure;
    }
    if u64::from(used) * 10 >= u64::from(capacity) * 8 {
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
        ProofPoint { used: 79, capacity: 100 },
        ProofPoint { used: 80, capacity: 100 },
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
    verify_isomorphism(Profile::EmbeddedRouter, &proof_set(), |point| {
        accelerated_decision(point.used, point.capacity, RouterAnnotations { interface_index: 0 })
    })
}
