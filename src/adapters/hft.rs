//! HFT vertical adapter.
//!
//! The accelerated path skips the generic evaluator's percentage division
//! in favor of a precomputed integer threshold, and never sheds or sleeps
//! — matching the catalog policy's `forbidden_flags`. Tick-to-trade budget
//! and queue headroom are surfaced for diagnostics only; the decision
//! branch below never reads them.

use crate::adapters::{verify_isomorphism, ProofPoint};
use crate::error::Error;
use crate::profile::{OverloadDecision, Profile};

/// Observability-only context for a single HFT decision.
#[derive(Debug, Clone, Copy)]
pub struct HftAnnotations {
    /// Remaining nanoseconds in the tick-to-trade budget.
    pub tick_to_trade_budget_ns: u64,
    /// Free slots in the order queue.
    pub queue_headroom: u32,
}

/// The HFT accelerated overload decision.
#[must_use]
pub fn accelerated_decision(used: u32, capacity: u32, _annotations: HftAnnotations) -> OverloadDecision {
    if capacity == 0 {
        return OverloadDecision::Reject;
    }
    let threshold = capacity.saturating_mul(95) / 100;
    if used >= threshold {
        OverloadDecision::Reject
    } else {
        OverloadDecision::Admit
    }
}

/// The declared proof set this adapter's isomorphism is checked against.
#[must_use]
pub fn proof_set() -> Vec<ProofPoint> {
    vec![
        ProofPoint { used: 0, capacity: 100 },
        ProofPoint { used: 50, capacity: 100 },
        ProofPoint { used: 94, capacity: 100 },
        ProofPoint { used: 95, capacity: 100 },
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
    verify_isomorphism(Profile::Hft, &proof_set(), |point| {
        accelerated_decision(
            point.used,
            point.capacity,
            HftAnnotations {
                tick_to_trade_budget_ns: 0,
                queue_headroom: point.capacity.saturating_sub(point.used),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accelerated_path_is_isomorphic_to_catalog_fallback() {
        verify().unwrap();
    }

    #[test]
    fn accelerated_path_never_sheds() {
        for point in proof_set() {
            let decision = accelerated_decision(
                point.used,
                point.capacity,
                HftAnnotations { tick_to_trade_budget_ns: 0, queue_headroom: 0 },
            );
            assert!(!matches!(decision, OverloadDecision::Shed(_) | OverloadDecision::Backpressure));
        }
    }
}
