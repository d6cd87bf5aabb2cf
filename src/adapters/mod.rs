//! Vertical adapters: domain-accelerated overload decision paths that must
//! stay isomorphic to the generic catalog fallback (`profile::catalog`).
//!
//! Each adapter ships an accelerated path specialized for its domain plus a
//! declared proof set; [`verify_isomorphism`] checks the accelerated and
//! fallback decisions agree, bit-for-bit, at every declared point. Domain
//! annotations carried alongside an accelerated decision are observability
//! only — they are never read inside the decision branch itself, so they
//! cannot perturb the digest.

pub mod automotive;
pub mod hft;
pub mod router;

use crate::error::{Error, ErrorKind, ReasonPointer};
use crate::profile::{evaluate, policy_for, OverloadDecision, Profile};

fn reason(site: &'static str) -> ReasonPointer {
    ReasonPointer::new("adapters", site)
}

/// One point (`used`, `capacity`) in an adapter's declared isomorphism
/// proof set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofPoint {
    /// Units of capacity currently in use.
    pub used: u32,
    /// Total capacity.
    pub capacity: u32,
}

/// Verifies that `accelerated` agrees with the catalog fallback for
/// `profile` at every point in `proof_set`.
///
/// # Errors
/// Returns [`ErrorKind::DeterminismViolation`] at the first disagreement.
pub fn verify_isomorphism(
    profile: Profile,
    proof_set: &[ProofPoint],
    accelerated: impl Fn(ProofPoint) -> OverloadDecision,
) -> Result<(), Error> {
    let policy = policy_for(profile);
    for point in proof_set {
        let fallback = evaluate(&policy, point.used, point.capacity);
        let accel = accelerated(*point);
        if accel != fallback {
            return Err(Error::new(ErrorKind::DeterminismViolation, reason("verify_isomorphism")));
        }
    }
    Ok(())
}
