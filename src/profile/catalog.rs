//! Profile table and overload-policy catalog.
//!
//! Every [`Profile`] carries exactly one [`OverloadPolicy`]; the catalog
//! enforces the policy's structural rules at construction (via
//! [`OverloadPolicy::validate`]) rather than trusting callers to keep mode
//! and degrade-class in sync by hand.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, ReasonPointer};

fn reason(site: &'static str) -> ReasonPointer {
    ReasonPointer::new("profile::catalog", site)
}

/// The runtime profile in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// The baseline portable profile.
    Core,
    /// POSIX host profile.
    Posix,
    /// Win32 host profile.
    Win32,
    /// No-OS / bare-metal profile.
    Freestanding,
    /// Embedded router vertical.
    EmbeddedRouter,
    /// High-frequency-trading vertical.
    Hft,
    /// Automotive vertical.
    Automotive,
    /// Optional multi-lane parallel profile.
    Parallel,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Core => "core",
            Self::Posix => "posix",
            Self::Win32 => "win32",
            Self::Freestanding => "freestanding",
            Self::EmbeddedRouter => "embedded-router",
            Self::Hft => "hft",
            Self::Automotive => "automotive",
            Self::Parallel => "parallel",
        };
        write!(f, "{s}")
    }
}

/// The overload-handling strategy a profile commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverloadMode {
    /// Reject new admission outright once the threshold is crossed.
    Reject,
    /// Shed the oldest queued work, up to `shed_max` items per decision.
    ShedOldest,
    /// Apply backpressure to producers instead of shedding or rejecting.
    Backpressure,
}

/// The degradation behavior a policy enters once overloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegradeClass {
    /// No degradation (paired only with `Reject`).
    None,
    /// Shed from the tail of the queue (paired only with `ShedOldest`).
    ShedTail,
    /// Apply backpressure (paired with `Backpressure`).
    Backpressure,
    /// Trip a watchdog (paired with `Backpressure`).
    WatchdogTrip,
}

/// An overload policy: mode, threshold, and the structural fields that must
/// agree with the chosen mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverloadPolicy {
    /// The overload-handling mode.
    pub mode: OverloadMode,
    /// Load percentage (of capacity) at which the mode activates.
    pub threshold_pct: u8,
    /// Maximum items shed per decision; zero outside `ShedOldest`.
    pub shed_max: u32,
    /// The degradation behavior paired with `mode`.
    pub degrade_class: DegradeClass,
    /// Flags this policy forbids a profile from enabling.
    pub forbidden_flags: &'static [&'static str],
    /// A static rationale string for diagnostics/documentation.
    pub rationale: &'static str,
    /// Fixture ids that exercise this policy.
    pub fixture_ids: &'static [&'static str],
    /// True if this policy participates in cross-profile parity proofs.
    pub parity_gate: bool,
}

impl OverloadPolicy {
    /// Validates the structural rules binding `mode` to `shed_max` and
    /// `degrade_class`:
    ///
    /// - `Reject` ⇒ `shed_max == 0` ∧ `degrade_class == None`.
    /// - `ShedOldest` ⇒ `shed_max > 0` ∧ `degrade_class == ShedTail`.
    /// - `Backpressure` ⇒ `shed_max == 0` ∧ `degrade_class ∈ {Backpressure, WatchdogTrip}`.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidState`] if the structural rule is
    /// violated.
    pub fn validate(&self) -> Result<(), Error> {
        let ok = match self.mode {
            OverloadMode::Reject => self.shed_max == 0 && matches!(self.degrade_class, DegradeClass::None),
            OverloadMode::ShedOldest => {
                self.shed_max > 0 && matches!(self.degrade_class, DegradeClass::ShedTail)
            }
            OverloadMode::Backpressure => {
                self.shed_max == 0
                    && matches!(
                        self.degrade_class,
                        DegradeClass::Backpressure | DegradeClass::WatchdogTrip
                    )
            }
        };
        if ok {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::InvalidState, reason("validate")))
        }
    }
}

/// The outcome of evaluating load against an [`OverloadPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadDecision {
    /// Below threshold: admit normally.
    Admit,
    /// At/above threshold under `Reject`: refuse new admission.
    Reject,
    /// At/above threshold under `ShedOldest`: shed up to this many items.
    Shed(u32),
    /// At/above threshold under `Backpressure`: signal producers to slow.
    Backpressure,
}

/// Evaluates `used`/`capacity` load against `policy`, returning the
/// decision. Pure: no side effects, no clock reads.
#[must_use]
pub fn evaluate(policy: &OverloadPolicy, used: u32, capacity: u32) -> OverloadDecision {
    if capacity == 0 {
        return match policy.mode {
            OverloadMode::Reject => OverloadDecision::Reject,
            OverloadMode::ShedOldest => OverloadDecision::Shed(policy.shed_max),
            OverloadMode::Backpressure => OverloadDecision::Backpressure,
        };
    }
    let pct = u64::from(used).saturating_mul(100) / u64::from(capacity);
    if pct < u64::from(policy.threshold_pct) {
        return OverloadDecision::Admit;
    }
    match policy.mode {
        OverloadMode::Reject => OverloadDecision::Reject,
        OverloadMode::ShedOldest => OverloadDecision::Shed(policy.shed_max),
        OverloadMode::Backpressure => OverloadDecision::Backpressure,
    }
}

/// Returns the catalog entry for `profile`.
///
/// `Parallel` inherits `Core`'s policy per the decided Open Question: the
/// parallel profile only commits to digest equivalence with `Core`, not to
/// a distinct overload posture.
#[must_use]
pub const fn policy_for(profile: Profile) -> OverloadPolicy {
    match profile {
        Profile::Core | Profile::Parallel => OverloadPolicy {
            mode: OverloadMode::Reject,
            threshold_pct: 100,
            shed_max: 0,
            degrade_class: DegradeClass::None,
            forbidden_flags: &[],
            rationale: "baseline profile rejects at full capacity, no degradation",
            fixture_ids: &["core-overload-reject"],
            parity_gate: true,
        },
        Profile::Posix | Profile::Win32 => OverloadPolicy {
            mode: OverloadMode::ShedOldest,
            threshold_pct: 90,
            shed_max: 16,
            degrade_class: DegradeClass::ShedTail,
            forbidden_flags: &["no-heap"],
            rationale: "host profiles shed oldest queued work under sustained load",
            fixture_ids: &["host-overload-shed"],
            parity_gate: true,
        },
        Profile::Freestanding | Profile::EmbeddedRouter => OverloadPolicy {
            mode: OverloadMode::Backpressure,
            threshold_pct: 80,
            shed_max: 0,
            degrade_class: DegradeClass::Backpressure,
            forbidden_flags: &["dynamic-alloc"],
            rationale: "fixed-memory profiles apply backpressure rather than shed or grow",
            fixture_ids: &["embedded-overload-backpressure"],
            parity_gate: false,
        },
        Profile::Hft => OverloadPolicy {
            mode: OverloadMode::Reject,
            threshold_pct: 95,
            shed_max: 0,
            degrade_class: DegradeClass::None,
            forbidden_flags: &["shed", "sleep-wait"],
            rationale: "latency-sensitive vertical never sheds or sleeps; rejects outright",
            fixture_ids: &["hft-overload-reject"],
            parity_gate: true,
        },
        Profile::Automotive => OverloadPolicy {
            mode: OverloadMode::Backpressure,
            threshold_pct: 70,
            shed_max: 0,
            degrade_class: DegradeClass::WatchdogTrip,
            forbidden_flags: &["unbounded-retry"],
            rationale: "safety-critical vertical trips a watchdog rather than silently degrading",
            fixture_ids: &["automotive-overload-watchdog"],
            parity_gate: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_entry_validates_structurally() {
        for profile in [
            Profile::Core,
            Profile::Posix,
            Profile::Win32,
            Profile::Freestanding,
            Profile::EmbeddedRouter,
            Profile::Hft,
            Profile::Automotive,
            Profile::Parallel,
        ] {
            policy_for(profile).validate().unwrap_or_else(|e| panic!("{profile}: {e}"));
        }
    }

    #[test]
    fn below_threshold_always_admits() {
        let policy = policy_for(Profile::Posix);
        assert_eq!(evaluate(&policy, 10, 100), OverloadDecision::Admit);
    }

    #[test]
    fn reject_mode_rejects_at_threshold() {
        let policy = policy_for(Profile::Hft);
        assert_eq!(evaluate(&policy, 95, 100), OverloadDecision::Reject);
    }

    #[test]
    fn shed_oldest_mode_sheds_up_to_shed_max() {
        let policy = policy_for(Profile::Posix);
        assert_eq!(evaluate(&policy, 95, 100), OverloadDecision::Shed(16));
    }

    #[test]
    fn backpressure_mode_signals_backpressure() {
        let policy = policy_for(Profile::Automotive);
        assert_eq!(evaluate(&policy, 90, 100), OverloadDecision::Backpressure);
    }

    #[test]
    fn invalid_policy_combination_is_rejected() {
        let bad = OverloadPolicy {
            mode: OverloadMode::Reject,
            threshold_pct: 90,
            shed_max: 5,
            degrade_class: DegradeClass::None,
            forbidden_flags: &[],
            rationale: "",
            fixture_ids: &[],
            parity_gate: false,
        };
        assert_eq!(bad.validate().unwrap_err().kind, ErrorKind::InvalidState);
    }

    #[test]
    fn parallel_inherits_core_policy() {
        assert_eq!(policy_for(Profile::Parallel).mode, policy_for(Profile::Core).mode);
    }
}
