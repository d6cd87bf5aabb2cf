//! Rolling semantic digest over a stream of canonical events.
//!
//! Folding is big-endian and field-order-fixed per event tag, so two
//! kernels on different host byte orders fold to the same digest given the
//! same event stream — the only cross-platform contract the kernel makes.
//! The folding idiom mirrors the deterministic hasher in `util::det_hash`,
//! but wraps `sha2` rather than a fixed-seed FNV-like hasher, since the
//! digest is an external `sha256:<64 hex>` artifact, not an internal
//! hash-map key.

use core::fmt;

use sha2::{Digest as _, Sha256};

use crate::trace::event::CanonicalEvent;
use crate::types::CancelPhase;
use crate::util::ArenaIndex;

/// A finalized `sha256:<64 hex>` semantic digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(String);

impl Digest {
    /// The canonical `sha256:<64 hex>` string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Folds a stream of [`CanonicalEvent`]s into a single [`Digest`].
#[derive(Default)]
pub struct DigestAccumulator {
    hasher: Sha256,
}

fn fold_index(hasher: &mut Sha256, idx: ArenaIndex) {
    hasher.update(idx.index().to_be_bytes());
    hasher.update(idx.generation().to_be_bytes());
}

fn fold_phase(hasher: &mut Sha256, phase: CancelPhase) {
    hasher.update([phase as u8]);
}

impl DigestAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self { hasher: Sha256::new() }
    }

    /// Folds one event into the running digest.
    pub fn fold(&mut self, event: &CanonicalEvent) {
        self.hasher.update([event.tag()]);
        self.hasher.update(event.at().as_nanos().to_be_bytes());

        match event {
            CanonicalEvent::RegionTransition { region, state, .. } => {
                fold_index(&mut self.hasher, region.arena_index());
                self.hasher.update([region_state_tag(*state)]);
            }
            CanonicalEvent::TaskTransition { task, state, .. } => {
                fold_index(&mut self.hasher, task.arena_index());
                self.hasher.update([task_state_tag(*state)]);
            }
            CanonicalEvent::ObligationTransition { obligation, state, .. } => {
                fold_index(&mut self.hasher, obligation.arena_index());
                self.hasher.update([obligation_state_tag(*state)]);
            }
            CanonicalEvent::CancelPhaseAdvanced { task, region, phase, .. } => {
                self.hasher.update([u8::from(task.is_some())]);
                if let Some(task) = task {
                    fold_index(&mut self.hasher, task.arena_index());
                }
                fold_index(&mut self.hasher, region.arena_index());
                fold_phase(&mut self.hasher, *phase);
            }
            CanonicalEvent::TimerArmed { timer, deadline, .. } => {
                fold_index(&mut self.hasher, timer.arena_index());
                self.hasher.update(deadline.as_nanos().to_be_bytes());
            }
            CanonicalEvent::TimerFired { timer, .. } | CanonicalEvent::TimerCancelled { timer, .. } => {
                fold_index(&mut self.hasher, timer.arena_index());
            }
            CanonicalEvent::ChannelReserved { channel, .. }
            | CanonicalEvent::ChannelSent { channel, .. }
            | CanonicalEvent::ChannelAborted { channel, .. }
            | CanonicalEvent::ChannelReceived { channel, .. } => {
                fold_index(&mut self.hasher, channel.arena_index());
            }
            CanonicalEvent::ChannelClosed { channel, sender_side, .. } => {
                fold_index(&mut self.hasher, channel.arena_index());
                self.hasher.update([u8::from(*sender_side)]);
            }
            CanonicalEvent::SchedulerPolled { task, poll_count, .. } => {
                fold_index(&mut self.hasher, task.arena_index());
                self.hasher.update(poll_count.to_be_bytes());
            }
            CanonicalEvent::SchedulerCompleted { task, .. } => {
                fold_index(&mut self.hasher, task.arena_index());
            }
        }
    }

    /// Folds every event in `events`, in order.
    pub fn fold_all<'a>(&mut self, events: impl IntoIterator<Item = &'a CanonicalEvent>) {
        for event in events {
            self.fold(event);
        }
    }

    /// Consumes the accumulator, producing the final digest.
    #[must_use]
    pub fn finalize(self) -> Digest {
        let bytes = self.hasher.finalize();
        let mut hex = String::with_capacity(7 + bytes.len() * 2);
        hex.push_str("sha256:");
        for byte in bytes {
            use core::fmt::Write as _;
            let _ = write!(hex, "{byte:02x}");
        }
        Digest(hex)
    }
}

const fn region_state_tag(state: crate::authority::RegionState) -> u8 {
    use crate::authority::RegionState as R;
    match state {
        R::Open => 0,
        R::Closing => 1,
        R::Draining => 2,
        R::Finalizing => 3,
        R::Closed => 4,
    }
}

const fn task_state_tag(state: crate::authority::TaskState) -> u8 {
    use crate::authority::TaskState as T;
    match state {
        T::Created => 0,
        T::Running => 1,
        T::CancelRequested => 2,
        T::Cancelling => 3,
        T::Finalizing => 4,
        T::Completed => 5,
    }
}

const fn obligation_state_tag(state: crate::authority::ObligationState) -> u8 {
    use crate::authority::ObligationState as O;
    match state {
        O::Reserved => 0,
        O::Committed => 1,
        O::Aborted => 2,
        O::Leaked => 3,
    }
}

/// Folds a full event slice into a single digest in one call.
#[must_use]
pub fn digest_events(events: &[CanonicalEvent]) -> Digest {
    let mut acc = DigestAccumulator::new();
    acc.fold_all(events);
    acc.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RegionId, Time};

    #[test]
    fn same_event_stream_yields_same_digest() {
        let events = vec![CanonicalEvent::RegionTransition {
            at: Time::ZERO,
            region: RegionId::new_for_test(1, 0),
            state: crate::authority::RegionState::Open,
        }];
        assert_eq!(digest_events(&events), digest_events(&events));
    }

    #[test]
    fn different_event_order_yields_different_digest() {
        let a = CanonicalEvent::RegionTransition {
            at: Time::ZERO,
            region: RegionId::new_for_test(1, 0),
            state: crate::authority::RegionState::Open,
        };
        let b = CanonicalEvent::RegionTransition {
            at: Time::from_secs(1),
            region: RegionId::new_for_test(1, 0),
            state: crate::authority::RegionState::Closing,
        };
        let forward = digest_events(&[a.clone(), b.clone()]);
        let backward = digest_events(&[b, a]);
        assert_ne!(forward, backward);
    }

    #[test]
    fn digest_has_sha256_prefix_and_64_hex_chars() {
        let digest = digest_events(&[]);
        assert!(digest.as_str().starts_with("sha256:"));
        assert_eq!(digest.as_str().len(), "sha256:".len() + 64);
    }
}
