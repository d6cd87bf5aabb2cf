//! Bounded ring of canonical events with digest export.
//!
//! Mirrors the overwrite-oldest ring idiom of [`crate::error::ErrorLedger`],
//! sized per resource class rather than per task.

use crate::trace::digest::{Digest, DigestAccumulator};
use crate::trace::event::CanonicalEvent;

/// A snapshot of a [`TraceRing`]'s contents: the retained events plus their
/// digest, exported together so a digest is never quoted against an event
/// list it wasn't folded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceExport {
    /// The retained events, oldest first.
    pub events: Vec<CanonicalEvent>,
    /// The digest folded over exactly `events`, in order.
    pub digest: Digest,
    /// True if older events were overwritten and are absent from `events`.
    pub truncated: bool,
}

/// A fixed-capacity, overwrite-oldest ring of canonical events.
#[derive(Debug, Clone)]
pub struct TraceRing {
    ring: Vec<CanonicalEvent>,
    capacity: usize,
    next: usize,
    truncated: bool,
}

impl TraceRing {
    /// Creates an empty ring with the given fixed capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
            next: 0,
            truncated: false,
        }
    }

    /// Appends one event, overwriting the oldest once full.
    pub fn push(&mut self, event: CanonicalEvent) {
        if self.ring.len() < self.capacity {
            self.ring.push(event);
        } else {
            self.ring[self.next] = event;
            self.truncated = true;
            self.next = (self.next + 1) % self.capacity;
            return;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    /// The ring's fixed capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of events currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// True if no events have been pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// True if the ring has wrapped and discarded events.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// The retained events in push order, oldest first.
    ///
    /// Once the ring has wrapped, `next` marks the oldest surviving entry;
    /// before that, entries are already in push order.
    #[must_use]
    pub fn events_oldest_first(&self) -> Vec<CanonicalEvent> {
        if !self.truncated {
            return self.ring.clone();
        }
        let mut ordered = Vec::with_capacity(self.ring.len());
        ordered.extend_from_slice(&self.ring[self.next..]);
        ordered.extend_from_slice(&self.ring[..self.next]);
        ordered
    }

    /// Exports the ring's current contents and their digest together.
    #[must_use]
    pub fn export(&self) -> TraceExport {
        let events = self.events_oldest_first();
        let mut acc = DigestAccumulator::new();
        acc.fold_all(&events);
        TraceExport {
            events,
            digest: acc.finalize(),
            truncated: self.truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::RegionState;
    use crate::types::{RegionId, Time};

    fn region_event(index: u32) -> CanonicalEvent {
        CanonicalEvent::RegionTransition {
            at: Time::from_nanos(u64::from(index)),
            region: RegionId::new_for_test(index, 0),
            state: RegionState::Open,
        }
    }

    #[test]
    fn export_matches_pushed_events_when_not_full() {
        let mut ring = TraceRing::new(4);
        ring.push(region_event(1));
        ring.push(region_event(2));
        let export = ring.export();
        assert_eq!(export.events.len(), 2);
        assert!(!export.truncated);
    }

    #[test]
    fn ring_overwrites_oldest_and_preserves_order() {
        let mut ring = TraceRing::new(2);
        ring.push(region_event(1));
        ring.push(region_event(2));
        ring.push(region_event(3));
        let export = ring.export();
        assert!(export.truncated);
        assert_eq!(export.events, vec![region_event(2), region_event(3)]);
    }

    #[test]
    fn export_digest_matches_direct_fold_of_retained_events() {
        let mut ring = TraceRing::new(8);
        ring.push(region_event(1));
        ring.push(region_event(2));
        let export = ring.export();
        let direct = crate::trace::digest::digest_events(&export.events);
        assert_eq!(export.digest, direct);
    }
}
