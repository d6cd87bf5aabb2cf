//! Hierarchical timer wheel with insertion-stable firing order and O(1)
//! generation-validated cancel.
//!
//! This is an original design, modeled on the classic multi-level timing
//! wheel: each level covers a wider tick range at coarser granularity, and
//! timers are cascaded into finer levels as their remaining tolerance
//! narrows. Each bucket is an intrusive doubly-linked list threaded through
//! arena slots, so cancel unlinks in O(1) without scanning the bucket.

use crate::types::TimerId;
use crate::util::arena::{Arena, ResourceExhausted, StaleHandle};
use crate::util::ArenaIndex;

/// Number of hierarchy levels.
const LEVELS: usize = 4;
/// Bits of tick index covered by one level (64 slots per level).
const BITS_PER_LEVEL: u32 = 6;
/// Slots per level.
const SLOTS_PER_LEVEL: usize = 1 << BITS_PER_LEVEL;
/// Mask selecting a level's slot bits.
const LEVEL_MASK: u64 = (SLOTS_PER_LEVEL as u64) - 1;
/// Largest tick offset representable without clamping into the top level.
const MAX_TICK_SPAN: u64 = (1u64 << (BITS_PER_LEVEL * LEVELS as u32)) - 1;

#[derive(Debug)]
struct Entry {
    deadline: u64,
    /// Insertion sequence, used as the stable tie-break at equal deadlines.
    seq: u64,
    level: usize,
    slot: usize,
    prev: Option<ArenaIndex>,
    next: Option<ArenaIndex>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    head: Option<ArenaIndex>,
    tail: Option<ArenaIndex>,
}

/// A hierarchical timer wheel over arena-backed, intrusively-linked entries.
#[derive(Debug)]
pub struct TimerWheel {
    entries: Arena<Entry>,
    levels: [Vec<Bucket>; LEVELS],
    current_tick: u64,
    next_seq: u64,
}

impl TimerWheel {
    /// Creates an empty wheel with a fixed timer-slot capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arena::with_capacity(capacity),
            levels: std::array::from_fn(|_| vec![Bucket::default(); SLOTS_PER_LEVEL]),
            current_tick: 0,
            next_seq: 0,
        }
    }

    /// The wheel's current tick (its notion of "now").
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.current_tick
    }

    fn level_and_slot(&self, deadline: u64) -> (usize, usize) {
        let span = deadline.saturating_sub(self.current_tick).min(MAX_TICK_SPAN);
        for level in 0..LEVELS {
            let level_span = 1u64 << (BITS_PER_LEVEL * (level as u32 + 1));
            if span < level_span || level == LEVELS - 1 {
                let slot = ((deadline >> (BITS_PER_LEVEL * level as u32)) & LEVEL_MASK) as usize;
                return (level, slot);
            }
        }
        unreachable!("loop always returns by level == LEVELS - 1")
    }

    fn link(&mut self, level: usize, slot: usize, index: ArenaIndex) {
        let bucket = &mut self.levels[level][slot];
        let old_tail = bucket.tail;
        if let Some(tail) = old_tail {
            if let Ok(tail_entry) = self.entries.get_mut(tail) {
                tail_entry.next = Some(index);
            }
        } else {
            bucket.head = Some(index);
        }
        bucket.tail = Some(index);
    }

    fn unlink(&mut self, level: usize, slot: usize, index: ArenaIndex) {
        let (prev, next) = match self.entries.get(index) {
            Ok(entry) => (entry.prev, entry.next),
            Err(_) => return,
        };
        match prev {
            Some(p) => {
                if let Ok(e) = self.entries.get_mut(p) {
                    e.next = next;
                }
            }
            None => self.levels[level][slot].head = next,
        }
        match next {
            Some(n) => {
                if let Ok(e) = self.entries.get_mut(n) {
                    e.prev = prev;
                }
            }
            None => self.levels[level][slot].tail = prev,
        }
    }

    /// Registers a timer at the given absolute deadline tick.
    ///
    /// # Errors
    /// Returns [`ResourceExhausted`] if the entry arena is at capacity; no
    /// partial mutation occurs.
    pub fn register(&mut self, deadline: u64) -> Result<TimerId, ResourceExhausted> {
        let (level, slot) = self.level_and_slot(deadline);
        let seq = self.next_seq;
        let index = self.entries.insert(Entry {
            deadline,
            seq,
            level,
            slot,
            prev: None,
            next: None,
        })?;
        self.next_seq += 1;
        self.link(level, slot, index);
        Ok(TimerId::from_arena(index))
    }

    /// Cancels a previously registered timer in O(1): validates the
    /// handle's generation, unlinks it from its bucket, and releases its
    /// slot (bumping the generation so the handle is permanently stale).
    ///
    /// # Errors
    /// Returns [`StaleHandle`] if the timer does not currently resolve
    /// (already fired, already cancelled, or a generation mismatch).
    pub fn cancel(&mut self, id: TimerId) -> Result<(), StaleHandle> {
        let index = id.arena_index();
        let (level, slot) = match self.entries.get(index) {
            Ok(entry) => (entry.level, entry.slot),
            Err(e) => return Err(e),
        };
        self.unlink(level, slot, index);
        self.entries.remove(index)?;
        Ok(())
    }

    /// Cascades every entry in `level`'s bucket at `slot` down into finer
    /// levels (or level 0, which is collected by the caller).
    fn cascade(&mut self, level: usize, slot: usize) {
        let mut current = self.levels[level][slot].head;
        self.levels[level][slot] = Bucket::default();
        while let Some(index) = current {
            let next = self.entries.get(index).ok().and_then(|e| e.next);
            if let Ok(entry) = self.entries.get_mut(index) {
                entry.prev = None;
                entry.next = None;
                let deadline = entry.deadline;
                let (new_level, new_slot) = self.level_and_slot(deadline);
                if let Ok(entry) = self.entries.get_mut(index) {
                    entry.level = new_level;
                    entry.slot = new_slot;
                }
                self.link(new_level, new_slot, index);
            }
            current = next;
        }
    }

    /// Advances the wheel to `now` and collects every timer with
    /// `deadline <= now`, in deterministic `(bucket order, insertion order)`
    /// sequence, removing them from the wheel.
    ///
    /// Entries registered at the same tick after this call returns for that
    /// tick are not retroactively included — the collection point is fixed
    /// before any new registration is observed.
    pub fn collect_expired(&mut self, now: u64) -> Vec<TimerId> {
        let mut fired = Vec::new();
        while self.current_tick <= now {
            let tick = self.current_tick;
            // Cascade coarser levels into finer ones whenever their slot
            // for this tick is reached, from the top down so entries land
            // in their final, now-correct level before level 0 is drained.
            for level in (1..LEVELS).rev() {
                let slot = ((tick >> (BITS_PER_LEVEL * level as u32)) & LEVEL_MASK) as usize;
                let boundary = tick & ((1u64 << (BITS_PER_LEVEL * level as u32)) - 1) == 0;
                if boundary {
                    self.cascade(level, slot);
                }
            }

            let slot0 = (tick & LEVEL_MASK) as usize;
            let mut current = self.levels[0][slot0].head;
            self.levels[0][slot0] = Bucket::default();
            let mut batch = Vec::new();
            while let Some(index) = current {
                let next = self.entries.get(index).ok().and_then(|e| e.next);
                if let Ok(entry) = self.entries.get(index) {
                    batch.push((entry.seq, index));
                }
                current = next;
            }
            batch.sort_by_key(|(seq, _)| *seq);
            for (_, index) in batch {
                if let Ok(entry) = self.entries.remove(index) {
                    let _ = entry;
                    fired.push(TimerId::from_arena(index));
                }
            }

            if self.current_tick == now {
                break;
            }
            self.current_tick += 1;
        }
        self.current_tick = now;
        fired
    }

    /// Number of timers currently armed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no timers are armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_deadline_timers_fire_in_insertion_order() {
        let mut wheel = TimerWheel::with_capacity(16);
        let t1 = wheel.register(100).unwrap();
        let t2 = wheel.register(100).unwrap();
        let t3 = wheel.register(100).unwrap();
        let fired = wheel.collect_expired(100);
        assert_eq!(fired, vec![t1, t2, t3]);
    }

    #[test]
    fn cancel_before_tick_removes_and_stales_handle() {
        let mut wheel = TimerWheel::with_capacity(16);
        let t1 = wheel.register(100).unwrap();
        let t2 = wheel.register(100).unwrap();
        let t3 = wheel.register(100).unwrap();
        wheel.cancel(t2).unwrap();
        let fired = wheel.collect_expired(100);
        assert_eq!(fired, vec![t1, t3]);
        assert_eq!(wheel.cancel(t2), Err(StaleHandle));
    }

    #[test]
    fn timers_do_not_fire_before_their_deadline() {
        let mut wheel = TimerWheel::with_capacity(16);
        let t1 = wheel.register(50).unwrap();
        let fired = wheel.collect_expired(10);
        assert!(fired.is_empty());
        let fired = wheel.collect_expired(50);
        assert_eq!(fired, vec![t1]);
    }

    #[test]
    fn far_future_timer_cascades_down_and_fires() {
        let mut wheel = TimerWheel::with_capacity(16);
        // Beyond level 0's range; exercises cascading through coarser levels.
        let deadline = 10_000;
        let t1 = wheel.register(deadline).unwrap();
        let fired = wheel.collect_expired(deadline);
        assert_eq!(fired, vec![t1]);
    }

    #[test]
    fn exhaustion_returns_resource_exhausted_with_no_partial_mutation() {
        let mut wheel = TimerWheel::with_capacity(1);
        wheel.register(10).unwrap();
        assert_eq!(wheel.register(20), Err(ResourceExhausted));
        assert_eq!(wheel.len(), 1);
    }

    #[test]
    fn registering_after_collection_point_is_not_retroactively_included() {
        let mut wheel = TimerWheel::with_capacity(16);
        let t1 = wheel.register(100).unwrap();
        let fired = wheel.collect_expired(100);
        assert_eq!(fired, vec![t1]);
        // A new timer at the same already-collected tick is a separate
        // registration and only fires on a later collect_expired call.
        let t2 = wheel.register(100).unwrap();
        assert_eq!(wheel.collect_expired(100), vec![t2]);
    }
}
