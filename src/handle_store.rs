//! Generation-safe handle store: thin typed wrapper over [`Arena`].
//!
//! This is the single place that turns a raw [`ArenaIndex`] into the
//! allocate/resolve/release vocabulary every entity-specific record store
//! (region, task, obligation, timer, channel) is built on.

use crate::util::arena::{Arena, ResourceExhausted, StaleHandle};
use crate::util::ArenaIndex;

/// A fixed-capacity, generation-validated store of `T` values.
///
/// Wraps [`Arena<T>`] rather than re-implementing it: the handle store's
/// job is naming (`allocate`/`resolve`/`release`), not a different data
/// structure.
#[derive(Debug)]
pub struct HandleStore<T> {
    arena: Arena<T>,
}

impl<T> HandleStore<T> {
    /// Creates a handle store with a fixed capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
        }
    }

    /// Allocates a slot holding `value`, returning its index.
    ///
    /// # Errors
    /// Returns [`ResourceExhausted`] if the arena is at capacity; no
    /// mutation occurs on failure.
    pub fn allocate(&mut self, value: T) -> Result<ArenaIndex, ResourceExhausted> {
        self.arena.insert(value)
    }

    /// Resolves an index to a shared reference, validating its generation.
    ///
    /// # Errors
    /// Returns [`StaleHandle`] if the index is out of bounds or its
    /// generation does not match the live occupant.
    pub fn resolve(&self, index: ArenaIndex) -> Result<&T, StaleHandle> {
        self.arena.get(index)
    }

    /// Resolves an index to a mutable reference, validating its generation.
    ///
    /// # Errors
    /// Returns [`StaleHandle`] if the index is out of bounds or its
    /// generation does not match the live occupant.
    pub fn resolve_mut(&mut self, index: ArenaIndex) -> Result<&mut T, StaleHandle> {
        self.arena.get_mut(index)
    }

    /// Releases a slot, bumping its generation so the returned index is
    /// permanently stale, and returns the released value.
    ///
    /// # Errors
    /// Returns [`StaleHandle`] if the index does not currently resolve.
    pub fn release(&mut self, index: ArenaIndex) -> Result<T, StaleHandle> {
        self.arena.remove(index)
    }

    /// True if `index` currently resolves to a live value.
    #[must_use]
    pub fn contains(&self, index: ArenaIndex) -> bool {
        self.arena.contains(index)
    }

    /// Number of live occupants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True if no occupants are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Iterates over `(index, value)` pairs for all live occupants, in
    /// index order (deterministic, never dependent on allocation order).
    pub fn iter(&self) -> impl Iterator<Item = (ArenaIndex, &T)> {
        self.arena.iter()
    }
}
