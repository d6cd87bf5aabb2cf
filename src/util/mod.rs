//! Internal utilities for the asx kernel.
//!
//! These utilities are intentionally minimal to preserve determinism:
//! nothing here reaches for wall-clock time, address identity, or
//! unordered-container iteration order.

pub mod arena;
pub mod det_hash;
pub mod det_rng;
pub mod entropy;

pub use arena::{Arena, ArenaIndex, ResourceExhausted as ArenaExhausted, StaleHandle as ArenaStaleHandle};
pub use det_hash::{DetBuildHasher, DetHashMap, DetHashSet, DetHasher};
pub use det_rng::DetRng;
pub use entropy::{DetEntropy, EntropySource, OsEntropy, ThreadLocalEntropy};
