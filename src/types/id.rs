//! Identifier types for runtime entities.
//!
//! These types wrap [`ArenaIndex`] with type safety so a `TaskId` can never
//! be mistaken for a `TimerId`, even though both are packed handles over the
//! same underlying representation.

use crate::util::ArenaIndex;
use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Add;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SerdeArenaIndex {
    index: u32,
    generation: u32,
}

impl SerdeArenaIndex {
    const fn to_arena(self) -> ArenaIndex {
        ArenaIndex::new(self.index, self.generation)
    }
}

impl From<ArenaIndex> for SerdeArenaIndex {
    fn from(value: ArenaIndex) -> Self {
        Self {
            index: value.index(),
            generation: value.generation(),
        }
    }
}

macro_rules! arena_id {
    ($name:ident, $prefix:literal) => {
        #[doc = concat!("A unique identifier for a ", $prefix, " entity.")]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) ArenaIndex);

        impl $name {
            /// Wraps an arena index (internal use).
            #[inline]
            #[must_use]
            #[cfg_attr(feature = "test-internals", visibility::make(pub))]
            pub(crate) const fn from_arena(index: ArenaIndex) -> Self {
                Self(index)
            }

            /// Returns the underlying arena index (internal use).
            #[inline]
            #[must_use]
            #[cfg_attr(feature = "test-internals", visibility::make(pub))]
            pub(crate) const fn arena_index(self) -> ArenaIndex {
                self.0
            }

            /// Creates an identifier for testing/benchmarking purposes.
            #[doc(hidden)]
            #[must_use]
            pub const fn new_for_test(index: u32, generation: u32) -> Self {
                Self(ArenaIndex::new(index, generation))
            }
        }

        impl fmt::Debug for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}:{})", stringify!($name), self.0.index(), self.0.generation())
            }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0.index())
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                SerdeArenaIndex::from(self.0).serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let idx = SerdeArenaIndex::deserialize(deserializer)?;
                Ok(Self(idx.to_arena()))
            }
        }
    };
}

arena_id!(RegionId, "R");
arena_id!(TaskId, "T");
arena_id!(ObligationId, "O");
arena_id!(TimerId, "Tm");
arena_id!(ChannelId, "Ch");

/// A logical monotonic timestamp, measured in nanoseconds.
///
/// In production this tracks a [`crate::platform::MonotonicClock`]; in
/// deterministic mode it is advanced only by the scheduler's own tick
/// bookkeeping, never by wall-clock reads.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Time(u64);

impl Time {
    /// The zero instant (epoch).
    pub const ZERO: Self = Self(0);

    /// The maximum representable instant.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a time from nanoseconds since epoch.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Creates a time from milliseconds since epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// Creates a time from seconds since epoch.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1_000_000_000))
    }

    /// Returns the time as nanoseconds since epoch.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Returns the time as milliseconds since epoch (truncated).
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0 / 1_000_000
    }

    /// Returns the time as seconds since epoch (truncated).
    #[inline]
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0 / 1_000_000_000
    }

    /// Adds a duration in nanoseconds, saturating on overflow.
    #[inline]
    #[must_use]
    pub const fn saturating_add_nanos(self, nanos: u64) -> Self {
        Self(self.0.saturating_add(nanos))
    }

    /// Subtracts a duration in nanoseconds, saturating at zero.
    #[inline]
    #[must_use]
    pub const fn saturating_sub_nanos(self, nanos: u64) -> Self {
        Self(self.0.saturating_sub(nanos))
    }

    /// Returns the duration between two times in nanoseconds, saturating at
    /// zero if `self` precedes `earlier`.
    #[inline]
    #[must_use]
    pub const fn duration_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        let nanos: u64 = rhs.as_nanos().min(u128::from(u64::MAX)) as u64;
        self.saturating_add_nanos(nanos)
    }
}

impl fmt::Debug for Time {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Time({}ns)", self.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 1_000_000_000 {
            write!(
                f,
                "{}.{:03}s",
                self.0 / 1_000_000_000,
                (self.0 / 1_000_000) % 1000
            )
        } else if self.0 >= 1_000_000 {
            write!(f, "{}ms", self.0 / 1_000_000)
        } else if self.0 >= 1_000 {
            write!(f, "{}us", self.0 / 1_000)
        } else {
            write!(f, "{}ns", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_conversions() {
        assert_eq!(Time::from_secs(1).as_nanos(), 1_000_000_000);
        assert_eq!(Time::from_millis(1).as_nanos(), 1_000_000);
        assert_eq!(Time::from_nanos(1).as_nanos(), 1);
    }

    #[test]
    fn time_ordering() {
        assert!(Time::from_secs(1) < Time::from_secs(2));
        assert!(Time::from_millis(1000) == Time::from_secs(1));
    }

    #[test]
    fn region_id_display_format() {
        let id = RegionId::new_for_test(42, 0);
        assert_eq!(format!("{id}"), "R42");
    }

    #[test]
    fn task_id_equality_and_generation() {
        let a = TaskId::new_for_test(1, 2);
        let b = TaskId::new_for_test(1, 2);
        let c = TaskId::new_for_test(1, 3);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn timer_id_display_format() {
        let id = TimerId::new_for_test(3, 0);
        assert_eq!(format!("{id}"), "Tm3");
    }

    #[test]
    fn channel_id_display_format() {
        let id = ChannelId::new_for_test(1, 0);
        assert_eq!(format!("{id}"), "Ch1");
    }

    #[test]
    fn region_id_serde_roundtrip() {
        let id = RegionId::new_for_test(99, 7);
        let json = serde_json::to_string(&id).expect("serialize");
        let deserialized: RegionId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, deserialized);
    }

    #[test]
    fn time_saturating_add_overflow() {
        let t = Time::MAX;
        assert_eq!(t.saturating_add_nanos(1), Time::MAX);
    }

    #[test]
    fn time_duration_since_saturates() {
        let early = Time::from_secs(1);
        let late = Time::from_secs(5);
        assert_eq!(late.duration_since(early), 4_000_000_000);
        assert_eq!(early.duration_since(late), 0);
    }
}
