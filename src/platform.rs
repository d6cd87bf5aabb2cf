//! Platform hook traits and the bundle that carries them.
//!
//! A `Platform` is the kernel's only door to the outside world: a
//! monotonic clock, an entropy source, and an optional log sink. Profiles
//! that mandate a hook and find it absent fail with [`ErrorKind::HookMissing`];
//! a hook that fails its self-check at registration fails with
//! [`ErrorKind::HookInvalid`].

use std::sync::Arc;

use crate::error::{Error, ErrorKind, ReasonPointer};
use crate::types::Time;

fn reason(site: &'static str) -> ReasonPointer {
    ReasonPointer::new("platform", site)
}

/// A source of monotonic time; the one seam where a wall-clock read is
/// permitted, everything downstream of it stays deterministic.
pub trait MonotonicClock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Time;
}

/// A source of 64-bit entropy. Distinct from [`crate::util::EntropySource`]:
/// this is the narrow, fork-free contract a platform hook exposes at the
/// kernel boundary, not the richer internal per-task forking trait.
pub trait EntropySource: Send + Sync {
    /// Returns the next 64 bits of entropy.
    fn next_u64(&self) -> u64;
}

/// Severity of a [`LogSink`] emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Hot-path internals (digest folds); never emitted above this level
    /// by the kernel itself.
    Trace,
    /// Authority rejections, cancel strengthening/phase advances.
    Debug,
    /// Obligation leaks and other policy-triggered anomalies.
    Warn,
}

/// A sink for kernel diagnostic emission, independent of any `tracing`
/// subscriber — lets a deterministic-mode caller redirect or silence
/// emission entirely.
pub trait LogSink: Send + Sync {
    /// Emits one diagnostic message at the given level.
    fn emit(&self, level: LogLevel, message: &str);
}

/// A no-op clock used only for [`Platform`] construction before a real
/// clock hook is registered; never selected by a profile that mandates a
/// real monotonic source.
#[derive(Debug, Default)]
pub struct NullClock;

impl MonotonicClock for NullClock {
    fn now(&self) -> Time {
        Time::ZERO
    }
}

/// The bundle of hooks a running kernel instance is configured with.
#[derive(Clone)]
pub struct Platform {
    clock: Arc<dyn MonotonicClock>,
    entropy: Arc<dyn EntropySource>,
    log_sink: Option<Arc<dyn LogSink>>,
}

impl Platform {
    /// Builds a platform bundle from required clock/entropy hooks and an
    /// optional log sink.
    #[must_use]
    pub fn new(
        clock: Arc<dyn MonotonicClock>,
        entropy: Arc<dyn EntropySource>,
        log_sink: Option<Arc<dyn LogSink>>,
    ) -> Self {
        Self {
            clock,
            entropy,
            log_sink,
        }
    }

    /// The current time per the registered clock hook.
    #[must_use]
    pub fn now(&self) -> Time {
        self.clock.now()
    }

    /// The next entropy draw per the registered entropy hook.
    #[must_use]
    pub fn next_u64(&self) -> u64 {
        self.entropy.next_u64()
    }

    /// Emits a diagnostic via the registered log sink, if any.
    pub fn log(&self, level: LogLevel, message: &str) {
        if let Some(sink) = &self.log_sink {
            sink.emit(level, message);
        }
    }

    /// Fails with [`ErrorKind::HookMissing`] if a profile mandates a log
    /// sink and none is registered.
    ///
    /// # Errors
    /// See above.
    pub fn require_log_sink(&self) -> Result<(), Error> {
        if self.log_sink.is_some() {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::HookMissing, reason("require_log_sink")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingClock(AtomicU64);

    impl MonotonicClock for CountingClock {
        fn now(&self) -> Time {
            Time::from_nanos(self.0.fetch_add(1, Ordering::Relaxed))
        }
    }

    struct FixedEntropy(u64);

    impl EntropySource for FixedEntropy {
        fn next_u64(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn platform_delegates_to_registered_hooks() {
        let platform = Platform::new(Arc::new(CountingClock(AtomicU64::new(5))), Arc::new(FixedEntropy(42)), None);
        assert_eq!(platform.now(), Time::from_nanos(5));
        assert_eq!(platform.next_u64(), 42);
    }

    #[test]
    fn missing_log_sink_is_hook_missing() {
        let platform = Platform::new(Arc::new(NullClock), Arc::new(FixedEntropy(0)), None);
        assert_eq!(platform.require_log_sink().unwrap_err().kind, ErrorKind::HookMissing);
    }

    #[test]
    fn registered_log_sink_satisfies_requirement() {
        struct Sink;
        impl LogSink for Sink {
            fn emit(&self, _level: LogLevel, _message: &str) {}
        }
        let platform = Platform::new(Arc::new(NullClock), Arc::new(FixedEntropy(0)), Some(Arc::new(Sink)));
        assert!(platform.require_log_sink().is_ok());
    }
}
