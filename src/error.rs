//! Classified error taxonomy and the per-task propagation ledger.
//!
//! Every fallible kernel operation returns a classified [`Error`] — never a
//! weaker or more generic code than what actually happened — plus a
//! [`ReasonPointer`] identifying where it was raised. There is no
//! `errno`-style global: callers read the returned value.

use core::fmt;

/// Identifies the module and call site that raised an [`Error`].
///
/// Deliberately small and `Copy` so attaching one costs nothing on the hot
/// path; `module` and `site` are static strings baked in at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasonPointer {
    /// The module that raised the error (e.g. `"channel::mpsc"`).
    pub module: &'static str,
    /// A short static tag for the specific call site within the module.
    pub site: &'static str,
}

impl ReasonPointer {
    /// Creates a reason pointer.
    #[must_use]
    pub const fn new(module: &'static str, site: &'static str) -> Self {
        Self { module, site }
    }
}

impl fmt::Display for ReasonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.site)
    }
}

/// The kernel's classified error taxonomy.
///
/// Numeric/variant families are part of the external contract: a variant's
/// meaning never changes once published, and no operation ever masks a
/// specific failure behind a more generic one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    // General
    /// An argument was invalid for the operation.
    #[error("invalid argument")]
    InvalidArgument,
    /// The entity was not in a state that permits the operation.
    #[error("invalid state")]
    InvalidState,
    /// The referenced entity does not exist.
    #[error("not found")]
    NotFound,
    /// The entity already exists.
    #[error("already exists")]
    AlreadyExists,

    // Transition
    /// The requested state transition is not in the authority table.
    #[error("invalid transition")]
    InvalidTransition,

    // Region
    /// No region exists for the given handle.
    #[error("region not found")]
    RegionNotFound,
    /// The region is closed.
    #[error("region closed")]
    RegionClosed,
    /// The region's arena is at capacity.
    #[error("region at capacity")]
    RegionAtCapacity,
    /// The region is not in the `Open` state.
    #[error("region not open")]
    RegionNotOpen,
    /// The region no longer admits new spawns or reservations.
    #[error("admission closed")]
    AdmissionClosed,
    /// The region's admission limit was reached.
    #[error("admission limit reached")]
    AdmissionLimit,

    // Task
    /// No task exists for the given handle.
    #[error("task not found")]
    TaskNotFound,
    /// The scheduler is unavailable (e.g. shutting down).
    #[error("scheduler unavailable")]
    SchedulerUnavailable,
    /// A task with this name already exists in the region.
    #[error("name conflict")]
    NameConflict,
    /// The task has not reached a completed state.
    #[error("task not completed")]
    TaskNotCompleted,
    /// The poll budget was exhausted before reaching quiescence.
    #[error("poll budget exhausted")]
    PollBudgetExhausted,

    // Obligation
    /// The obligation was already resolved (committed or aborted).
    #[error("obligation already resolved")]
    ObligationAlreadyResolved,
    /// One or more obligations remain unresolved.
    #[error("unresolved obligations")]
    UnresolvedObligations,

    // Cancel / witness
    /// The operation target is cancelled.
    #[error("cancelled")]
    Cancelled,
    /// A cancel witness observed a phase regression.
    #[error("witness phase regression")]
    WitnessPhaseRegression,
    /// A cancel witness observed a reason weakening.
    #[error("witness reason weakened")]
    WitnessReasonWeakened,
    /// A cancel witness observed a task mismatch.
    #[error("witness task mismatch")]
    WitnessTaskMismatch,
    /// A cancel witness observed a region mismatch.
    #[error("witness region mismatch")]
    WitnessRegionMismatch,
    /// A cancel witness observed an epoch mismatch.
    #[error("witness epoch mismatch")]
    WitnessEpochMismatch,

    // Channel
    /// The channel is disconnected.
    #[error("disconnected")]
    Disconnected,
    /// The operation would block and no waiting was requested.
    #[error("would block")]
    WouldBlock,
    /// The channel is at capacity.
    #[error("channel full")]
    ChannelFull,
    /// The channel still has undrained messages.
    #[error("channel not drained")]
    ChannelNotDrained,

    // Timer
    /// No timer exists for the given handle.
    #[error("timer not found")]
    TimerNotFound,
    /// Timers are still pending.
    #[error("timers pending")]
    TimersPending,

    // Quiescence
    /// Tasks are still active in the subtree.
    #[error("tasks still active")]
    TasksStillActive,
    /// Obligations remain unresolved in the subtree.
    #[error("obligations unresolved")]
    ObligationsUnresolved,
    /// Regions in the subtree have not closed.
    #[error("regions not closed")]
    RegionsNotClosed,
    /// Children of the subtree have not all reached a terminal state.
    #[error("incomplete children")]
    IncompleteChildren,
    /// Quiescence has not been reached.
    #[error("quiescence not reached")]
    QuiescenceNotReached,
    /// Live tasks remain, blocking quiescence.
    #[error("quiescence tasks live")]
    QuiescenceTasksLive,

    // Resource / runtime
    /// A fixed-capacity resource was exhausted.
    #[error("resource exhausted")]
    ResourceExhausted,
    /// A handle did not resolve to a live value at its captured generation.
    #[error("stale handle")]
    StaleHandle,
    /// A platform hook required by the active profile is missing.
    #[error("hook missing")]
    HookMissing,
    /// A platform hook failed its self-check.
    #[error("hook invalid")]
    HookInvalid,
    /// A determinism invariant was violated.
    #[error("determinism violation")]
    DeterminismViolation,
    /// The allocator is sealed and cannot grow.
    #[error("allocator sealed")]
    AllocatorSealed,
}

/// A classified error plus the call site that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {reason}")]
pub struct Error {
    /// The classified error code.
    pub kind: ErrorKind,
    /// Where the error was raised.
    pub reason: ReasonPointer,
}

impl Error {
    /// Builds an error from a kind and a reason pointer.
    #[must_use]
    pub const fn new(kind: ErrorKind, reason: ReasonPointer) -> Self {
        Self { kind, reason }
    }
}

/// Convenience alias for kernel results.
pub type Result<T> = core::result::Result<T, Error>;

/// Fixed-capacity ring recording the last `N` propagated errors for a task.
///
/// Purely observational: nothing reads this ledger to make control-flow
/// decisions. [`record_error`](ErrorLedger::record) is the single writer
/// every propagation path funnels through, matching the "no macro that
/// bypasses the ledger" requirement.
#[derive(Debug, Clone)]
pub struct ErrorLedger {
    ring: Vec<Error>,
    capacity: usize,
    next: usize,
    overflowed: bool,
}

impl ErrorLedger {
    /// Creates a ledger with the given fixed capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
            next: 0,
            overflowed: false,
        }
    }

    /// Records a propagated error, overwriting the oldest entry once full.
    pub fn record(&mut self, error: Error) {
        if self.ring.len() < self.capacity {
            self.ring.push(error);
        } else {
            self.ring[self.next] = error;
            self.overflowed = true;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    /// True if the ledger has wrapped and discarded entries.
    #[must_use]
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// The recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Error] {
        &self.ring
    }

    /// The most recently recorded error, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Error> {
        self.ring.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(kind: ErrorKind) -> Error {
        Error::new(kind, ReasonPointer::new("test", "site"))
    }

    #[test]
    fn ledger_records_in_order_until_full() {
        let mut ledger = ErrorLedger::new(2);
        ledger.record(err(ErrorKind::InvalidArgument));
        ledger.record(err(ErrorKind::NotFound));
        assert!(!ledger.overflowed());
        assert_eq!(ledger.entries().len(), 2);
        assert_eq!(ledger.last().unwrap().kind, ErrorKind::NotFound);
    }

    #[test]
    fn ledger_overwrites_oldest_on_overflow() {
        let mut ledger = ErrorLedger::new(2);
        ledger.record(err(ErrorKind::InvalidArgument));
        ledger.record(err(ErrorKind::NotFound));
        ledger.record(err(ErrorKind::StaleHandle));
        assert!(ledger.overflowed());
        assert_eq!(ledger.entries().len(), 2);
    }

    #[test]
    fn error_display_includes_reason() {
        let e = err(ErrorKind::ChannelFull);
        let text = format!("{e}");
        assert!(text.contains("channel full"));
        assert!(text.contains("test::site"));
    }
}
