//! Task outcome and its severity lattice.
//!
//! A task's outcome only ever moves up the lattice `Ok < Err < Cancelled <
//! Panicked` during its lifetime: `join_outcomes` is the single place that
//! combines two outcomes, always picking the more severe with a left bias
//! on ties.

use core::fmt;

use super::cancel::CancelReason;

/// Severity level of a task [`Outcome`].
///
/// Ordering is the severity lattice itself: derive `PartialOrd`/`Ord` so
/// `Severity::Ok < Severity::Panicked` reads the way the lattice is stated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    /// The task completed successfully.
    Ok = 0,
    /// The task completed with an application error.
    Err = 1,
    /// The task was cancelled before completion.
    Cancelled = 2,
    /// The task panicked.
    Panicked = 3,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Err => write!(f, "err"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Panicked => write!(f, "panicked"),
        }
    }
}

/// An opaque panic payload captured at the point of unwind.
///
/// Deliberately not `Any`-typed: the kernel never downcasts a payload, it
/// only ever records and replays its canonical text for the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicPayload {
    /// A static, deterministic message describing the panic.
    pub message: &'static str,
}

impl PanicPayload {
    /// Creates a panic payload from a static message.
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Error raised while constructing or joining outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OutcomeError {
    /// A terminal outcome was asked to transition again.
    #[error("outcome already terminal")]
    AlreadyTerminal,
}

/// The terminal result of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Completed successfully.
    Ok,
    /// Completed with an application-level error, carrying a static tag.
    Err(&'static str),
    /// Cancelled, carrying the reason that caused cancellation.
    Cancelled(CancelReason),
    /// Panicked, carrying the captured payload.
    Panicked(PanicPayload),
}

impl Outcome {
    /// The severity of this outcome.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Ok => Severity::Ok,
            Self::Err(_) => Severity::Err,
            Self::Cancelled(_) => Severity::Cancelled,
            Self::Panicked(_) => Severity::Panicked,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Err(tag) => write!(f, "err({tag})"),
            Self::Cancelled(reason) => write!(f, "cancelled({reason})"),
            Self::Panicked(payload) => write!(f, "panicked({})", payload.message),
        }
    }
}

/// Joins two outcomes, keeping the one with higher severity.
///
/// On a severity tie, `a` wins (left-biased join) — this makes `join`
/// associative and gives a deterministic result independent of argument
/// order discovery, as required for digest stability.
#[must_use]
pub fn join_outcomes(a: Outcome, b: Outcome) -> Outcome {
    if b.severity() > a.severity() {
        b
    } else {
        a
    }
}
