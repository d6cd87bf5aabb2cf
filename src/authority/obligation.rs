//! Obligation state machine: linear reserve/resolve legality table.

use core::fmt;

/// Lifecycle state of an obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObligationState {
    /// Reserved, not yet resolved.
    Reserved,
    /// Resolved by commit.
    Committed,
    /// Resolved by abort.
    Aborted,
    /// Policy-gated terminal reached only at region close with unresolved
    /// reservations and a `leak_response` that allows it.
    Leaked,
}

impl fmt::Display for ObligationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reserved => "reserved",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
            Self::Leaked => "leaked",
        };
        write!(f, "{s}")
    }
}

impl ObligationState {
    /// True if this state is terminal (no further resolution possible).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Reserved)
    }

    /// True if this terminal state represents a normal (non-leaked)
    /// resolution.
    #[must_use]
    pub const fn is_resolved_normally(self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }

    /// Returns `true` iff `self -> next` is a legal obligation transition.
    ///
    /// `Reserved -> Leaked` is legal only as a region-close policy action,
    /// never a voluntary resolution; callers that drive ordinary
    /// commit/abort calls should additionally check
    /// [`Self::is_resolved_normally`] on `next` if they want to exclude it.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Reserved, Self::Committed)
                | (Self::Reserved, Self::Aborted)
                | (Self::Reserved, Self::Leaked)
        )
    }
}
