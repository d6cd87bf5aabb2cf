//! Region state machine: total transition-legality table and predicates.

use core::fmt;

/// Lifecycle state of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionState {
    /// Accepting spawns and new obligation reservations.
    Open,
    /// No longer accepting new spawns/reservations; in-flight work continues.
    Closing,
    /// Waiting for descendants to reach a terminal state.
    Draining,
    /// Obligations are being resolved/leaked per policy.
    Finalizing,
    /// Terminal: quiescent and released.
    Closed,
}

impl fmt::Display for RegionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Draining => "draining",
            Self::Finalizing => "finalizing",
            Self::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

impl RegionState {
    /// True if this state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// True if spawning tasks is permitted in this state.
    #[must_use]
    pub const fn can_spawn(self) -> bool {
        matches!(self, Self::Open)
    }

    /// True if reserving a new obligation is permitted in this state.
    #[must_use]
    pub const fn can_reserve_obligation(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` iff `self -> next` is a legal region transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Closing)
                | (Self::Closing, Self::Draining)
                | (Self::Draining, Self::Finalizing)
                | (Self::Finalizing, Self::Closed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_chain_is_exactly_the_linear_sequence() {
        assert!(RegionState::Open.can_transition_to(RegionState::Closing));
        assert!(RegionState::Closing.can_transition_to(RegionState::Draining));
        assert!(RegionState::Draining.can_transition_to(RegionState::Finalizing));
        assert!(RegionState::Finalizing.can_transition_to(RegionState::Closed));
    }

    #[test]
    fn no_skipping_or_regressing() {
        assert!(!RegionState::Open.can_transition_to(RegionState::Draining));
        assert!(!RegionState::Open.can_transition_to(RegionState::Finalizing));
        assert!(!RegionState::Closed.can_transition_to(RegionState::Open));
        assert!(!RegionState::Draining.can_transition_to(RegionState::Closing));
    }

    #[test]
    fn spawn_and_reserve_only_in_open() {
        assert!(RegionState::Open.can_spawn());
        assert!(!RegionState::Closing.can_spawn());
        assert!(!RegionState::Draining.can_spawn());
        assert!(RegionState::Open.can_reserve_obligation());
        assert!(!RegionState::Finalizing.can_reserve_obligation());
    }

    #[test]
    fn closed_is_the_only_terminal_state() {
        assert!(RegionState::Closed.is_terminal());
        assert!(!RegionState::Finalizing.is_terminal());
    }
}
