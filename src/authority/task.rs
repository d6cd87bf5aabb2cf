//! Task state machine: total transition-legality table and predicates.

use core::fmt;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskState {
    /// Spawned but not yet polled.
    Created,
    /// Polled at least once, no terminal outcome yet.
    Running,
    /// A cancel has been requested but the protocol has not advanced.
    CancelRequested,
    /// Actively running cancel cleanup under its cleanup budget.
    Cancelling,
    /// Finishing up; outcome about to be assigned.
    Finalizing,
    /// Terminal: outcome assigned, no further polls.
    Completed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::CancelRequested => "cancel-requested",
            Self::Cancelling => "cancelling",
            Self::Finalizing => "finalizing",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

impl TaskState {
    /// True if this state is terminal; `Completed` admits no further edges.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// True if a cancel may be requested while in this state (any
    /// non-terminal state).
    #[must_use]
    pub const fn can_request_cancel(self) -> bool {
        !self.is_terminal()
    }

    /// Returns `true` iff `self -> next` is a legal task transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Running)
                | (Self::Running, Self::CancelRequested)
                | (Self::Running, Self::Finalizing)
                | (Self::Running, Self::Completed)
                | (Self::CancelRequested, Self::Cancelling)
                | (Self::CancelRequested, Self::Finalizing)
                | (Self::Cancelling, Self::Finalizing)
                | (Self::Finalizing, Self::Completed)
        )
    }
}
