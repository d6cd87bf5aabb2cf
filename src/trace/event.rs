//! The canonical event tuple recorded for every observable kernel
//! transition.
//!
//! Every variant is constructed from already-deterministic inputs (ids,
//! enum states, logical time) — never from wall-clock reads or address
//! identity — so a replay of the same scenario/seed/profile/class produces
//! byte-identical events in byte-identical order.

use crate::authority::{ObligationState, RegionState, TaskState};
use crate::types::{CancelPhase, ChannelId, ObligationId, RegionId, TaskId, Time, TimerId};

/// One canonical, replay-stable kernel event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalEvent {
    /// A region moved to a new lifecycle state.
    RegionTransition {
        /// When this event occurred.
        at: Time,
        /// The affected region.
        region: RegionId,
        /// The region's new state.
        state: RegionState,
    },
    /// A task moved to a new lifecycle state.
    TaskTransition {
        /// When this event occurred.
        at: Time,
        /// The affected task.
        task: TaskId,
        /// The task's new state.
        state: TaskState,
    },
    /// An obligation moved to a new lifecycle state.
    ObligationTransition {
        /// When this event occurred.
        at: Time,
        /// The affected obligation.
        obligation: ObligationId,
        /// The obligation's new state.
        state: ObligationState,
    },
    /// A cancel witness advanced to a new phase.
    CancelPhaseAdvanced {
        /// When this event occurred.
        at: Time,
        /// The affected task, if task-scoped.
        task: Option<TaskId>,
        /// The affected region.
        region: RegionId,
        /// The new phase.
        phase: CancelPhase,
    },
    /// A timer was armed.
    TimerArmed {
        /// When this event occurred.
        at: Time,
        /// The new timer's id.
        timer: TimerId,
        /// The deadline it was armed for.
        deadline: Time,
    },
    /// A timer fired.
    TimerFired {
        /// When this event occurred.
        at: Time,
        /// The fired timer's id.
        timer: TimerId,
    },
    /// A timer was cancelled before firing.
    TimerCancelled {
        /// When this event occurred.
        at: Time,
        /// The cancelled timer's id.
        timer: TimerId,
    },
    /// A channel permit was reserved.
    ChannelReserved {
        /// When this event occurred.
        at: Time,
        /// The channel.
        channel: ChannelId,
    },
    /// A channel send completed using a reserved permit.
    ChannelSent {
        /// When this event occurred.
        at: Time,
        /// The channel.
        channel: ChannelId,
    },
    /// A reserved permit was aborted without sending.
    ChannelAborted {
        /// When this event occurred.
        at: Time,
        /// The channel.
        channel: ChannelId,
    },
    /// A value was received from a channel.
    ChannelReceived {
        /// When this event occurred.
        at: Time,
        /// The channel.
        channel: ChannelId,
    },
    /// A channel side (sender or receiver) closed.
    ChannelClosed {
        /// When this event occurred.
        at: Time,
        /// The channel.
        channel: ChannelId,
        /// True if the closed side was the sender; false for receiver.
        sender_side: bool,
    },
    /// The scheduler polled a task once.
    SchedulerPolled {
        /// When this event occurred.
        at: Time,
        /// The polled task.
        task: TaskId,
        /// The task's poll count after this poll.
        poll_count: u64,
    },
    /// The scheduler observed a task complete.
    SchedulerCompleted {
        /// When this event occurred.
        at: Time,
        /// The completed task.
        task: TaskId,
    },
}

impl CanonicalEvent {
    /// The logical time this event was recorded at.
    #[must_use]
    pub const fn at(&self) -> Time {
        match self {
            Self::RegionTransition { at, .. }
            | Self::TaskTransition { at, .. }
            | Self::ObligationTransition { at, .. }
            | Self::CancelPhaseAdvanced { at, .. }
            | Self::TimerArmed { at, .. }
            | Self::TimerFired { at, .. }
            | Self::TimerCancelled { at, .. }
            | Self::ChannelReserved { at, .. }
            | Self::ChannelSent { at, .. }
            | Self::ChannelAborted { at, .. }
            | Self::ChannelReceived { at, .. }
            | Self::ChannelClosed { at, .. }
            | Self::SchedulerPolled { at, .. }
            | Self::SchedulerCompleted { at, .. } => *at,
        }
    }

    /// A stable, small tag identifying the event's family; used as the
    /// leading byte of the digest encoding so events of different shapes
    /// never collide under folding.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::RegionTransition { .. } => 0,
            Self::TaskTransition { .. } => 1,
            Self::ObligationTransition { .. } => 2,
            Self::CancelPhaseAdvanced { .. } => 3,
            Self::TimerArmed { .. } => 4,
            Self::TimerFired { .. } => 5,
            Self::TimerCancelled { .. } => 6,
            Self::ChannelReserved { .. } => 7,
            Self::ChannelSent { .. } => 8,
            Self::ChannelAborted { .. } => 9,
            Self::ChannelReceived { .. } => 10,
            Self::ChannelClosed { .. } => 11,
            Self::SchedulerPolled { .. } => 12,
            Self::SchedulerCompleted { .. } => 13,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_stable_per_variant_family() {
        let a = CanonicalEvent::TimerArmed {
            at: Time::ZERO,
            timer: TimerId::new_for_test(0, 0),
            deadline: Time::from_secs(1),
        };
        let b = CanonicalEvent::TimerArmed {
            at: Time::from_secs(5),
            timer: TimerId::new_for_test(9, 2),
            deadline: Time::from_secs(9),
        };
        assert_eq!(a.tag(), b.tag());
    }

    #[test]
    fn at_extracts_the_logical_time() {
        let event = CanonicalEvent::TimerFired {
            at: Time::from_millis(7),
            timer: TimerId::new_for_test(0, 0),
        };
        assert_eq!(event.at(), Time::from_millis(7));
    }
}
