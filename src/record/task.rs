//! Live task record: state, owning region, poll body, budget, and outcome.

use crate::authority::TaskState;
use crate::types::{Budget, CancelReason, Outcome, RegionId, TaskId};

/// Result of one call to a task body's `poll`.
#[derive(Debug)]
pub enum TaskPoll {
    /// The task finished, with this outcome.
    Complete(Outcome),
    /// The task yielded and should be polled again later.
    Pending,
}

/// A type-erased, cooperatively polled task body.
///
/// Mirrors the boxed-future type-erasure idiom used for stored tasks
/// elsewhere in the runtime, but the poll contract here is the kernel's
/// own `{Complete, Pending}` — never a [`std::future::Future`] waker
/// protocol — since suspension points are explicit kernel operations
/// (channel reserve/recv, timer wait), not arbitrary async/await.
pub trait TaskBody: Send {
    /// Advances the task body by one poll.
    fn poll(&mut self) -> TaskPoll;
}

impl<F> TaskBody for F
where
    F: FnMut() -> TaskPoll + Send,
{
    fn poll(&mut self) -> TaskPoll {
        (self)()
    }
}

/// The live record for one spawned task.
pub struct TaskRecord {
    id: TaskId,
    region: RegionId,
    state: TaskState,
    body: Box<dyn TaskBody>,
    budget: Budget,
    poll_count: u64,
    outcome: Option<Outcome>,
    cancel_reason: Option<CancelReason>,
    /// Sequence number within the region, used as the scheduler's
    /// deterministic tie-break key alongside region depth.
    sequence: u64,
}

impl TaskRecord {
    /// Creates a new task record in the `Created` state.
    pub fn new(
        id: TaskId,
        region: RegionId,
        sequence: u64,
        initial_budget: Budget,
        body: Box<dyn TaskBody>,
    ) -> Self {
        Self {
            id,
            region,
            state: TaskState::Created,
            body,
            budget: initial_budget,
            poll_count: 0,
            outcome: None,
            cancel_reason: None,
            sequence,
        }
    }

    /// This task's identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Overwrites the identifier once the owning arena handle is known.
    ///
    /// Used only by the scheduler immediately after insertion, since the
    /// handle (and therefore the id) is not known until the arena returns
    /// it.
    pub(crate) fn set_id(&mut self, id: TaskId) {
        self.id = id;
    }

    /// The region this task is pinned to.
    #[must_use]
    pub const fn region(&self) -> RegionId {
        self.region
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// The scheduler ordering sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Total poll count across this task's lifetime.
    #[must_use]
    pub const fn poll_count(&self) -> u64 {
        self.poll_count
    }

    /// The task's remaining budget.
    #[must_use]
    pub const fn budget(&self) -> Budget {
        self.budget
    }

    /// The current cancel reason, if any cancel has been requested.
    #[must_use]
    pub const fn cancel_reason(&self) -> Option<&CancelReason> {
        self.cancel_reason.as_ref()
    }

    /// The final outcome, once `Completed`.
    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Moves `Created -> Running`. Caller must have already validated the
    /// transition via [`crate::authority::TaskState::can_transition_to`];
    /// this performs the mutation only.
    pub fn start_running(&mut self) {
        debug_assert!(self.state.can_transition_to(TaskState::Running));
        self.state = TaskState::Running;
    }

    /// Requests a cancel with the given reason, strengthening any existing
    /// reason, and moves to `CancelRequested` if currently `Running`.
    ///
    /// Returns `true` if the reason actually strengthened.
    pub fn request_cancel(&mut self, reason: CancelReason, chain_depth_limit: usize) -> bool {
        let strengthened = match &mut self.cancel_reason {
            Some(existing) => existing.strengthen(&reason, chain_depth_limit),
            None => {
                self.cancel_reason = Some(reason);
                true
            }
        };
        if self.state == TaskState::Running {
            self.state = TaskState::CancelRequested;
        }
        strengthened
    }

    /// Moves `CancelRequested -> Cancelling`, narrowing the budget to the
    /// reason's per-kind cleanup budget via `meet`.
    pub fn acknowledge_cancel(&mut self) {
        debug_assert!(self.state.can_transition_to(TaskState::Cancelling));
        if let Some(reason) = &self.cancel_reason {
            self.budget = self.budget.meet(reason.cleanup_budget());
        }
        self.state = TaskState::Cancelling;
    }

    /// Polls the task body once, charging one poll from the budget and
    /// updating state/outcome as appropriate. Returns the poll result.
    pub fn poll_once(&mut self) -> TaskPoll {
        self.poll_count += 1;
        self.budget.consume_poll();
        let result = self.body.poll();
        if let TaskPoll::Complete(outcome) = &result {
            self.state = TaskState::Finalizing;
            self.outcome = Some(outcome.clone());
        }
        result
    }

    /// Moves `Finalizing -> Completed`, assigning `outcome` if not already
    /// set (e.g. forced completion after cleanup-budget exhaustion).
    pub fn force_complete(&mut self, outcome: Outcome) {
        debug_assert!(self.state.can_transition_to(TaskState::Completed) || self.state == TaskState::Finalizing);
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
        self.state = TaskState::Completed;
    }

    /// Moves `Finalizing -> Completed` using the already-recorded outcome.
    pub fn complete(&mut self) {
        debug_assert!(self.outcome.is_some());
        self.state = TaskState::Completed;
    }

    /// Forces a task stuck in `Cancelling` (cleanup budget exhausted)
    /// through to `Completed` with `outcome`, passing through `Finalizing`
    /// so the authority table's edges are never skipped.
    pub fn force_cancel_complete(&mut self, outcome: Outcome) {
        debug_assert!(matches!(
            self.state,
            TaskState::Cancelling | TaskState::CancelRequested
        ));
        self.state = TaskState::Finalizing;
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
        self.state = TaskState::Completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CancelKind;

    fn task(body: impl FnMut() -> TaskPoll + Send + 'static) -> TaskRecord {
        TaskRecord::new(
            TaskId::new_for_test(0, 0),
            RegionId::new_for_test(0, 0),
            0,
            Budget::INFINITE,
            Box::new(body),
        )
    }

    #[test]
    fn new_task_starts_in_created_state() {
        let t = task(|| TaskPoll::Pending);
        assert_eq!(t.state(), TaskState::Created);
    }

    #[test]
    fn start_running_then_poll_to_completion() {
        let mut t = task(|| TaskPoll::Complete(Outcome::Ok));
        t.start_running();
        assert_eq!(t.state(), TaskState::Running);
        match t.poll_once() {
            TaskPoll::Complete(Outcome::Ok) => {}
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(t.state(), TaskState::Finalizing);
        t.complete();
        assert_eq!(t.state(), TaskState::Completed);
        assert_eq!(t.poll_count(), 1);
    }

    #[test]
    fn request_cancel_strengthens_and_transitions() {
        let mut t = task(|| TaskPoll::Pending);
        t.start_running();
        assert!(t.request_cancel(CancelReason::timeout(), 8));
        assert_eq!(t.state(), TaskState::CancelRequested);
        assert!(t.request_cancel(CancelReason::parent(), 8));
        assert_eq!(t.cancel_reason().unwrap().kind(), CancelKind::Parent);
        assert!(!t.request_cancel(CancelReason::user("ignored"), 8));
        assert_eq!(t.cancel_reason().unwrap().kind(), CancelKind::Parent);
    }

    #[test]
    fn acknowledge_cancel_narrows_budget_to_cleanup_budget() {
        let mut t = task(|| TaskPoll::Pending);
        t.start_running();
        t.request_cancel(CancelReason::shutdown(), 8);
        t.acknowledge_cancel();
        assert_eq!(t.state(), TaskState::Cancelling);
        assert!(t.budget().poll_quota <= CancelReason::shutdown().cleanup_budget().poll_quota);
    }
}
