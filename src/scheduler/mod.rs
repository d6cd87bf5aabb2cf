//! The single-threaded cooperative scheduler.
//!
//! `Scheduler::run` drives a region subtree to quiescence (or a budget
//! exhaustion / fatal error) by repeating, per iteration: drain the cancel
//! lane, expire timers, then poll the ready lane in a deterministic
//! `(region depth, task sequence)` order. There is no preemption; a task
//! yields only by returning [`TaskPoll::Pending`].

use crate::authority::{RegionState, TaskState};
use crate::cancel::CancelDriver;
use crate::error::{Error, ErrorKind, ReasonPointer};
use crate::handle_store::HandleStore;
use crate::record::{ObligationRecord, RegionRecord, TaskBody, TaskPoll, TaskRecord};
use crate::timer::TimerWheel;
use crate::types::{Budget, CancelPhase, CancelReason, ObligationId, RegionId, TaskId, Time};

fn reason(site: &'static str) -> ReasonPointer {
    ReasonPointer::new("scheduler", site)
}

/// The kernel's scheduling state: handle stores for regions/tasks/
/// obligations, the timer wheel, and the cancel driver.
pub struct Scheduler {
    regions: HandleStore<RegionRecord>,
    tasks: HandleStore<TaskRecord>,
    obligations: HandleStore<ObligationRecord>,
    timers: TimerWheel,
    cancel: CancelDriver,
    now: Time,
    cancel_chain_depth_limit: usize,
}

impl Scheduler {
    /// Creates a scheduler sized for the given per-entity arena capacities.
    #[must_use]
    pub fn new(
        region_capacity: usize,
        task_capacity: usize,
        obligation_capacity: usize,
        timer_capacity: usize,
        cancel_chain_depth_limit: usize,
    ) -> Self {
        Self {
            regions: HandleStore::with_capacity(region_capacity),
            tasks: HandleStore::with_capacity(task_capacity),
            obligations: HandleStore::with_capacity(obligation_capacity),
            timers: TimerWheel::with_capacity(timer_capacity),
            cancel: CancelDriver::new(cancel_chain_depth_limit),
            now: Time::ZERO,
            cancel_chain_depth_limit,
        }
    }

    /// The scheduler's current monotonic tick.
    #[must_use]
    pub const fn now(&self) -> Time {
        self.now
    }

    /// Opens a new region, optionally as a child of `parent`.
    ///
    /// # Errors
    /// Returns [`ErrorKind::RegionAtCapacity`] if the region arena is full.
    pub fn open_region(&mut self, parent: Option<RegionId>) -> Result<RegionId, Error> {
        let index = self
            .regions
            .allocate(RegionRecord::new(RegionId::new_for_test(0, 0), parent))
            .map_err(|_| Error::new(ErrorKind::RegionAtCapacity, reason("open_region")))?;
        let id = RegionId::from_arena(index);
        if let Ok(record) = self.regions.resolve_mut(index) {
            record.set_id(id);
        }
        if let Some(parent_id) = parent {
            if let Ok(parent_record) = self.regions.resolve_mut(parent_id.arena_index()) {
                parent_record.add_child(id);
            }
        }
        Ok(id)
    }

    fn region_depth(&self, region: RegionId) -> u32 {
        let mut depth = 0;
        let mut current = Some(region);
        while let Some(id) = current {
            depth += 1;
            current = self
                .regions
                .resolve(id.arena_index())
                .ok()
                .and_then(RegionRecord::parent);
        }
        depth
    }

    /// True iff `candidate` is `ancestor` or a descendant of it.
    fn is_in_subtree(&self, ancestor: RegionId, candidate: RegionId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self
                .regions
                .resolve(id.arena_index())
                .ok()
                .and_then(RegionRecord::parent);
        }
        false
    }

    /// Spawns a task into `region`, which must be `Open`.
    ///
    /// # Errors
    /// Returns [`ErrorKind::RegionNotOpen`] if the region cannot admit a
    /// spawn, or [`ErrorKind::TaskNotFound`]-class [`ErrorKind::ResourceExhausted`]
    /// if the task arena is full.
    pub fn spawn(
        &mut self,
        region: RegionId,
        budget: Budget,
        body: Box<dyn TaskBody>,
    ) -> Result<TaskId, Error> {
        let region_record = self
            .regions
            .resolve_mut(region.arena_index())
            .map_err(|_| Error::new(ErrorKind::RegionNotFound, reason("spawn")))?;
        if !region_record.state().can_spawn() {
            return Err(Error::new(ErrorKind::RegionNotOpen, reason("spawn")));
        }
        let sequence = region_record.next_task_sequence();

        let index = self
            .tasks
            .allocate(TaskRecord::new(
                TaskId::new_for_test(0, 0),
                region,
                sequence,
                budget,
                body,
            ))
            .map_err(|_| Error::new(ErrorKind::ResourceExhausted, reason("spawn")))?;
        let id = TaskId::from_arena(index);
        if let Ok(record) = self.tasks.resolve_mut(index) {
            record.set_id(id);
            record.start_running();
        }
        Ok(id)
    }

    /// Reserves a new obligation in `region`.
    ///
    /// # Errors
    /// Returns [`ErrorKind::RegionNotOpen`] or [`ErrorKind::ResourceExhausted`].
    pub fn reserve_obligation(&mut self, region: RegionId) -> Result<ObligationId, Error> {
        let region_record = self
            .regions
            .resolve(region.arena_index())
            .map_err(|_| Error::new(ErrorKind::RegionNotFound, reason("reserve_obligation")))?;
        if !region_record.state().can_reserve_obligation() {
            return Err(Error::new(ErrorKind::RegionNotOpen, reason("reserve_obligation")));
        }
        let index = self
            .obligations
            .allocate(ObligationRecord::new(
                ObligationId::new_for_test(0, 0),
                region,
            ))
            .map_err(|_| Error::new(ErrorKind::ResourceExhausted, reason("reserve_obligation")))?;
        let id = ObligationId::from_arena(index);
        if let Ok(record) = self.obligations.resolve_mut(index) {
            record.set_id(id);
        }
        Ok(id)
    }

    /// Commits a reserved obligation.
    ///
    /// # Errors
    /// Returns [`ErrorKind::ObligationAlreadyResolved`] if already resolved.
    pub fn commit_obligation(&mut self, obligation: ObligationId) -> Result<(), Error> {
        let record = self
            .obligations
            .resolve_mut(obligation.arena_index())
            .map_err(|_| Error::new(ErrorKind::NotFound, reason("commit_obligation")))?;
        record
            .commit()
            .map_err(|()| Error::new(ErrorKind::ObligationAlreadyResolved, reason("commit_obligation")))
    }

    /// Aborts a reserved obligation.
    ///
    /// # Errors
    /// Returns [`ErrorKind::ObligationAlreadyResolved`] if already resolved.
    pub fn abort_obligation(&mut self, obligation: ObligationId) -> Result<(), Error> {
        let record = self
            .obligations
            .resolve_mut(obligation.arena_index())
            .map_err(|_| Error::new(ErrorKind::NotFound, reason("abort_obligation")))?;
        record
            .abort()
            .map_err(|()| Error::new(ErrorKind::ObligationAlreadyResolved, reason("abort_obligation")))
    }

    /// Requests a cancel on `region` and propagates it to every non-terminal
    /// task in the region's subtree, strengthening any existing reason on
    /// region and tasks alike.
    ///
    /// # Errors
    /// Returns [`ErrorKind::RegionNotFound`] if `region` has no record.
    pub fn cancel_region(&mut self, region: RegionId, reason_value: CancelReason) -> Result<(), Error> {
        {
            let record = self
                .regions
                .resolve_mut(region.arena_index())
                .map_err(|_| Error::new(ErrorKind::RegionNotFound, reason("cancel_region")))?;
            record.cancel(reason_value.clone(), self.cancel_chain_depth_limit);
        }
        let descendants: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(_, t)| self.is_in_subtree(region, t.region()) && !t.state().is_terminal())
            .map(|(_, t)| t.id())
            .collect();
        for task_id in descendants {
            self.cancel_task(task_id, reason_value.clone())?;
        }
        Ok(())
    }

    /// Requests a cancel on a task, strengthening any existing reason.
    pub fn cancel_task(&mut self, task: TaskId, reason_value: CancelReason) -> Result<(), Error> {
        let region = self
            .tasks
            .resolve(task.arena_index())
            .map_err(|_| Error::new(ErrorKind::TaskNotFound, reason("cancel_task")))?
            .region();
        if let Ok(record) = self.tasks.resolve_mut(task.arena_index()) {
            record.request_cancel(reason_value.clone(), self.cancel_chain_depth_limit);
        }
        let _ = self
            .cancel
            .cancel_task(task, region, u64::from(task.arena_index().generation()), reason_value);
        Ok(())
    }

    /// Advances the scheduler's clock to `now` without running the loop;
    /// used by tests that want fine control over timer expiry apart from
    /// `run`.
    pub fn advance_clock(&mut self, now: Time) {
        self.now = now;
    }

    /// Drives `region`'s subtree until quiescent, the budget is exhausted,
    /// or a fatal error occurs.
    ///
    /// # Errors
    /// Returns [`ErrorKind::PollBudgetExhausted`] if `budget` runs out
    /// before quiescence.
    pub fn run(&mut self, region: RegionId, mut budget: Budget) -> Result<(), Error> {
        loop {
            if crate::quiescence::check(self, region).is_ok() {
                return Ok(());
            }
            if budget.is_exhausted() {
                return Err(Error::new(ErrorKind::PollBudgetExhausted, reason("run")));
            }

            // 1. Cancel lane: advance one protocol step per non-terminal
            // task that has a pending, not-yet-completed cancel witness.
            let pending_cancels: Vec<TaskId> = self
                .tasks
                .iter()
                .filter(|(_, t)| {
                    self.is_in_subtree(region, t.region())
                        && t.cancel_reason().is_some()
                        && !t.state().is_terminal()
                        && !self.cancel.task_is_witness_terminal(t.id())
                })
                .map(|(_, t)| t.id())
                .collect();
            for task_id in pending_cancels {
                budget.consume_poll();
                self.advance_cancel_one_step(task_id);
            }

            // 2. Timer expiry.
            let fired = self.timers.collect_expired(self.now.as_nanos());
            for _timer in fired {
                budget.consume_poll();
            }

            // 3. Ready lane: deterministic (region depth, sequence) order.
            let mut ready: Vec<(u32, u64, TaskId)> = self
                .tasks
                .iter()
                .filter(|(_, t)| {
                    self.is_in_subtree(region, t.region())
                        && matches!(t.state(), TaskState::Running | TaskState::Cancelling)
                })
                .map(|(_, t)| (self.region_depth(t.region()), t.sequence(), t.id()))
                .collect();
            ready.sort_by_key(|(depth, seq, _)| (*depth, *seq));

            let mut made_progress = false;
            for (_, _, task_id) in ready {
                if budget.is_exhausted() {
                    break;
                }
                made_progress = true;
                self.poll_one(task_id, &mut budget);
            }

            if !made_progress {
                // No ready tasks and no cancels/timers resolved this
                // iteration but still not quiescent: avoid spinning.
                self.now = self.now.saturating_add_nanos(1);
            }
        }
    }

    fn advance_cancel_one_step(&mut self, task_id: TaskId) {
        let current_phase = self.cancel.task_witness(task_id).map(|w| w.phase);
        let Some(phase) = current_phase else { return };
        match phase {
            CancelPhase::Requested => {
                let _ = self.cancel.advance_task(task_id, CancelPhase::Cancelling);
                if let Ok(record) = self.tasks.resolve_mut(task_id.arena_index()) {
                    if record.state().can_transition_to(TaskState::Cancelling) {
                        record.acknowledge_cancel();
                    }
                }
            }
            CancelPhase::Cancelling => {
                let budget_exhausted = self
                    .tasks
                    .resolve(task_id.arena_index())
                    .map(|r| r.budget().is_exhausted())
                    .unwrap_or(true);
                if budget_exhausted {
                    if let Ok(record) = self.tasks.resolve_mut(task_id.arena_index()) {
                        let cancelled = record
                            .cancel_reason()
                            .cloned()
                            .unwrap_or_else(CancelReason::shutdown);
                        record.force_cancel_complete(crate::types::Outcome::Cancelled(cancelled));
                    }
                    let _ = self.cancel.advance_task(task_id, CancelPhase::Finalizing);
                }
            }
            CancelPhase::Finalizing => {
                let _ = self.cancel.advance_task(task_id, CancelPhase::Completed);
            }
            CancelPhase::Completed => {}
        }
    }

    fn poll_one(&mut self, task_id: TaskId, budget: &mut Budget) {
        let Ok(record) = self.tasks.resolve_mut(task_id.arena_index()) else {
            return;
        };
        budget.consume_poll();
        match record.poll_once() {
            TaskPoll::Complete(_) => {
                record.complete();
            }
            TaskPoll::Pending => {}
        }
    }

    /// Shared accessor used by [`crate::quiescence::check`].
    pub(crate) const fn regions(&self) -> &HandleStore<RegionRecord> {
        &self.regions
    }

    /// Shared accessor used by [`crate::quiescence::check`].
    pub(crate) const fn tasks(&self) -> &HandleStore<TaskRecord> {
        &self.tasks
    }

    /// Shared accessor used by [`crate::quiescence::check`].
    pub(crate) const fn obligations(&self) -> &HandleStore<ObligationRecord> {
        &self.obligations
    }

    /// Shared accessor used by [`crate::quiescence::check`].
    pub(crate) const fn timers(&self) -> &TimerWheel {
        &self.timers
    }

    /// Shared accessor used by [`crate::quiescence::check`].
    pub(crate) fn cancel_driver(&self) -> &CancelDriver {
        &self.cancel
    }

    /// Transitions a region forward one step if legal.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidTransition`] if the target state is not
    /// reachable from the region's current state.
    pub fn transition_region(&mut self, region: RegionId, next: RegionState) -> Result<(), Error> {
        let record = self
            .regions
            .resolve_mut(region.arena_index())
            .map_err(|_| Error::new(ErrorKind::RegionNotFound, reason("transition_region")))?;
        record
            .transition_to(next)
            .map_err(|_| Error::new(ErrorKind::InvalidTransition, reason("transition_region")))
    }
}
