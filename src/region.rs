//! The public region-facing API: scheduler, platform hooks, trace ring, and
//! config wired together behind one handle-facing surface.

use std::sync::Arc;

use crate::config::RuntimeConfig;
use crate::error::Error;
use crate::platform::Platform;
use crate::record::TaskBody;
use crate::scheduler::Scheduler;
use crate::trace::{TraceExport, TraceRing};
use crate::types::{Budget, CancelReason, ObligationId, RegionId, TaskId};

/// A running kernel instance: scheduler state, platform hooks, trace ring,
/// and the resolved configuration, bundled behind one handle-facing API.
pub struct Runtime {
    scheduler: Scheduler,
    platform: Platform,
    trace: TraceRing,
    config: RuntimeConfig,
}

impl Runtime {
    /// Builds a runtime sized per `config`'s resource ceilings.
    #[must_use]
    pub fn new(config: RuntimeConfig, platform: Platform) -> Self {
        let ceilings = config.resource_contract_ceilings;
        let scheduler = Scheduler::new(
            ceilings.region_capacity as usize,
            ceilings.task_capacity as usize,
            ceilings.obligation_capacity as usize,
            ceilings.timer_capacity as usize,
            config.max_cancel_chain_depth as usize,
        );
        let trace = TraceRing::new(ceilings.trace_ring_capacity as usize);
        Self { scheduler, platform, trace, config }
    }

    /// The resolved configuration this runtime was built with.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The platform hooks this runtime was built with.
    #[must_use]
    pub const fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Opens a new region, optionally nested under `parent`.
    ///
    /// # Errors
    /// Returns [`ErrorKind::RegionAtCapacity`] if the region arena is full.
    pub fn open_region(&mut self, parent: Option<RegionId>) -> Result<RegionId, Error> {
        self.scheduler.open_region(parent)
    }

    /// Spawns a task into `region`.
    ///
    /// # Errors
    /// Returns [`ErrorKind::RegionNotOpen`] or [`ErrorKind::ResourceExhausted`].
    pub fn spawn(&mut self, region: RegionId, budget: Budget, body: Box<dyn TaskBody>) -> Result<TaskId, Error> {
        self.scheduler.spawn(region, budget, body)
    }

    /// Reserves a new obligation in `region`.
    ///
    /// # Errors
    /// Returns [`ErrorKind::RegionNotOpen`] or [`ErrorKind::ResourceExhausted`].
    pub fn reserve_obligation(&mut self, region: RegionId) -> Result<ObligationId, Error> {
        self.scheduler.reserve_obligation(region)
    }

    /// Commits a reserved obligation.
    ///
    /// # Errors
    /// Returns [`ErrorKind::ObligationAlreadyResolved`].
    pub fn commit_obligation(&mut self, obligation: ObligationId) -> Result<(), Error> {
        self.scheduler.commit_obligation(obligation)
    }

    /// Aborts a reserved obligation.
    ///
    /// # Errors
    /// Returns [`ErrorKind::ObligationAlreadyResolved`].
    pub fn abort_obligation(&mut self, obligation: ObligationId) -> Result<(), Error> {
        self.scheduler.abort_obligation(obligation)
    }

    /// Requests a cancel on a single task.
    ///
    /// # Errors
    /// Returns [`ErrorKind::TaskNotFound`].
    pub fn cancel_task(&mut self, task: TaskId, reason_value: CancelReason) -> Result<(), Error> {
        self.scheduler.cancel_task(task, reason_value)
    }

    /// Requests a cancel on `region`, propagated to its entire subtree.
    ///
    /// # Errors
    /// Returns [`ErrorKind::RegionNotFound`].
    pub fn cancel_region(&mut self, region: RegionId, reason_value: CancelReason) -> Result<(), Error> {
        self.scheduler.cancel_region(region, reason_value)
    }

    /// Drives `region`'s subtree to quiescence, a budget exhaustion, or a
    /// fatal error.
    ///
    /// # Errors
    /// Returns [`ErrorKind::PollBudgetExhausted`] if `budget` runs out
    /// first.
    pub fn run(&mut self, region: RegionId, budget: Budget) -> Result<(), Error> {
        self.scheduler.run(region, budget)
    }

    /// Closes `region`, requiring it to already be quiescent.
    ///
    /// Walks the full `Open -> Closing -> Draining -> Finalizing -> Closed`
    /// chain in one call; a region with live tasks or unresolved
    /// obligations is left untouched and an error is returned instead of a
    /// partial transition.
    ///
    /// # Errors
    /// Returns [`ErrorKind::TasksStillActive`] or
    /// [`ErrorKind::ObligationsUnresolved`] if `region` is not quiescent.
    pub fn close_region(&mut self, region: RegionId) -> Result<(), Error> {
        crate::quiescence::check(&self.scheduler, region)?;
        for next in [
            crate::authority::RegionState::Closing,
            crate::authority::RegionState::Draining,
            crate::authority::RegionState::Finalizing,
            crate::authority::RegionState::Closed,
        ] {
            self.scheduler.transition_region(region, next)?;
        }
        Ok(())
    }

    /// Exports the trace ring's current contents and digest.
    #[must_use]
    pub fn export_trace(&self) -> TraceExport {
        self.trace.export()
    }

    /// Appends one canonical event to the trace ring.
    pub fn record_event(&mut self, event: crate::trace::CanonicalEvent) {
        self.trace.push(event);
    }

    /// Checks `region`'s subtree for quiescence without mutating anything.
    ///
    /// # Errors
    /// Returns [`ErrorKind::TasksStillActive`], [`ErrorKind::ObligationsUnresolved`],
    /// or [`ErrorKind::TimersPending`] if not quiescent.
    pub fn check_quiescence(&self, region: RegionId) -> Result<(), Error> {
        crate::quiescence::check(&self.scheduler, region)
    }
}

/// Builds a [`Platform`] with deterministic, seeded hooks — the
/// construction path used by fixtures and the test harness.
#[must_use]
pub fn deterministic_platform(seed: u64) -> Platform {
    use crate::platform::{EntropySource, LogLevel, LogSink, MonotonicClock, NullClock};
    use crate::util::DetRng;
    use parking_lot::Mutex;

    struct SeededEntropy(Mutex<DetRng>);
    impl EntropySource for SeededEntropy {
        fn next_u64(&self) -> u64 {
            self.0.lock().next_u64()
        }
    }

    struct SilentSink;
    impl LogSink for SilentSink {
        fn emit(&self, _level: LogLevel, _message: &str) {}
    }

    Platform::new(
        Arc::new(NullClock) as Arc<dyn MonotonicClock>,
        Arc::new(SeededEntropy(Mutex::new(DetRng::new(seed)))) as Arc<dyn EntropySource>,
        Some(Arc::new(SilentSink) as Arc<dyn LogSink>),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use crate::record::TaskPoll;
    use crate::types::Outcome;

    fn runtime() -> Runtime {
        let config = RuntimeConfig::builder(Profile::Core).build().unwrap();
        Runtime::new(config, deterministic_platform(7))
    }

    #[test]
    fn region_lifecycle_ok_reaches_closed() {
        let mut rt = runtime();
        let region = rt.open_region(None).unwrap();
        rt.spawn(region, Budget::new().with_poll_quota(100), Box::new(|| TaskPoll::Complete(Outcome::Ok)))
            .unwrap();
        rt.run(region, Budget::new().with_poll_quota(100)).unwrap();
        rt.close_region(region).unwrap();
    }

    #[test]
    fn close_region_rejects_unresolved_obligation() {
        let mut rt = runtime();
        let region = rt.open_region(None).unwrap();
        rt.reserve_obligation(region).unwrap();
        let err = rt.close_region(region).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ObligationsUnresolved);
    }

    #[test]
    fn obligation_double_commit_is_rejected() {
        let mut rt = runtime();
        let region = rt.open_region(None).unwrap();
        let obligation = rt.reserve_obligation(region).unwrap();
        rt.commit_obligation(obligation).unwrap();
        let err = rt.commit_obligation(obligation).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ObligationAlreadyResolved);
        rt.close_region(region).unwrap();
    }

    #[test]
    fn cancel_region_propagates_to_descendant_tasks() {
        let mut rt = runtime();
        let region = rt.open_region(None).unwrap();
        let task = rt.spawn(region, Budget::INFINITE, Box::new(|| TaskPoll::Pending)).unwrap();
        rt.cancel_region(region, CancelReason::shutdown()).unwrap();
        rt.run(region, Budget::new().with_poll_quota(2000)).unwrap();
        let _ = task;
        rt.close_region(region).unwrap();
    }

    #[test]
    fn deterministic_platform_entropy_is_reproducible() {
        let a = deterministic_platform(9);
        let b = deterministic_platform(9);
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
