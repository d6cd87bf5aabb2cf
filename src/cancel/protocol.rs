//! Cancel protocol driver: witness lifecycle and checkpointed region
//! propagation.
//!
//! A witness begins at [`CancelPhase::Requested`] on the first cancel of a
//! task or region and only ever advances; [`CancelDriver::propagate_region`]
//! applies a region's cancel to every non-terminal descendant and records
//! how far it got, so an interruption (e.g. budget exhaustion mid-sweep)
//! leaves a [`PropagationCheckpoint`] that a later call resumes from rather
//! than restarting or silently skipping entities.

use crate::types::{
    CancelPhase, CancelReason, CancelWitness, CancelWitnessError, RegionId, TaskId,
};
use crate::util::DetHashMap;

/// Owns the cancel witnesses for tasks and regions.
#[derive(Debug, Default)]
pub struct CancelDriver {
    task_witnesses: DetHashMap<TaskId, CancelWitness>,
    region_witnesses: DetHashMap<RegionId, CancelWitness>,
    chain_depth_limit: usize,
}

impl CancelDriver {
    /// Creates a driver with the given cause-chain depth bound.
    #[must_use]
    pub fn new(chain_depth_limit: usize) -> Self {
        Self {
            task_witnesses: DetHashMap::default(),
            region_witnesses: DetHashMap::default(),
            chain_depth_limit,
        }
    }

    /// Requests (or strengthens) a cancel on a task, creating its witness on
    /// first cancel.
    ///
    /// # Errors
    /// Propagates [`CancelWitnessError`] if an existing witness rejects the
    /// update (phase regression, epoch/region mismatch).
    pub fn cancel_task(
        &mut self,
        task: TaskId,
        region: RegionId,
        epoch: u64,
        reason: CancelReason,
    ) -> Result<bool, CancelWitnessError> {
        if let Some(witness) = self.task_witnesses.get_mut(&task) {
            return witness.strengthen(&reason, Some(task), region, epoch, self.chain_depth_limit);
        }
        self.task_witnesses
            .insert(task, CancelWitness::new(reason, region, Some(task), epoch));
        Ok(true)
    }

    /// Requests (or strengthens) a cancel on a region, creating its witness
    /// on first cancel.
    ///
    /// # Errors
    /// Propagates [`CancelWitnessError`] if an existing witness rejects the
    /// update.
    pub fn cancel_region(
        &mut self,
        region: RegionId,
        epoch: u64,
        reason: CancelReason,
    ) -> Result<bool, CancelWitnessError> {
        if let Some(witness) = self.region_witnesses.get_mut(&region) {
            return witness.strengthen(&reason, None, region, epoch, self.chain_depth_limit);
        }
        self.region_witnesses
            .insert(region, CancelWitness::new(reason, region, None, epoch));
        Ok(true)
    }

    /// Advances a task's witness to the next protocol phase.
    ///
    /// # Errors
    /// Returns [`CancelWitnessError::PhaseRegression`] only if called out of
    /// order (never, if callers always pass `current.next()`); returns
    /// nothing to advance (`Ok(())`) if no witness exists for `task`.
    pub fn advance_task(&mut self, task: TaskId, phase: CancelPhase) -> Result<(), CancelWitnessError> {
        match self.task_witnesses.get_mut(&task) {
            Some(witness) => witness.advance(phase),
            None => Ok(()),
        }
    }

    /// The current witness for a task, if any.
    #[must_use]
    pub fn task_witness(&self, task: TaskId) -> Option<&CancelWitness> {
        self.task_witnesses.get(&task)
    }

    /// The current witness for a region, if any.
    #[must_use]
    pub fn region_witness(&self, region: RegionId) -> Option<&CancelWitness> {
        self.region_witnesses.get(&region)
    }

    /// Drops a task's witness once it has reached `Completed` and the task
    /// itself has been released.
    pub fn forget_task(&mut self, task: TaskId) {
        self.task_witnesses.remove(&task);
    }

    /// True iff no witness is tracked for `task`, or its witness has
    /// reached `Completed`.
    #[must_use]
    pub fn task_is_witness_terminal(&self, task: TaskId) -> bool {
        self.task_witnesses
            .get(&task)
            .is_none_or(|w| w.phase == CancelPhase::Completed)
    }

    /// Propagates a region's cancel reason to every descendant task in
    /// `descendants`, starting (or resuming) from `checkpoint`.
    ///
    /// Task cancel never escapes back upward: this only walks downward from
    /// `region` into the supplied descendant list, which callers build by
    /// walking the region tree. At most `budget` descendants are cancelled
    /// per call so a caller can bound propagation cost per scheduler
    /// iteration; the returned checkpoint records where to resume.
    pub fn propagate_region(
        &mut self,
        region: RegionId,
        region_epoch: u64,
        reason: &CancelReason,
        descendants: &[(TaskId, RegionId, u64)],
        checkpoint: PropagationCheckpoint,
        budget: usize,
    ) -> Result<PropagationCheckpoint, CancelWitnessError> {
        self.cancel_region(region, region_epoch, reason.clone())?;

        let mut index = checkpoint.next_index;
        let mut touched = 0;
        while index < descendants.len() && touched < budget {
            let (task, owning_region, epoch) = descendants[index];
            self.cancel_task(task, owning_region, epoch, reason.clone())?;
            index += 1;
            touched += 1;
        }

        Ok(PropagationCheckpoint { next_index: index })
    }
}

/// Resumable progress marker for [`CancelDriver::propagate_region`].
///
/// A fresh propagation starts from [`PropagationCheckpoint::START`]; a
/// partial sweep (e.g. interrupted by budget exhaustion) returns a
/// checkpoint whose `next_index` the caller feeds back in to resume exactly
/// where it left off, leaving the already-cancelled prefix untouched and
/// legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationCheckpoint {
    next_index: usize,
}

impl PropagationCheckpoint {
    /// The initial checkpoint for a fresh propagation sweep.
    pub const START: Self = Self { next_index: 0 };

    /// True if the sweep reached the end of the descendant list.
    #[must_use]
    pub fn is_complete(self, descendant_count: usize) -> bool {
        self.next_index >= descendant_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CancelKind;

    fn ids() -> (RegionId, TaskId) {
        (RegionId::new_for_test(0, 0), TaskId::new_for_test(0, 0))
    }

    #[test]
    fn first_cancel_creates_witness_in_requested_phase() {
        let (region, task) = ids();
        let mut driver = CancelDriver::new(8);
        driver.cancel_task(task, region, 1, CancelReason::timeout()).unwrap();
        assert_eq!(driver.task_witness(task).unwrap().phase, CancelPhase::Requested);
    }

    #[test]
    fn phases_advance_monotonically() {
        let (region, task) = ids();
        let mut driver = CancelDriver::new(8);
        driver.cancel_task(task, region, 1, CancelReason::timeout()).unwrap();
        driver.advance_task(task, CancelPhase::Cancelling).unwrap();
        driver.advance_task(task, CancelPhase::Finalizing).unwrap();
        driver.advance_task(task, CancelPhase::Completed).unwrap();
        assert!(driver.task_is_witness_terminal(task));
        assert_eq!(
            driver.advance_task(task, CancelPhase::Requested),
            Err(CancelWitnessError::PhaseRegression)
        );
    }

    #[test]
    fn propagation_checkpoint_resumes_without_retouching_prefix() {
        let region = RegionId::new_for_test(0, 0);
        let descendants: Vec<_> = (0..5)
            .map(|i| (TaskId::new_for_test(i, 0), region, 1))
            .collect();
        let mut driver = CancelDriver::new(8);

        let checkpoint = driver
            .propagate_region(region, 1, &CancelReason::parent(), &descendants, PropagationCheckpoint::START, 2)
            .unwrap();
        assert_eq!(checkpoint.next_index, 2);
        assert!(!checkpoint.is_complete(descendants.len()));
        assert!(driver.task_witness(descendants[0].0).is_some());
        assert!(driver.task_witness(descendants[2].0).is_none());

        let checkpoint = driver
            .propagate_region(region, 1, &CancelReason::parent(), &descendants, checkpoint, 10)
            .unwrap();
        assert!(checkpoint.is_complete(descendants.len()));
        for (task, _, _) in &descendants {
            assert_eq!(driver.task_witness(*task).unwrap().reason.kind, CancelKind::Parent);
        }
    }

    #[test]
    fn task_cancel_never_escapes_upward() {
        let region = RegionId::new_for_test(0, 0);
        let task = TaskId::new_for_test(0, 0);
        let mut driver = CancelDriver::new(8);
        driver.cancel_task(task, region, 1, CancelReason::timeout()).unwrap();
        assert!(driver.region_witness(region).is_none());
    }
}
