//! Quiescence predicate: the pure check that decides whether a region
//! subtree has no more work to drive.
//!
//! This is a direct predicate over the live records and handle stores the
//! scheduler already owns, not a separately event-tracked oracle: it is
//! evaluated fresh on every [`crate::scheduler::Scheduler::run`] iteration
//! rather than accumulated incrementally, so there is nothing to get out of
//! sync.

use crate::authority::TaskState;
use crate::error::{Error, ErrorKind, ReasonPointer};
use crate::scheduler::Scheduler;
use crate::types::RegionId;

fn reason(site: &'static str) -> ReasonPointer {
    ReasonPointer::new("quiescence", site)
}

/// Returns `Ok(())` iff `region` and every descendant region has no
/// non-terminal task, no unresolved obligation, and no pending timer.
///
/// On failure, returns the most specific applicable [`ErrorKind`]: task
/// activity is checked before obligation resolution, which is checked
/// before pending timers, since a live task is usually the proximate cause
/// an operator should look at first.
///
/// # Errors
/// See variants above.
pub fn check(scheduler: &Scheduler, region: RegionId) -> Result<(), Error> {
    let subtree_regions = collect_subtree(scheduler, region);

    let tasks_active = scheduler
        .tasks()
        .iter()
        .any(|(_, t)| subtree_regions.contains(&t.region()) && t.state() != TaskState::Completed);
    if tasks_active {
        return Err(Error::new(ErrorKind::TasksStillActive, reason("check")));
    }

    let obligations_unresolved = scheduler.obligations().iter().any(|(_, o)| {
        subtree_regions.contains(&o.region()) && o.state() == crate::authority::ObligationState::Reserved
    });
    if obligations_unresolved {
        return Err(Error::new(ErrorKind::ObligationsUnresolved, reason("check")));
    }

    if !scheduler.timers().is_empty() {
        return Err(Error::new(ErrorKind::TimersPending, reason("check")));
    }

    Ok(())
}

fn collect_subtree(scheduler: &Scheduler, root: RegionId) -> Vec<RegionId> {
    let mut out = vec![root];
    let mut frontier = vec![root];
    while let Some(current) = frontier.pop() {
        if let Ok(record) = scheduler.regions().resolve(current.arena_index()) {
            for &child in record.children() {
                out.push(child);
                frontier.push(child);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TaskPoll;
    use crate::types::Budget;

    #[test]
    fn quiescent_once_all_tasks_complete() {
        let mut scheduler = Scheduler::new(4, 4, 4, 4, 8);
        let region = scheduler.open_region(None).unwrap();
        scheduler
            .spawn(region, Budget::INFINITE, Box::new(|| TaskPoll::Complete(crate::types::Outcome::Ok)))
            .unwrap();
        assert_eq!(check(&scheduler, region), Err(Error::new(ErrorKind::TasksStillActive, reason("check"))));
        scheduler.run(region, Budget::new().with_poll_quota(10)).unwrap();
        assert!(check(&scheduler, region).is_ok());
    }

    #[test]
    fn pending_obligation_blocks_quiescence() {
        let mut scheduler = Scheduler::new(4, 4, 4, 4, 8);
        let region = scheduler.open_region(None).unwrap();
        scheduler.reserve_obligation(region).unwrap();
        assert_eq!(
            check(&scheduler, region),
            Err(Error::new(ErrorKind::ObligationsUnresolved, reason("check")))
        );
    }

    #[test]
    fn child_region_task_blocks_parent_quiescence() {
        let mut scheduler = Scheduler::new(4, 4, 4, 4, 8);
        let root = scheduler.open_region(None).unwrap();
        let child = scheduler.open_region(Some(root)).unwrap();
        scheduler
            .spawn(child, Budget::INFINITE, Box::new(|| TaskPoll::Pending))
            .unwrap();
        assert_eq!(
            check(&scheduler, root),
            Err(Error::new(ErrorKind::TasksStillActive, reason("check")))
        );
    }
}
