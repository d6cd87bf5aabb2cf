//! Live obligation record: linear reserve/resolve tracking.

use crate::authority::ObligationState;
use crate::types::{ObligationId, RegionId};

/// How an obligation reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPath {
    /// Resolved by an explicit `commit` call.
    Commit,
    /// Resolved by an explicit `abort` call.
    Abort,
    /// Marked `Leaked` by region-close policy.
    LeakPolicy,
}

/// The live record for one reserved obligation.
#[derive(Debug, Clone)]
pub struct ObligationRecord {
    id: ObligationId,
    region: RegionId,
    state: ObligationState,
    resolution: Option<ResolutionPath>,
}

impl ObligationRecord {
    /// Creates an obligation record in the `Reserved` state.
    #[must_use]
    pub const fn new(id: ObligationId, region: RegionId) -> Self {
        Self {
            id,
            region,
            state: ObligationState::Reserved,
            resolution: None,
        }
    }

    /// This obligation's identifier.
    #[must_use]
    pub const fn id(&self) -> ObligationId {
        self.id
    }

    /// Overwrites the identifier once the owning arena handle is known.
    pub(crate) fn set_id(&mut self, id: ObligationId) {
        self.id = id;
    }

    /// The owning region.
    #[must_use]
    pub const fn region(&self) -> RegionId {
        self.region
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ObligationState {
        self.state
    }

    /// How this obligation was resolved, once terminal.
    #[must_use]
    pub const fn resolution(&self) -> Option<ResolutionPath> {
        self.resolution
    }

    /// Resolves via commit.
    ///
    /// # Errors
    /// Returns `Err(())` if the obligation is already resolved.
    pub fn commit(&mut self) -> Result<(), ()> {
        self.resolve(ObligationState::Committed, ResolutionPath::Commit)
    }

    /// Resolves via abort.
    ///
    /// # Errors
    /// Returns `Err(())` if the obligation is already resolved.
    pub fn abort(&mut self) -> Result<(), ()> {
        self.resolve(ObligationState::Aborted, ResolutionPath::Abort)
    }

    /// Marks `Leaked` as a region-close policy action.
    ///
    /// # Errors
    /// Returns `Err(())` if the obligation is already resolved.
    pub fn mark_leaked(&mut self) -> Result<(), ()> {
        self.resolve(ObligationState::Leaked, ResolutionPath::LeakPolicy)
    }

    fn resolve(&mut self, next: ObligationState, path: ResolutionPath) -> Result<(), ()> {
        if !self.state.can_transition_to(next) {
            return Err(());
        }
        self.state = next;
        self.resolution = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ObligationRecord {
        ObligationRecord::new(ObligationId::new_for_test(0, 0), RegionId::new_for_test(0, 0))
    }

    #[test]
    fn commit_resolves_exactly_once() {
        let mut o = record();
        assert!(o.commit().is_ok());
        assert_eq!(o.state(), ObligationState::Committed);
        assert_eq!(o.resolution(), Some(ResolutionPath::Commit));
        assert!(o.commit().is_err());
    }

    #[test]
    fn abort_resolves_exactly_once() {
        let mut o = record();
        assert!(o.abort().is_ok());
        assert!(o.abort().is_err());
        assert!(o.commit().is_err());
    }

    #[test]
    fn leak_policy_only_applies_to_reserved() {
        let mut o = record();
        assert!(o.mark_leaked().is_ok());
        assert_eq!(o.state(), ObligationState::Leaked);

        let mut committed = record();
        committed.commit().unwrap();
        assert!(committed.mark_leaked().is_err());
    }
}
