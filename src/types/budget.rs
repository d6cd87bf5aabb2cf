//! Poll-count and time budgets with component-wise-min meet semantics.

use core::fmt;
use std::time::Duration;

/// A poll-count and time quota pair.
///
/// `meet(a, b)` takes the component-wise minimum of each quota — the
/// tightest of any two budgets in effect. A budget is exhausted once either
/// component reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// Remaining poll quota.
    pub poll_quota: u32,
    /// Remaining time quota, in nanoseconds.
    pub time_quota_nanos: u64,
    /// Scheduling priority carried alongside the budget (higher runs
    /// sooner in the cancel lane); not part of the meet, purely advisory.
    pub priority: u8,
}

impl Budget {
    /// An unbounded budget — used for tasks with no admission-time limit.
    pub const INFINITE: Self = Self {
        poll_quota: u32::MAX,
        time_quota_nanos: u64::MAX,
        priority: 0,
    };

    /// A zero budget — immediately exhausted.
    pub const ZERO: Self = Self {
        poll_quota: 0,
        time_quota_nanos: 0,
        priority: 0,
    };

    /// Starts building a budget with an infinite quota and default
    /// priority, ready to be narrowed with the `with_*` builders.
    #[must_use]
    pub const fn new() -> Self {
        Self::INFINITE
    }

    /// Sets the poll quota.
    #[must_use]
    pub const fn with_poll_quota(mut self, quota: u32) -> Self {
        self.poll_quota = quota;
        self
    }

    /// Sets the time quota from a [`Duration`].
    #[must_use]
    pub fn with_time_quota(mut self, quota: Duration) -> Self {
        self.time_quota_nanos = quota.as_nanos().min(u128::from(u64::MAX)) as u64;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// The component-wise minimum of two budgets (the tighter of the two).
    /// Priority takes the higher of the two, since a tighter budget usually
    /// comes from a more urgent cancel kind.
    #[must_use]
    pub fn meet(self, other: Self) -> Self {
        Self {
            poll_quota: self.poll_quota.min(other.poll_quota),
            time_quota_nanos: self.time_quota_nanos.min(other.time_quota_nanos),
            priority: self.priority.max(other.priority),
        }
    }

    /// True if either quota has reached zero.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.poll_quota == 0 || self.time_quota_nanos == 0
    }

    /// Consumes one poll from the quota, saturating at zero.
    pub fn consume_poll(&mut self) {
        self.poll_quota = self.poll_quota.saturating_sub(1);
    }

    /// Consumes elapsed time from the quota, saturating at zero.
    pub fn consume_time(&mut self, elapsed: Duration) {
        let nanos = elapsed.as_nanos().min(u128::from(u64::MAX)) as u64;
        self.time_quota_nanos = self.time_quota_nanos.saturating_sub(nanos);
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Budget(polls={}, time={}ns, prio={})",
            self.poll_quota, self.time_quota_nanos, self.priority
        )
    }
}
