//! The versioned runtime configuration surface every profile resolves
//! against.
//!
//! Constructible three ways: programmatically via [`RuntimeConfigBuilder`] (always
//! available), from a `serde_json::Value` (always available), or from a
//! TOML file (gated behind the `config-file` feature). Validation runs
//! once, in [`RuntimeConfigBuilder::build`], and never produces a
//! partially-validated config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, ReasonPointer};
use crate::profile::{OverloadPolicy, Profile};

fn reason(site: &'static str) -> ReasonPointer {
    ReasonPointer::new("config", site)
}

/// How a task or scheduler idles while waiting for work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitPolicy {
    /// Spin without yielding; lowest latency, highest CPU cost.
    BusySpin,
    /// Yield the OS thread between checks.
    Yield,
    /// Sleep for a short, bounded interval between checks.
    Sleep,
}

/// How an unresolved obligation at region close is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeakResponse {
    /// Panic immediately.
    Panic,
    /// Log via the registered [`crate::platform::LogSink`] and continue.
    Log,
    /// Silently mark the obligation `Leaked` and continue.
    Silent,
    /// Attempt policy-defined recovery before marking `Leaked`.
    Recover,
}

/// How a finalizer that exceeds its cleanup budget is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalizerEscalation {
    /// Force-complete quietly.
    Soft,
    /// Force-complete and log, bounded to avoid log storms.
    BoundedLog,
    /// Force-complete and panic, bounded to avoid panic storms.
    BoundedPanic,
}

/// Per-resource-class arena and trace-ring capacity ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCeilings {
    /// Maximum concurrently live regions.
    pub region_capacity: u32,
    /// Maximum concurrently live tasks.
    pub task_capacity: u32,
    /// Maximum concurrently live obligations.
    pub obligation_capacity: u32,
    /// Maximum concurrently armed timers.
    pub timer_capacity: u32,
    /// Trace ring capacity (events retained before overwrite).
    pub trace_ring_capacity: u32,
}

impl ResourceCeilings {
    fn validate(&self) -> Result<(), Error> {
        if self.region_capacity == 0
            || self.task_capacity == 0
            || self.obligation_capacity == 0
            || self.timer_capacity == 0
            || self.trace_ring_capacity == 0
        {
            return Err(Error::new(ErrorKind::InvalidArgument, reason("resource_ceilings")));
        }
        Ok(())
    }
}

/// The versioned, validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// The active profile.
    pub profile: Profile,
    /// How idling work waits.
    pub wait_policy: WaitPolicy,
    /// How unresolved-obligation leaks are handled at region close.
    pub leak_response: LeakResponse,
    /// Poll-count budget granted to a cancel finalizer.
    pub finalizer_poll_budget: u32,
    /// Time budget granted to a cancel finalizer.
    pub finalizer_time_budget: Duration,
    /// Escalation behavior when a finalizer exceeds its budget.
    pub finalizer_escalation: FinalizerEscalation,
    /// Maximum region-subtree depth a cancel propagation will traverse.
    pub max_cancel_chain_depth: u32,
    /// Maximum in-flight propagation-checkpoint memory (entries).
    pub max_cancel_chain_memory: u32,
    /// Arena/trace-ring capacity ceilings.
    pub resource_contract_ceilings: ResourceCeilings,
    /// The overload policy resolved for `profile` at build time.
    pub overload_policy: OverloadPolicy,
}

impl RuntimeConfig {
    /// Starts a new builder.
    #[must_use]
    pub fn builder(profile: Profile) -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::new(profile)
    }

    /// Parses a `RuntimeConfig` from a JSON value.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidArgument`] if the value doesn't match
    /// the schema.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, Error> {
        serde_json::from_value(value.clone()).map_err(|_| Error::new(ErrorKind::InvalidArgument, reason("from_json_value")))
    }

    /// Parses a `RuntimeConfig` from a JSON string.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidArgument`] if the string isn't valid
    /// JSON or doesn't match the schema.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|_| Error::new(ErrorKind::InvalidArgument, reason("from_json_str")))
    }

    /// Parses a `RuntimeConfig` from a TOML document.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidArgument`] if the document isn't valid
    /// TOML or doesn't match the schema.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(toml_text: &str) -> Result<Self, Error> {
        toml::from_str(toml_text).map_err(|_| Error::new(ErrorKind::InvalidArgument, reason("from_toml_str")))
    }
}

/// Builds and validates a [`RuntimeConfig`].
#[derive(Debug, Clone)]
pub struct RuntimeConfigBuilder {
    profile: Profile,
    wait_policy: WaitPolicy,
    leak_response: LeakResponse,
    finalizer_poll_budget: u32,
    finalizer_time_budget: Duration,
    finalizer_escalation: FinalizerEscalation,
    max_cancel_chain_depth: u32,
    max_cancel_chain_memory: u32,
    resource_contract_ceilings: ResourceCeilings,
}

impl RuntimeConfigBuilder {
    /// Starts a builder with conservative defaults for `profile`.
    #[must_use]
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            wait_policy: WaitPolicy::Yield,
            leak_response: LeakResponse::Log,
            finalizer_poll_budget: 64,
            finalizer_time_budget: Duration::from_millis(50),
            finalizer_escalation: FinalizerEscalation::BoundedLog,
            max_cancel_chain_depth: 64,
            max_cancel_chain_memory: 256,
            resource_contract_ceilings: ResourceCeilings {
                region_capacity: 1024,
                task_capacity: 4096,
                obligation_capacity: 4096,
                timer_capacity: 1024,
                trace_ring_capacity: 8192,
            },
        }
    }

    /// Sets the wait policy.
    #[must_use]
    pub const fn wait_policy(mut self, wait_policy: WaitPolicy) -> Self {
        self.wait_policy = wait_policy;
        self
    }

    /// Sets the obligation-leak response.
    #[must_use]
    pub const fn leak_response(mut self, leak_response: LeakResponse) -> Self {
        self.leak_response = leak_response;
        self
    }

    /// Sets the finalizer's poll-count budget.
    #[must_use]
    pub const fn finalizer_poll_budget(mut self, budget: u32) -> Self {
        self.finalizer_poll_budget = budget;
        self
    }

    /// Sets the finalizer's time budget.
    #[must_use]
    pub const fn finalizer_time_budget(mut self, budget: Duration) -> Self {
        self.finalizer_time_budget = budget;
        self
    }

    /// Sets the finalizer escalation behavior.
    #[must_use]
    pub const fn finalizer_escalation(mut self, escalation: FinalizerEscalation) -> Self {
        self.finalizer_escalation = escalation;
        self
    }

    /// Sets the maximum cancel-chain propagation depth.
    #[must_use]
    pub const fn max_cancel_chain_depth(mut self, depth: u32) -> Self {
        self.max_cancel_chain_depth = depth;
        self
    }

    /// Sets the maximum cancel-chain checkpoint memory.
    #[must_use]
    pub const fn max_cancel_chain_memory(mut self, memory: u32) -> Self {
        self.max_cancel_chain_memory = memory;
        self
    }

    /// Sets the resource-contract ceilings.
    #[must_use]
    pub const fn resource_contract_ceilings(mut self, ceilings: ResourceCeilings) -> Self {
        self.resource_contract_ceilings = ceilings;
        self
    }

    /// Validates and finalizes the configuration.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidArgument`] if arena capacities are zero,
    /// the resolved overload policy fails its structural validation, or
    /// `Hft`'s forbidden flags are contradicted by the chosen wait/leak
    /// policy (busy-spin is mandatory; shed-oriented leak recovery is
    /// disallowed).
    pub fn build(self) -> Result<RuntimeConfig, Error> {
        self.resource_contract_ceilings.validate()?;
        let overload_policy = crate::profile::policy_for(self.profile);
        overload_policy.validate()?;

        if self.profile == Profile::Hft && self.wait_policy != WaitPolicy::BusySpin {
            return Err(Error::new(ErrorKind::InvalidArgument, reason("hft_requires_busy_spin")));
        }

        Ok(RuntimeConfig {
            profile: self.profile,
            wait_policy: self.wait_policy,
            leak_response: self.leak_response,
            finalizer_poll_budget: self.finalizer_poll_budget,
            finalizer_time_budget: self.finalizer_time_budget,
            finalizer_escalation: self.finalizer_escalation,
            max_cancel_chain_depth: self.max_cancel_chain_depth,
            max_cancel_chain_memory: self.max_cancel_chain_memory,
            resource_contract_ceilings: self.resource_contract_ceilings,
            overload_policy,
        })
    }
}
