//! Core types for the runtime kernel.
//!
//! - [`id`]: Identifier types (`RegionId`, `TaskId`, `ObligationId`, `TimerId`,
//!   `ChannelId`, `Time`)
//! - [`outcome`]: Four-valued outcome type with severity lattice
//! - [`cancel`]: Cancellation reason, kind, phase, and witness types
//! - [`budget`]: Poll-count and time budget with component-wise-min meet

pub mod budget;
pub mod cancel;
pub mod id;
pub mod outcome;

pub use budget::Budget;
pub use cancel::{
    CancelAttributionConfig, CancelCause, CancelKind, CancelPhase, CancelReason, CancelWitness,
    CancelWitnessError,
};
pub use id::{ChannelId, ObligationId, RegionId, TaskId, Time, TimerId};
pub use outcome::{join_outcomes, Outcome, OutcomeError, PanicPayload, Severity};
