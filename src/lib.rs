//! asx: a portable, deterministic execution substrate for regions, tasks,
//! and obligations.
//!
//! # Overview
//!
//! Every task is owned by a region that closes only once quiescent.
//! Cancellation is a monotone, checkpointed protocol, never a silent drop.
//! Obligations are linear reserve/resolve tokens. Running the same
//! scenario twice under the same seed, profile, and resource class yields
//! byte-identical canonical event streams and digests.
//!
//! # Core guarantees
//!
//! - **No orphan tasks**: every spawned task is owned by a region; region
//!   close requires the whole subtree to be quiescent first.
//! - **Cancel-correctness**: cancellation is request → drain → finalize,
//!   strengthening-only, never silently skipped.
//! - **Bounded cleanup**: per-cancel-kind cleanup budgets are enforced, not
//!   advisory.
//! - **Linear obligations**: every obligation resolves exactly once, via
//!   commit or abort.
//! - **Deterministic replay**: identical scenario + seed + profile + class
//!   produces identical digests.
//!
//! # Module structure
//!
//! - [`types`]: identifiers, outcomes, budgets, cancellation types.
//! - [`authority`]: transition-legality tables for regions/tasks/obligations.
//! - [`record`]: the live per-entity records the authorities gate.
//! - [`handle_store`]: generation-tagged arena handles shared by every
//!   entity kind.
//! - [`timer`]: hierarchical timer wheel.
//! - [`channel`]: bounded two-phase MPSC channel.
//! - [`cancel`]: cancel protocol driver and checkpointed propagation.
//! - [`scheduler`]: the single-threaded cooperative run loop.
//! - [`quiescence`]: the pure quiescence predicate.
//! - [`trace`]: canonical event tuple, rolling digest, trace ring.
//! - [`profile`]: profile table and overload-policy catalog.
//! - [`adapters`]: optional vertical adapters (HFT, automotive, router).
//! - [`platform`]: platform hook traits (clock, entropy, log sink).
//! - [`fixture`]: scenario fixture semantic-key contract.
//! - [`config`]: the versioned runtime configuration surface.
//! - [`region`]: the public `Runtime` API gluing the above together.
//! - [`error`](mod@error): error taxonomy, reason pointers, error ledger.
//! - [`util`]: deterministic hashing/RNG and the generic arena.
//!
//! # API stability
//!
//! asx is in the 0.x series. Public items should be treated as
//! **unstable** and subject to change.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_inception)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod adapters;
pub mod authority;
pub mod cancel;
pub mod channel;
pub mod config;
pub mod error;
pub mod fixture;
pub mod handle_store;
pub mod platform;
pub mod profile;
pub mod quiescence;
pub mod record;
pub mod region;
pub mod scheduler;
pub mod timer;
pub mod trace;
pub mod types;
pub mod util;

pub use config::RuntimeConfig;
pub use error::{Error, ErrorKind, Result};
pub use region::Runtime;
pub use scheduler::Scheduler;
pub use types::{Budget, CancelKind, CancelPhase, CancelReason, Outcome, Severity, Time};
