//! Cancel protocol driver: witness lifecycle and propagation.

pub mod protocol;

pub use protocol::{CancelDriver, PropagationCheckpoint};
