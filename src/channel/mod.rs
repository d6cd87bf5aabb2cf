//! Bounded two-phase channel primitives.

pub mod mpsc;

pub use mpsc::{Channel, ChannelError, Permit};
