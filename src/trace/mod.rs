//! Canonical event trace: the event tuple, its rolling digest, and the
//! bounded ring that accumulates both per resource class.

pub mod digest;
pub mod event;
pub mod ring;

pub use digest::{digest_events, Digest, DigestAccumulator};
pub use event::CanonicalEvent;
pub use ring::{TraceExport, TraceRing};
