//! Control ring for non-acknowledged traffic
//!
//! QoS-0 publishes, subscriptions, pings and other control frames are
//! queued here rather than in the slot pools: they carry no broker
//! acknowledgement to reconcile, so a small fixed ring with coarse expiry
//! is enough. The ring shares the tracker's maintenance tick.

mod message;
mod ring;

pub use message::{ControlKind, ControlMessage, PendingState};
pub use ring::{ControlRing, OutboxTick, RingEntry};
