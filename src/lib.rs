//! # Outflight - Publish Tracking for At-Least-Once Delivery
//!
//! Outflight is a two-tier publish-tracking queue for long-running,
//! resource-constrained processes. It sits between a message producer and
//! a transport client, keeping a copy of every acknowledgement-bearing
//! publish until the broker confirms it, the ack window expires, or the
//! queue sheds it under overload.
//!
//! ## Features
//!
//! - **Tiered slot storage**: a small always-resident pool plus elastic
//!   overflow blocks that absorb bursts
//! - **Bounded memory**: per-block contiguous buffer arenas, no per-slot
//!   allocation, a hard resident ceiling
//! - **Graceful degradation**: oldest-victim eviction under sustained
//!   overload instead of refusal
//! - **Idle reclamation**: overflow blocks are returned to the allocator
//!   only after a tunable quiet period, avoiding alloc/free thrash
//! - **Ack reconciliation**: late, duplicate, and provisional-id
//!   acknowledgements settle without panics
//! - **Control ring**: a secondary fixed ring for traffic that carries no
//!   acknowledgement, sharing the same maintenance tick
//!
//! ## Architecture
//!
//! ```text
//! producer ──► PublishTracker::publish ──► SlotAllocator ──► Transport
//!                    │                     static pool │
//!                    │                     dyn blocks  │
//! transport ──► on_published ──► reconciler ── frees slot
//! scheduler ──► tick ──► sweeper ── timeouts + idle-block reclamation
//! ```
//!
//! All operations run to completion on the caller's thread; hosts with
//! more than one thread serialise the public entry points behind a single
//! lock.

pub mod error;
pub mod outbox;
pub mod queue;
pub mod slots;
pub mod time;
pub mod transport;

pub use error::{OutflightError, Result};
pub use outbox::{ControlKind, ControlMessage, ControlRing, OutboxTick, PendingState};
pub use queue::{PublishTracker, QueueConfig, QueueStats, SlotAddr, SweepReport};
pub use slots::{DynBlock, DynPool, Slot, SlotBank, FREE_MSG_ID};
pub use time::{Clock, ManualClock, MonotonicClock};
pub use transport::Transport;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
