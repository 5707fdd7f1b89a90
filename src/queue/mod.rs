//! The tracked-publish queue: admission, reconciliation, maintenance
//!
//! [`PublishTracker`] is the public surface; the submodules carry the
//! admission policy ([`allocator`]), acknowledgement settlement
//! ([`reconciler`]), periodic maintenance ([`sweeper`]), and the
//! monotonic diagnostics ([`stats`]).

pub mod allocator;
pub mod config;
pub mod reconciler;
pub mod stats;
pub mod sweeper;
mod tracker;


pub use allocator::{SlotAddr, SlotAllocator};
pub use config::QueueConfig;
pub use stats::QueueStats;
pub use sweeper::SweepReport;
pub use tracker::PublishTracker;
