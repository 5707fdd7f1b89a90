//! Tracker configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OutflightError, Result};

/// Default number of always-resident slots
pub const DEFAULT_STATIC_SLOTS: usize = 3;
/// Default slots per dynamic block
pub const DEFAULT_DYN_BLOCK_SLOTS: usize = 3;
/// Default maximum number of dynamic blocks
pub const DEFAULT_MAX_DYNAMIC_BLOCKS: usize = 8;
/// Default topic buffer capacity (bytes, including NUL)
pub const DEFAULT_TOPIC_MAX: usize = 128;
/// Default payload buffer capacity (bytes)
pub const DEFAULT_PAYLOAD_MAX: usize = 512;
/// Default acknowledgement timeout
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_millis(5_000);
/// Default idle period before a dynamic block is reclaimed
pub const DEFAULT_DYN_BLOCK_IDLE_TIMEOUT: Duration = Duration::from_millis(60_000);
/// Default control ring capacity
pub const DEFAULT_OUTBOX_RING_CAP: usize = 8;
/// Default control entry expiry
pub const DEFAULT_CONTROL_TIMEOUT: Duration = Duration::from_millis(30_000);
/// Default interval between periodic diagnostics dumps
pub const DEFAULT_STATS_LOG_INTERVAL: Duration = Duration::from_millis(20_000);

/// Configuration for a [`PublishTracker`](crate::PublishTracker)
///
/// The steady-state working set is `static_slots`; bursts overflow into up
/// to `max_dynamic_blocks` blocks of `dyn_block_slots` slots each, so the
/// resident ceiling is
/// `(static_slots + max_dynamic_blocks * dyn_block_slots) * (topic_max + payload_max)`
/// plus fixed overhead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Always-resident slot count (N1)
    pub static_slots: usize,
    /// Slots per dynamic block (N2)
    pub dyn_block_slots: usize,
    /// Maximum dynamic blocks (B)
    pub max_dynamic_blocks: usize,
    /// Topic buffer capacity per slot; stored topics are at most one byte shorter
    pub topic_max: usize,
    /// Payload buffer capacity per slot; stored payloads are at most one byte shorter
    pub payload_max: usize,
    /// How long a slot may await its acknowledgement
    pub ack_timeout: Duration,
    /// How long a fully-free dynamic block survives before reclamation
    pub dyn_block_idle_timeout: Duration,
    /// Control ring capacity (R)
    pub outbox_ring_cap: usize,
    /// Expiry for control ring entries
    pub control_timeout: Duration,
    /// Minimum interval between periodic diagnostics dumps from `tick`
    pub stats_log_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            static_slots: DEFAULT_STATIC_SLOTS,
            dyn_block_slots: DEFAULT_DYN_BLOCK_SLOTS,
            max_dynamic_blocks: DEFAULT_MAX_DYNAMIC_BLOCKS,
            topic_max: DEFAULT_TOPIC_MAX,
            payload_max: DEFAULT_PAYLOAD_MAX,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            dyn_block_idle_timeout: DEFAULT_DYN_BLOCK_IDLE_TIMEOUT,
            outbox_ring_cap: DEFAULT_OUTBOX_RING_CAP,
            control_timeout: DEFAULT_CONTROL_TIMEOUT,
            stats_log_interval: DEFAULT_STATS_LOG_INTERVAL,
        }
    }
}

impl QueueConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the static slot count
    pub fn with_static_slots(mut self, count: usize) -> Self {
        self.static_slots = count;
        self
    }

    /// Set the slots per dynamic block
    pub fn with_dyn_block_slots(mut self, count: usize) -> Self {
        self.dyn_block_slots = count;
        self
    }

    /// Set the maximum number of dynamic blocks
    pub fn with_max_dynamic_blocks(mut self, count: usize) -> Self {
        self.max_dynamic_blocks = count;
        self
    }

    /// Set the topic buffer capacity
    pub fn with_topic_max(mut self, cap: usize) -> Self {
        self.topic_max = cap;
        self
    }

    /// Set the payload buffer capacity
    pub fn with_payload_max(mut self, cap: usize) -> Self {
        self.payload_max = cap;
        self
    }

    /// Set the acknowledgement timeout
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Set the dynamic block idle timeout
    pub fn with_dyn_block_idle_timeout(mut self, timeout: Duration) -> Self {
        self.dyn_block_idle_timeout = timeout;
        self
    }

    /// Set the control ring capacity
    pub fn with_outbox_ring_cap(mut self, cap: usize) -> Self {
        self.outbox_ring_cap = cap;
        self
    }

    /// Set the control entry expiry
    pub fn with_control_timeout(mut self, timeout: Duration) -> Self {
        self.control_timeout = timeout;
        self
    }

    /// Set the periodic diagnostics interval
    pub fn with_stats_log_interval(mut self, interval: Duration) -> Self {
        self.stats_log_interval = interval;
        self
    }

    /// Maximum number of simultaneously occupied slots
    pub fn max_tracked(&self) -> usize {
        self.static_slots + self.max_dynamic_blocks * self.dyn_block_slots
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.static_slots == 0 {
            return Err(OutflightError::invalid_parameter(
                "static_slots",
                "Static pool must hold at least one slot",
            ));
        }
        if self.dyn_block_slots == 0 {
            return Err(OutflightError::invalid_parameter(
                "dyn_block_slots",
                "Dynamic blocks must hold at least one slot",
            ));
        }
        if self.topic_max < 2 {
            return Err(OutflightError::invalid_parameter(
                "topic_max",
                "Topic capacity must fit at least one byte plus terminator",
            ));
        }
        if self.payload_max < 2 {
            return Err(OutflightError::invalid_parameter(
                "payload_max",
                "Payload capacity must fit at least one byte plus terminator",
            ));
        }
        if self.topic_max > u16::MAX as usize || self.payload_max > u16::MAX as usize {
            return Err(OutflightError::invalid_parameter(
                "topic_max/payload_max",
                "Buffer capacities must fit in a u16 length field",
            ));
        }
        if self.outbox_ring_cap == 0 {
            return Err(OutflightError::invalid_parameter(
                "outbox_ring_cap",
                "Control ring must hold at least one entry",
            ));
        }
        if self.ack_timeout.is_zero() {
            return Err(OutflightError::invalid_parameter(
                "ack_timeout",
                "Ack timeout cannot be zero",
            ));
        }
        Ok(())
    }
}
