//! Public facade wiring admission, reconciliation, and maintenance

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{OutflightError, Result};
use crate::outbox::{ControlKind, ControlMessage, ControlRing, OutboxTick};
use crate::time::{Clock, MonotonicClock};
use crate::transport::Transport;

use super::allocator::{SlotAddr, SlotAllocator};
use super::config::QueueConfig;
use super::reconciler;
use super::stats::QueueStats;
use super::sweeper::{self, SweepReport};

/// QoS level of the acknowledged publish path
const TRACKED_QOS: u8 = 1;

/// Publish-tracking queue for at-least-once delivery
///
/// Sits between a producer and a transport client: every
/// acknowledgement-bearing publish is copied into a slot until the broker
/// confirms it, the ack window expires, or the slot is evicted under
/// overload. All operations run to completion on the caller's thread; a
/// multi-threaded host must serialise them behind one lock.
#[derive(Debug)]
pub struct PublishTracker {
    config: QueueConfig,
    alloc: SlotAllocator,
    outbox: ControlRing,
    stats: QueueStats,
    clock: Arc<dyn Clock>,
    last_stats_log_us: Option<u64>,
}

impl PublishTracker {
    /// Create a tracker with the production monotonic clock
    pub fn new(config: QueueConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Create a tracker driven by an external clock
    pub fn with_clock(config: QueueConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            alloc: SlotAllocator::new(&config),
            outbox: ControlRing::new(config.outbox_ring_cap),
            stats: QueueStats::new(),
            clock,
            last_stats_log_us: None,
            config,
        })
    }

    /// Publish a tracked message through the transport
    ///
    /// Copies topic and payload into a slot (clamping overlong values with
    /// a warning), runs a hygiene sweep, sends through the transport at
    /// QoS 1, and records the assigned id for later reconciliation. On a
    /// transport failure the slot is released before returning.
    pub fn publish(
        &mut self,
        transport: &mut dyn Transport,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<i32> {
        let addr = self.admit(topic, payload, retain, crate::slots::FREE_MSG_ID)?;

        let msg_id = transport.publish(
            self.alloc.topic(addr),
            self.alloc.payload(addr),
            TRACKED_QOS,
            retain,
        );
        if msg_id < 0 {
            error!(code = msg_id, topic, "transport publish failed, releasing slot");
            let now_us = self.clock.now_us();
            self.alloc.release(addr, now_us);
            return Err(OutflightError::transport(msg_id));
        }

        self.alloc.slot_mut(addr).msg_id = msg_id;
        info!(msg_id, topic, payload_len = payload.len(), "tracked and published");
        self.log_occupancy();
        Ok(msg_id)
    }

    /// Register a message the transport has already emitted
    ///
    /// Same admission path as [`publish`](Self::publish) but no send; the
    /// supplied id is stored verbatim. Negative ids act as provisional
    /// handles until [`rebind`](Self::rebind) supplies the final one.
    pub fn track(&mut self, topic: &str, payload: &[u8], retain: bool, msg_id: i32) -> Result<i32> {
        self.admit(topic, payload, retain, msg_id)?;
        info!(msg_id, topic, payload_len = payload.len(), "tracked");
        self.log_occupancy();
        Ok(msg_id)
    }

    /// Replace a provisional id with the transport's final id
    pub fn rebind(&mut self, provisional_id: i32, final_id: i32) {
        reconciler::rebind_msg_id(&mut self.alloc, provisional_id, final_id);
    }

    /// Settle a broker acknowledgement
    ///
    /// Returns whether a slot was freed; late and duplicate acks return
    /// `false` after a diagnostics bump.
    pub fn on_published(&mut self, msg_id: i32) -> bool {
        let now_us = self.clock.now_us();
        reconciler::settle_ack(&mut self.alloc, &mut self.stats, msg_id, now_us)
    }

    /// Periodic maintenance entry point
    ///
    /// Expires overdue slots, reclaims idle dynamic blocks, drops stale
    /// control entries, and emits the periodic diagnostics dump. Safe to
    /// drive at any frequency.
    pub fn tick(&mut self) -> SweepReport {
        let now_us = self.clock.now_us();
        let report = sweeper::sweep(&mut self.alloc, &mut self.stats, &self.config, now_us);

        let now_tick = (now_us / 1_000) as OutboxTick;
        let control_timeout = self.config.control_timeout.as_millis() as OutboxTick;
        self.outbox.delete_expired(now_tick, control_timeout);

        let interval_us = self.config.stats_log_interval.as_micros() as u64;
        let due = match self.last_stats_log_us {
            None => true,
            Some(last) => now_us.saturating_sub(last) >= interval_us,
        };
        if due {
            self.log_diagnostics();
            self.last_stats_log_us = Some(now_us);
        }
        report
    }

    /// Drop every tracked message, dynamic block, and control entry
    ///
    /// Also zeroes diagnostics. Idempotent; doubles as re-initialisation
    /// on reconnect.
    pub fn clear_all(&mut self) {
        self.alloc.clear();
        self.outbox.clear();
        self.stats.reset();
        info!("publish tracker cleared");
    }

    /// Queue a control-path message, stamped with the tracker's clock
    pub fn enqueue_control(&mut self, msg: ControlMessage) -> Result<usize> {
        let tick = (self.clock.now_us() / 1_000) as OutboxTick;
        self.outbox.enqueue(msg, tick)
    }

    /// Remove a control entry, settling publish deletes as acks first
    pub fn delete_control(&mut self, msg_id: i32, kind: ControlKind) -> bool {
        if kind == ControlKind::Publish {
            // A deleted publish means the broker answered it; let the slot
            // queue reconcile before the ring forgets the id.
            self.on_published(msg_id);
        }
        self.outbox.delete(msg_id)
    }

    /// The control ring
    pub fn control_ring(&self) -> &ControlRing {
        &self.outbox
    }

    /// Mutable access to the control ring
    pub fn control_ring_mut(&mut self) -> &mut ControlRing {
        &mut self.outbox
    }

    /// Current control-ring byte accounting
    pub fn size(&self) -> usize {
        self.outbox.total_bytes()
    }

    /// Snapshot of the diagnostics counters
    pub fn stats(&self) -> QueueStats {
        self.stats.clone()
    }

    /// Occupied slots across both tiers
    pub fn occupied(&self) -> usize {
        self.alloc.occupied()
    }

    /// Live dynamic blocks
    pub fn dyn_block_count(&self) -> usize {
        self.alloc.dyn_pool().block_count()
    }

    /// The active configuration
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Emit the diagnostics dump at info level
    pub fn log_diagnostics(&self) {
        info!(
            max_burst = self.stats.max_burst,
            max_payload_len = self.stats.max_payload_len,
            timeout_count = self.stats.timeout_count,
            late_ack_count = self.stats.late_ack_count,
            dyn_blocks = self.alloc.dyn_pool().block_count(),
            "queue diagnostics"
        );
    }

    /// Shared admission path for `publish` and `track`
    fn admit(&mut self, topic: &str, payload: &[u8], retain: bool, msg_id: i32) -> Result<SlotAddr> {
        if topic.is_empty() {
            error!("admission refused: empty topic");
            return Err(OutflightError::invalid_argument("topic must be non-empty"));
        }

        let topic = clamp_topic(topic, self.config.topic_max - 1);
        let payload = clamp_payload(payload, self.config.payload_max - 1);

        // Hygiene pass so stale occupants never force an eviction.
        let now_us = self.clock.now_us();
        sweeper::sweep(&mut self.alloc, &mut self.stats, &self.config, now_us);

        let addr = self.alloc.acquire().ok_or(OutflightError::NoCapacity)?;
        self.alloc.fill(addr, topic, payload, retain, msg_id, now_us);

        self.stats.record_burst(self.alloc.occupied());
        self.stats.record_payload_len(payload.len());
        Ok(addr)
    }

    /// Per-slot occupancy listing at debug level
    fn log_occupancy(&self) {
        for (idx, slot) in self.alloc.static_pool().iter().enumerate() {
            if slot.in_use {
                debug!(tier = "static", idx, msg_id = slot.msg_id, "slot occupied");
            }
        }
        for (block, blk) in self.alloc.dyn_pool().iter().enumerate() {
            for (slot, record) in blk.bank().iter().enumerate() {
                if record.in_use {
                    debug!(tier = "dynamic", block, slot, msg_id = record.msg_id, "slot occupied");
                }
            }
        }
        debug!(
            occupied = self.alloc.occupied(),
            capacity = self.config.max_tracked(),
            dyn_blocks = self.alloc.dyn_pool().block_count(),
            "queue occupancy"
        );
    }
}

/// Clamp a topic to `max` bytes without splitting a UTF-8 sequence
fn clamp_topic(topic: &str, max: usize) -> &str {
    if topic.len() <= max {
        return topic;
    }
    let mut end = max;
    while end > 0 && !topic.is_char_boundary(end) {
        end -= 1;
    }
    warn!(len = topic.len(), max, "topic exceeds capacity, clamping");
    &topic[..end]
}

/// Clamp a payload to `max` bytes
fn clamp_payload(payload: &[u8], max: usize) -> &[u8] {
    if payload.len() <= max {
        return payload;
    }
    warn!(len = payload.len(), max, "payload exceeds capacity, clamping");
    &payload[..max]
}
