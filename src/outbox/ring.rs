//! Fixed ring for control/non-acknowledged traffic

use tracing::{debug, warn};

use crate::error::{OutflightError, Result};

use super::message::{ControlKind, ControlMessage, PendingState};

/// Tick type for ring entry ages (milliseconds on the caller's timebase)
pub type OutboxTick = i64;

/// One occupied ring position
#[derive(Debug, Clone)]
pub struct RingEntry {
    /// The stored message
    pub msg: ControlMessage,
    /// Delivery state tag
    pub state: PendingState,
    /// Tick recorded at enqueue or via [`ControlRing::set_tick`]
    pub tick: OutboxTick,
}

/// Small secondary ring for messages that carry no acknowledgement
///
/// Entries are addressed by position (`0..capacity`). When the ring is
/// full, `enqueue` overwrites index 0; that drop policy is a documented
/// degradation for control traffic, which is cheap to regenerate.
#[derive(Debug)]
pub struct ControlRing {
    entries: Box<[Option<RingEntry>]>,
    total_bytes: usize,
}

impl ControlRing {
    /// Create a ring of `capacity` free positions
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity].into_boxed_slice(),
            total_bytes: 0,
        }
    }

    /// Ring capacity
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied positions
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Whether no position is occupied
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.is_none())
    }

    /// Byte accounting: sum of `data + remaining` over occupied entries
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Store a message, returning its position
    ///
    /// QoS-1 publishes are refused; they belong in the slot queue where
    /// acknowledgements can settle them. On a full ring the entry at
    /// index 0 is overwritten and its bytes released from the accounting.
    pub fn enqueue(&mut self, msg: ControlMessage, tick: OutboxTick) -> Result<usize> {
        if msg.qos == 1 && msg.kind == ControlKind::Publish {
            return Err(OutflightError::control_ring(
                "QoS-1 publish does not belong in the control ring",
            ));
        }

        let entry = RingEntry {
            state: PendingState::Queued,
            tick,
            msg,
        };

        if let Some(idx) = self.entries.iter().position(|e| e.is_none()) {
            self.total_bytes += entry.msg.byte_size();
            self.entries[idx] = Some(entry);
            return Ok(idx);
        }

        warn!("control ring full, overwriting entry 0");
        self.release_at(0);
        self.total_bytes += entry.msg.byte_size();
        self.entries[0] = Some(entry);
        Ok(0)
    }

    /// Position of the occupied entry holding `msg_id`
    pub fn find(&self, msg_id: i32) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e, Some(entry) if entry.msg.msg_id == msg_id))
    }

    /// Borrow the entry at a position
    pub fn entry(&self, idx: usize) -> Option<&RingEntry> {
        self.entries.get(idx).and_then(Option::as_ref)
    }

    /// Update the state tag of the entry holding `msg_id`
    pub fn set_state(&mut self, msg_id: i32, state: PendingState) -> bool {
        match self.find(msg_id) {
            Some(idx) => {
                if let Some(entry) = self.entries[idx].as_mut() {
                    entry.state = state;
                }
                true
            }
            None => false,
        }
    }

    /// Update the tick of the entry holding `msg_id`
    pub fn set_tick(&mut self, msg_id: i32, tick: OutboxTick) -> bool {
        match self.find(msg_id) {
            Some(idx) => {
                if let Some(entry) = self.entries[idx].as_mut() {
                    entry.tick = tick;
                }
                true
            }
            None => false,
        }
    }

    /// Position of the first occupied entry in `state`
    pub fn dequeue_by_state(&self, state: PendingState) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e, Some(entry) if entry.state == state))
    }

    /// Remove the entry holding `msg_id`
    pub fn delete(&mut self, msg_id: i32) -> bool {
        match self.find(msg_id) {
            Some(idx) => {
                self.release_at(idx);
                true
            }
            None => false,
        }
    }

    /// Remove every entry older than `timeout` ticks, returning the count
    pub fn delete_expired(&mut self, now_tick: OutboxTick, timeout: OutboxTick) -> usize {
        let mut removed = 0;
        for idx in 0..self.entries.len() {
            if self.entry_expired(idx, now_tick, timeout) {
                self.release_at(idx);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "expired control entries");
        }
        removed
    }

    /// Remove at most one expired entry, returning its id
    pub fn delete_single_expired(
        &mut self,
        now_tick: OutboxTick,
        timeout: OutboxTick,
    ) -> Option<i32> {
        for idx in 0..self.entries.len() {
            if self.entry_expired(idx, now_tick, timeout) {
                let id = self.entries[idx].as_ref().map(|e| e.msg.msg_id);
                self.release_at(idx);
                return id;
            }
        }
        None
    }

    /// Drop every entry and zero the accounting
    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
        self.total_bytes = 0;
    }

    fn entry_expired(&self, idx: usize, now_tick: OutboxTick, timeout: OutboxTick) -> bool {
        matches!(
            &self.entries[idx],
            Some(entry) if now_tick.saturating_sub(entry.tick) > timeout
        )
    }

    fn release_at(&mut self, idx: usize) {
        if let Some(entry) = self.entries[idx].take() {
            let size = entry.msg.byte_size();
            if size > self.total_bytes {
                warn!("control ring byte accounting underflow, clamping to 0");
            }
            self.total_bytes = self.total_bytes.saturating_sub(size);
        }
    }
}
