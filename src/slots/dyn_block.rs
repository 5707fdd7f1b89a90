//! Elastic overflow block of slots

use tracing::debug;

use super::bank::SlotBank;

/// A contiguously-allocated group of overflow slots
///
/// Blocks live between the first burst that needs them and the sweep that
/// reclaims them. `idle_since` records when the block last became fully
/// free; it is `None` while any slot is occupied (and on fresh
/// allocation), which keeps a busy block from ever being reclaimed.
#[derive(Debug)]
pub struct DynBlock {
    bank: SlotBank,
    idle_since: Option<u64>,
}

impl DynBlock {
    /// Allocate a block with every slot free
    pub fn new(slot_count: usize, topic_cap: usize, payload_cap: usize) -> Self {
        Self {
            bank: SlotBank::new(slot_count, topic_cap, payload_cap),
            idle_since: None,
        }
    }

    /// The slot strip backing this block
    pub fn bank(&self) -> &SlotBank {
        &self.bank
    }

    /// Mutable access to the slot strip
    pub fn bank_mut(&mut self) -> &mut SlotBank {
        &mut self.bank
    }

    /// When the block last became fully free, if it currently is
    pub fn idle_since(&self) -> Option<u64> {
        self.idle_since
    }

    /// Mark the block active again (a slot was acquired)
    pub fn mark_active(&mut self) {
        self.idle_since = None;
    }

    /// Stamp the moment the block became fully free
    ///
    /// Keeps an earlier stamp if one is already set, so repeated sweeps do
    /// not push the reclamation deadline forward.
    pub fn mark_idle(&mut self, now_us: u64) {
        if self.idle_since.is_none() {
            self.idle_since = Some(now_us);
            debug!(idle_since_us = now_us, "dynamic block fully free");
        }
    }

    /// Whether the block has been fully free for longer than `timeout_us`
    pub fn idle_expired(&self, now_us: u64, timeout_us: u64) -> bool {
        match self.idle_since {
            Some(t) => self.bank.all_free() && now_us.saturating_sub(t) > timeout_us,
            None => false,
        }
    }
}
