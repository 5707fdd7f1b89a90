//! Periodic maintenance: timeout expiry and idle-block reclamation

use tracing::warn;

use crate::slots::SlotBank;

use super::allocator::SlotAllocator;
use super::config::QueueConfig;
use super::stats::QueueStats;

/// What one sweep did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Slots freed because their ack never arrived
    pub expired_slots: usize,
    /// Dynamic blocks returned to the allocator
    pub reclaimed_blocks: usize,
}

/// Expire overdue slots and reclaim idle dynamic blocks
///
/// Safe to run at any frequency; a sweep over an already-clean queue is a
/// no-op. Two passes over the dynamic tier: the first expires slots and
/// refreshes each block's idle bookkeeping, the second reclaims blocks
/// whose idle period has run out, compacting the pool in place.
pub fn sweep(
    alloc: &mut SlotAllocator,
    stats: &mut QueueStats,
    config: &QueueConfig,
    now_us: u64,
) -> SweepReport {
    let ack_timeout_us = config.ack_timeout.as_micros() as u64;
    let idle_timeout_us = config.dyn_block_idle_timeout.as_micros() as u64;
    let mut report = SweepReport::default();

    report.expired_slots += expire_bank(alloc.static_pool_mut(), now_us, ack_timeout_us);

    let dyn_pool = alloc.dyn_pool_mut();
    for block in dyn_pool.iter_mut() {
        report.expired_slots += expire_bank(block.bank_mut(), now_us, ack_timeout_us);
        if block.bank().all_free() {
            block.mark_idle(now_us);
        } else {
            block.mark_active();
        }
    }

    let mut idx = 0;
    while idx < dyn_pool.block_count() {
        if dyn_pool.block(idx).idle_expired(now_us, idle_timeout_us) {
            dyn_pool.remove_at(idx);
            report.reclaimed_blocks += 1;
            // Survivors shifted down; do not advance.
        } else {
            idx += 1;
        }
    }

    stats.record_timeouts(report.expired_slots as u64);
    report
}

/// Free every occupied slot in `bank` older than `thresh_us`
fn expire_bank(bank: &mut SlotBank, now_us: u64, thresh_us: u64) -> usize {
    let mut expired = 0;
    for idx in 0..bank.slot_count() {
        let slot = bank.slot(idx);
        if slot.in_use && now_us.saturating_sub(slot.timestamp_us) > thresh_us {
            warn!(msg_id = slot.msg_id, "ack timeout, freeing slot");
            bank.release(idx);
            expired += 1;
        }
    }
    expired
}
