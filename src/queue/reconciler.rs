//! Acknowledgement settlement and provisional-id rebinding

use tracing::{info, warn};

use super::allocator::{SlotAddr, SlotAllocator};
use super::stats::QueueStats;

/// Settle an acknowledgement against the slot holding `msg_id`
///
/// Scans the static tier, then dynamic blocks in order. On a hit the slot
/// is freed and, if its block emptied, the block's idle stamp is set. On
/// a miss the ack is late (duplicate, post-timeout, or post-eviction):
/// it is counted and logged, never an error.
///
/// Returns whether a slot was settled, making duplicate acks a visible
/// no-op for callers that care.
pub fn settle_ack(
    alloc: &mut SlotAllocator,
    stats: &mut QueueStats,
    msg_id: i32,
    now_us: u64,
) -> bool {
    match alloc.find_by_msg_id(msg_id) {
        Some(addr) => {
            alloc.release(addr, now_us);
            match addr {
                SlotAddr::Static(idx) => info!(msg_id, slot = idx, "ack settled (static)"),
                SlotAddr::Dynamic { block, slot } => {
                    info!(msg_id, block, slot, "ack settled (dynamic)")
                }
            }
            true
        }
        None => {
            stats.record_late_ack();
            warn!(msg_id, "late ack: no matching slot");
            false
        }
    }
}

/// Update a slot's provisional id to the transport's final id in place
///
/// Provisional ids may be negative (handles minted before the transport
/// assigned a real id). The rebind is skipped when the provisional id is
/// zero, the final id is not a valid transport id, or the two are equal;
/// an unmatched provisional id is logged as a miss and left alone.
pub fn rebind_msg_id(alloc: &mut SlotAllocator, provisional_id: i32, final_id: i32) {
    if provisional_id == 0 || final_id <= 0 || provisional_id == final_id {
        return;
    }

    match alloc.find_by_msg_id(provisional_id) {
        Some(addr) => {
            alloc.slot_mut(addr).msg_id = final_id;
            match addr {
                SlotAddr::Static(idx) => {
                    info!(provisional_id, final_id, slot = idx, "rebound msg id (static)")
                }
                SlotAddr::Dynamic { block, slot } => {
                    info!(provisional_id, final_id, block, slot, "rebound msg id (dynamic)")
                }
            }
        }
        None => {
            warn!(provisional_id, final_id, "rebind miss: provisional id not found");
        }
    }
}
