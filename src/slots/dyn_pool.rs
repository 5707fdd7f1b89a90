//! Ordered, bounded collection of dynamic blocks

use tracing::{info, warn};

use super::dyn_block::DynBlock;

/// The second tier of the slot queue
///
/// Blocks are kept in allocation order; removing one shifts the survivors
/// down so scan order stays stable. Growth is bounded by `max_blocks`.
#[derive(Debug)]
pub struct DynPool {
    blocks: Vec<DynBlock>,
    max_blocks: usize,
    slots_per_block: usize,
    topic_cap: usize,
    payload_cap: usize,
}

impl DynPool {
    /// Create an empty pool
    pub fn new(
        max_blocks: usize,
        slots_per_block: usize,
        topic_cap: usize,
        payload_cap: usize,
    ) -> Self {
        Self {
            blocks: Vec::new(),
            max_blocks,
            slots_per_block,
            topic_cap,
            payload_cap,
        }
    }

    /// Number of live blocks
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Slots per block
    pub fn slots_per_block(&self) -> usize {
        self.slots_per_block
    }

    /// Whether another block may be allocated
    pub fn can_grow(&self) -> bool {
        self.blocks.len() < self.max_blocks
    }

    /// Allocate and append a new block, returning its index
    ///
    /// Returns `None` when the pool is at its block limit. An allocation
    /// failure in the underlying buffers aborts in Rust rather than
    /// returning null, so the bound is the only growth refusal here.
    pub fn grow(&mut self) -> Option<usize> {
        if !self.can_grow() {
            warn!(max_blocks = self.max_blocks, "dynamic pool at block limit");
            return None;
        }
        self.blocks.push(DynBlock::new(
            self.slots_per_block,
            self.topic_cap,
            self.payload_cap,
        ));
        let idx = self.blocks.len() - 1;
        info!(
            block = idx,
            slots = self.slots_per_block,
            "allocated dynamic block"
        );
        Some(idx)
    }

    /// Remove the block at `idx`, compacting to preserve order
    pub fn remove_at(&mut self, idx: usize) {
        self.blocks.remove(idx);
        info!(block = idx, remaining = self.blocks.len(), "freed dynamic block");
    }

    /// Borrow a block
    pub fn block(&self, idx: usize) -> &DynBlock {
        &self.blocks[idx]
    }

    /// Mutably borrow a block
    pub fn block_mut(&mut self, idx: usize) -> &mut DynBlock {
        &mut self.blocks[idx]
    }

    /// Iterate blocks in allocation order
    pub fn iter(&self) -> impl Iterator<Item = &DynBlock> {
        self.blocks.iter()
    }

    /// Iterate blocks mutably in allocation order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DynBlock> {
        self.blocks.iter_mut()
    }

    /// Total occupied slots across all blocks
    pub fn occupied(&self) -> usize {
        self.blocks.iter().map(|b| b.bank().occupied()).sum()
    }

    /// Drop every block
    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}
