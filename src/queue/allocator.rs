//! Tiered slot admission: static pool, dynamic growth, oldest-victim eviction

use tracing::{debug, warn};

use crate::slots::{DynPool, Slot, SlotBank};

use super::config::QueueConfig;

/// Address of one slot across the two tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAddr {
    /// Index into the static pool
    Static(usize),
    /// Block index and slot index in the dynamic pool
    Dynamic { block: usize, slot: usize },
}

/// Two-tier slot allocator
///
/// Admission tries the tiers in order: a free static slot, a free slot in
/// an existing dynamic block, growth of a new block, and finally eviction
/// of the oldest occupant. Eviction is the documented lossy-degradation
/// mode; the victim's message will not be delivered reliably.
#[derive(Debug)]
pub struct SlotAllocator {
    static_pool: SlotBank,
    dyn_pool: DynPool,
}

impl SlotAllocator {
    /// Build both tiers from the configuration
    pub fn new(config: &QueueConfig) -> Self {
        Self {
            static_pool: SlotBank::new(config.static_slots, config.topic_max, config.payload_max),
            dyn_pool: DynPool::new(
                config.max_dynamic_blocks,
                config.dyn_block_slots,
                config.topic_max,
                config.payload_max,
            ),
        }
    }

    /// Acquire a free slot, growing or evicting as needed
    ///
    /// Returns `None` only when every pool is empty of occupants and no
    /// block can be allocated, which cannot happen with a validated
    /// configuration (the static tier always holds at least one slot).
    pub fn acquire(&mut self) -> Option<SlotAddr> {
        // Tier 1: static pool, scan order = index order.
        if let Some(idx) = self.static_pool.first_free() {
            return Some(SlotAddr::Static(idx));
        }

        // Tier 2: existing dynamic blocks, block order then slot order.
        for block in 0..self.dyn_pool.block_count() {
            if let Some(slot) = self.dyn_pool.block(block).bank().first_free() {
                debug!(block, slot, "reusing dynamic slot");
                self.dyn_pool.block_mut(block).mark_active();
                return Some(SlotAddr::Dynamic { block, slot });
            }
        }

        // Tier 3: grow a fresh block and hand out its first slot.
        if let Some(block) = self.dyn_pool.grow() {
            return Some(SlotAddr::Dynamic { block, slot: 0 });
        }

        // Tier 4: evict the oldest occupant and reuse its slot.
        self.evict_oldest()
    }

    /// Free the oldest occupied slot across both tiers and return it
    ///
    /// Ties are broken by scan order: static before dynamic, lower index
    /// first. The victim's id is lost; a later ack for it lands as a late
    /// ack.
    fn evict_oldest(&mut self) -> Option<SlotAddr> {
        let mut oldest_time = u64::MAX;
        let mut oldest: Option<SlotAddr> = None;

        for (idx, slot) in self.static_pool.iter().enumerate() {
            if slot.in_use && slot.timestamp_us < oldest_time {
                oldest_time = slot.timestamp_us;
                oldest = Some(SlotAddr::Static(idx));
            }
        }
        for (block, blk) in self.dyn_pool.iter().enumerate() {
            for (slot, record) in blk.bank().iter().enumerate() {
                if record.in_use && record.timestamp_us < oldest_time {
                    oldest_time = record.timestamp_us;
                    oldest = Some(SlotAddr::Dynamic { block, slot });
                }
            }
        }

        if let Some(addr) = oldest {
            warn!(
                msg_id = self.slot(addr).msg_id,
                "dropping oldest tracked message to admit new one"
            );
            self.release_raw(addr);
        }
        oldest
    }

    /// Borrow the slot record at `addr`
    pub fn slot(&self, addr: SlotAddr) -> &Slot {
        match addr {
            SlotAddr::Static(idx) => self.static_pool.slot(idx),
            SlotAddr::Dynamic { block, slot } => self.dyn_pool.block(block).bank().slot(slot),
        }
    }

    /// Mutably borrow the slot record at `addr`
    pub fn slot_mut(&mut self, addr: SlotAddr) -> &mut Slot {
        match addr {
            SlotAddr::Static(idx) => self.static_pool.slot_mut(idx),
            SlotAddr::Dynamic { block, slot } => {
                self.dyn_pool.block_mut(block).bank_mut().slot_mut(slot)
            }
        }
    }

    /// Copy a message into the slot at `addr` and mark it occupied
    pub fn fill(
        &mut self,
        addr: SlotAddr,
        topic: &str,
        payload: &[u8],
        retain: bool,
        msg_id: i32,
        now_us: u64,
    ) {
        match addr {
            SlotAddr::Static(idx) => {
                self.static_pool.fill(idx, topic, payload, retain, msg_id, now_us)
            }
            SlotAddr::Dynamic { block, slot } => self
                .dyn_pool
                .block_mut(block)
                .bank_mut()
                .fill(slot, topic, payload, retain, msg_id, now_us),
        }
    }

    /// Stored topic for the slot at `addr`
    pub fn topic(&self, addr: SlotAddr) -> &str {
        match addr {
            SlotAddr::Static(idx) => self.static_pool.topic(idx),
            SlotAddr::Dynamic { block, slot } => self.dyn_pool.block(block).bank().topic(slot),
        }
    }

    /// Stored payload for the slot at `addr`
    pub fn payload(&self, addr: SlotAddr) -> &[u8] {
        match addr {
            SlotAddr::Static(idx) => self.static_pool.payload(idx),
            SlotAddr::Dynamic { block, slot } => self.dyn_pool.block(block).bank().payload(slot),
        }
    }

    /// Release the slot at `addr`, stamping its block idle if it empties
    pub fn release(&mut self, addr: SlotAddr, now_us: u64) {
        self.release_raw(addr);
        if let SlotAddr::Dynamic { block, .. } = addr {
            let blk = self.dyn_pool.block_mut(block);
            if blk.bank().all_free() {
                blk.mark_idle(now_us);
            }
        }
    }

    /// Release without idle bookkeeping (eviction hands the slot straight back)
    fn release_raw(&mut self, addr: SlotAddr) {
        match addr {
            SlotAddr::Static(idx) => self.static_pool.release(idx),
            SlotAddr::Dynamic { block, slot } => {
                self.dyn_pool.block_mut(block).bank_mut().release(slot)
            }
        }
    }

    /// First occupied slot holding `msg_id`, static tier first
    pub fn find_by_msg_id(&self, msg_id: i32) -> Option<SlotAddr> {
        if let Some(idx) = self.static_pool.find_by_msg_id(msg_id) {
            return Some(SlotAddr::Static(idx));
        }
        for (block, blk) in self.dyn_pool.iter().enumerate() {
            if let Some(slot) = blk.bank().find_by_msg_id(msg_id) {
                return Some(SlotAddr::Dynamic { block, slot });
            }
        }
        None
    }

    /// Occupied slots across both tiers
    pub fn occupied(&self) -> usize {
        self.static_pool.occupied() + self.dyn_pool.occupied()
    }

    /// The always-resident tier
    pub fn static_pool(&self) -> &SlotBank {
        &self.static_pool
    }

    /// The elastic tier
    pub fn dyn_pool(&self) -> &DynPool {
        &self.dyn_pool
    }

    /// Mutable access to the elastic tier (sweeper reclamation)
    pub(crate) fn dyn_pool_mut(&mut self) -> &mut DynPool {
        &mut self.dyn_pool
    }

    /// Mutable access to the static tier (sweeper expiry)
    pub(crate) fn static_pool_mut(&mut self) -> &mut SlotBank {
        &mut self.static_pool
    }

    /// Free every slot and drop every dynamic block
    pub fn clear(&mut self) {
        self.static_pool.clear();
        self.dyn_pool.clear();
    }
}
