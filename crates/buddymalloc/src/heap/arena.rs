use super::header::BlockHeader;
use super::list::BlockList;
use super::order::{self, granule, ARENA_ALIGN, ARENA_SIZE, MAX_GRANULE, NUM_ORDERS};
use crate::platform;
use crate::util::align_up;
use core::ptr;

/// The buddy arena: one 4 MiB break-extension region carved into
/// power-of-two blocks, indexed by the per-order free lists.
///
/// Blocks split on demand and coalesce with their address-XOR buddy on
/// free. The region is claimed once and never returned to the kernel.
pub struct Heap {
    free_lists: [BlockList; NUM_ORDERS],
}

impl Heap {
    pub const fn new() -> Self {
        const EMPTY: BlockList = BlockList::new();
        Heap {
            free_lists: [EMPTY; NUM_ORDERS],
        }
    }

    /// Claim and carve the arena. Runs once, from init.
    ///
    /// The break is pushed up to a 4 MiB boundary first so the address-XOR
    /// buddy of every interior block stays inside the arena, then extended
    /// by the arena itself. Returns false when the kernel refuses either
    /// extension.
    ///
    /// # Safety
    /// Single-threaded; must not run twice.
    pub unsafe fn init(&mut self) -> bool {
        let mut tries = 0;
        let base = loop {
            let cur = platform::current_break() as usize;
            let pad = align_up(cur, ARENA_ALIGN) - cur;
            if pad > 0 && platform::extend_break(pad).is_null() {
                return false;
            }
            let base = platform::extend_break(ARENA_SIZE);
            if base.is_null() {
                return false;
            }
            if (base as usize) % ARENA_ALIGN == 0 {
                break base;
            }
            // A foreign sbrk caller slipped in between the alignment step
            // and the reservation. Abandon the misaligned region and retry.
            tries += 1;
            if tries == 3 {
                return false;
            }
        };

        let mut offset = 0;
        while offset < ARENA_SIZE {
            let block = BlockHeader::init_at(base.add(offset), MAX_GRANULE, true);
            self.free_lists[order::MAX_ORDER].insert_sorted(block);
            offset += MAX_GRANULE;
        }
        true
    }

    /// Detach the best fit for `min_order`: the lowest address in the
    /// smallest feasible order. Null when the arena is exhausted.
    ///
    /// # Safety
    /// Single-threaded; the heap must be initialised.
    pub unsafe fn take_fit(&mut self, min_order: usize) -> *mut BlockHeader {
        for k in min_order..NUM_ORDERS {
            if !self.free_lists[k].is_empty() {
                return self.free_lists[k].pop_front();
            }
        }
        ptr::null_mut()
    }

    /// Split a detached victim down to the tightest granule that still
    /// holds `gross` bytes. Each cut-off upper half becomes a fresh free
    /// block on its order list; the caller keeps the surviving lower half.
    ///
    /// # Safety
    /// `victim` must be a valid detached header; single-threaded.
    pub unsafe fn split_to_fit(&mut self, victim: *mut BlockHeader, gross: usize) {
        BlockHeader::check(victim);
        while (*victim).block_size / 2 >= gross && (*victim).block_size > granule(0) {
            let half = (*victim).block_size / 2;
            (*victim).block_size = half;
            let upper = BlockHeader::init_at((victim as *mut u8).add(half), half, true);
            self.free_lists[order::of_granule(half)].insert_sorted(upper);
        }
    }

    /// Free-side coalescing. `block` arrives detached and already marked
    /// free; the walk climbs orders while the buddy is also free at the
    /// same granule. The lower-addressed header of each pair survives and
    /// absorbs the other.
    ///
    /// # Safety
    /// `block` must be a valid detached free header; single-threaded.
    pub unsafe fn coalesce(&mut self, block: *mut BlockHeader) {
        let mut cur = block;
        loop {
            let size = (*cur).block_size;
            if size >= MAX_GRANULE {
                self.free_lists[order::MAX_ORDER].insert_sorted(cur);
                return;
            }
            let buddy = ((cur as usize) ^ size) as *mut BlockHeader;
            BlockHeader::check(buddy);
            if !(*buddy).is_free || (*buddy).block_size != size {
                self.free_lists[order::of_granule(size)].insert_sorted(cur);
                return;
            }
            self.free_lists[order::of_granule(size)].unlink(buddy);
            let survivor = if (cur as usize) < (buddy as usize) {
                cur
            } else {
                buddy
            };
            (*survivor).block_size = size * 2;
            cur = survivor;
        }
    }

    /// Read-only feasibility walk for an in-place grow: can `block` reach
    /// `gross` bytes by absorbing its upward chain of buddies? The chain
    /// breaks as soon as a level's buddy is in use or of a different
    /// granule.
    ///
    /// # Safety
    /// `block` must be a valid in-use arena header; single-threaded.
    pub unsafe fn grow_feasible(&self, block: *mut BlockHeader, gross: usize) -> bool {
        let mut addr = block as usize;
        let mut size = (*block).block_size;
        while size < gross {
            if size >= MAX_GRANULE {
                return false;
            }
            let buddy = (addr ^ size) as *mut BlockHeader;
            BlockHeader::check(buddy);
            if !(*buddy).is_free || (*buddy).block_size != size {
                return false;
            }
            // the effective block at the next level is the lower of the pair
            addr = addr.min(buddy as usize);
            size *= 2;
        }
        true
    }

    /// Destructive counterpart of `grow_feasible`: detach each buddy and
    /// double the surviving header until `gross` fits. Returns the
    /// survivor, the lowest address seen along the chain. Must only run
    /// after the feasibility walk approved the same request.
    ///
    /// # Safety
    /// `block` must be a valid detached in-use header; single-threaded.
    pub unsafe fn grow_execute(&mut self, block: *mut BlockHeader, gross: usize) -> *mut BlockHeader {
        let mut cur = block;
        while (*cur).block_size < gross {
            let size = (*cur).block_size;
            let buddy = ((cur as usize) ^ size) as *mut BlockHeader;
            BlockHeader::check(buddy);
            self.free_lists[order::of_granule(size)].unlink(buddy);
            let survivor = if (cur as usize) < (buddy as usize) {
                cur
            } else {
                buddy
            };
            (*survivor).block_size = size * 2;
            cur = survivor;
        }
        cur
    }

    /// Number of free blocks across the order lists.
    ///
    /// # Safety
    /// Single-threaded.
    pub unsafe fn free_block_count(&self) -> usize {
        let mut n = 0;
        for list in &self.free_lists {
            n += list.count();
        }
        n
    }

    /// Usable free bytes (block size minus header) across the order lists.
    ///
    /// # Safety
    /// Single-threaded.
    pub unsafe fn free_usable_bytes(&self) -> usize {
        let mut total = 0;
        for list in &self.free_lists {
            total += list.usable_bytes();
        }
        total
    }
}
