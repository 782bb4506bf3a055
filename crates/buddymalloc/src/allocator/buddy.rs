use crate::heap::header::{BlockHeader, HEADER_SIZE};
use crate::heap::list::BlockList;
use crate::heap::order::{self, MAX_GRANULE};
use crate::heap::Heap;
use crate::large::MappedRegions;
use crate::util::MAX_REQUEST;
use core::cell::UnsafeCell;
use core::ptr;

struct Inner {
    heap: Heap,
    in_use: BlockList,
    mapped: MappedRegions,
}

/// The allocator: buddy arena for small and medium requests, standalone
/// page mappings for large ones, plus the introspection counters.
///
/// There is no locking anywhere in here. The allocator is single-threaded
/// by contract; every method's safety clause names that contract, and the
/// `Sync` impl exists only so the instance can live in a static.
pub struct BuddyAllocator {
    inner: UnsafeCell<Inner>,
}

unsafe impl Send for BuddyAllocator {}
unsafe impl Sync for BuddyAllocator {}

impl BuddyAllocator {
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        BuddyAllocator {
            inner: UnsafeCell::new(Inner {
                heap: Heap::new(),
                in_use: BlockList::new(),
                mapped: MappedRegions::new(),
            }),
        }
    }

    /// Claim the arena. Called once from init, after the cookie is drawn.
    /// Returns false when the break extension fails.
    ///
    /// # Safety
    /// Single-threaded; must not run twice.
    pub unsafe fn init(&self) -> bool {
        (*self.inner.get()).heap.init()
    }

    // ========================================================================
    // The four operations
    // ========================================================================

    /// Allocate `size` bytes. Null when `size` is zero, exceeds the
    /// request cap, or no memory is available.
    ///
    /// # Safety
    /// Single-threaded use only; the allocator must be initialised.
    pub unsafe fn malloc(&self, size: usize) -> *mut u8 {
        if size == 0 || size > MAX_REQUEST {
            return ptr::null_mut();
        }
        let inner = &mut *self.inner.get();
        let gross = size + HEADER_SIZE;

        if gross > MAX_GRANULE {
            let header = inner.mapped.alloc(size);
            if header.is_null() {
                return ptr::null_mut();
            }
            return (*header).payload;
        }

        let victim = inner.heap.take_fit(order::order_for(gross));
        if victim.is_null() {
            return ptr::null_mut();
        }
        inner.heap.split_to_fit(victim, gross);
        (*victim).is_free = false;
        (*victim).payload_size = size;
        inner.in_use.push_back(victim);
        (*victim).payload
    }

    /// Allocate a zeroed array of `num` elements of `size` bytes each.
    ///
    /// # Safety
    /// Single-threaded use only; the allocator must be initialised.
    pub unsafe fn calloc(&self, num: usize, size: usize) -> *mut u8 {
        if num == 0 || size == 0 {
            return ptr::null_mut();
        }
        let total = match num.checked_mul(size) {
            Some(t) => t,
            None => return ptr::null_mut(),
        };
        if total > MAX_REQUEST {
            return ptr::null_mut();
        }
        let p = self.malloc(total);
        if !p.is_null() {
            ptr::write_bytes(p, 0, total);
        }
        p
    }

    /// Release `p`. Null pointers and already-free blocks are ignored.
    /// Arena blocks coalesce with their buddies; mapped blocks return to
    /// the kernel.
    ///
    /// # Safety
    /// `p` must be null or a pointer returned by this allocator;
    /// single-threaded use only.
    pub unsafe fn free(&self, p: *mut u8) {
        if p.is_null() {
            return;
        }
        let header = BlockHeader::from_payload(p);
        BlockHeader::check(header);
        if (*header).is_free {
            return;
        }
        let inner = &mut *self.inner.get();

        if (*header).block_size > MAX_GRANULE {
            inner.mapped.free(header);
            return;
        }
        inner.in_use.unlink(header);
        (*header).is_free = true;
        (*header).payload_size = 0;
        inner.heap.coalesce(header);
    }

    /// Resize `oldp` to `size` bytes. Tries in-block reuse, then in-place
    /// growth through free buddies, then relocation. Never frees `oldp`
    /// when the request cannot be met.
    ///
    /// # Safety
    /// `oldp` must be null or a pointer returned by this allocator;
    /// single-threaded use only.
    pub unsafe fn realloc(&self, oldp: *mut u8, size: usize) -> *mut u8 {
        if size == 0 || size > MAX_REQUEST {
            return ptr::null_mut();
        }
        if oldp.is_null() {
            return self.malloc(size);
        }
        let header = BlockHeader::from_payload(oldp);
        BlockHeader::check(header);
        if (*header).is_free {
            // stale pointer to a released block; refuse rather than hand
            // out memory that sits on a free list
            return ptr::null_mut();
        }

        if (*header).block_size > MAX_GRANULE {
            return self.realloc_mapped(header, size);
        }

        let gross = size + HEADER_SIZE;
        if gross <= (*header).block_size {
            (*header).payload_size = size;
            return oldp;
        }

        // the inner borrow stays scoped to the grow attempt; the relocate
        // path below re-enters malloc/free which take their own borrow
        {
            let inner = &mut *self.inner.get();
            if gross <= MAX_GRANULE && inner.heap.grow_feasible(header, gross) {
                let old_payload = (*header).payload_size;
                inner.in_use.unlink(header);
                let survivor = inner.heap.grow_execute(header, gross);
                if survivor != header {
                    // the survivor sits below the original block; slide the
                    // payload down (regions may overlap)
                    ptr::copy((*header).payload, (*survivor).payload, old_payload);
                }
                (*survivor).is_free = false;
                (*survivor).payload_size = size;
                inner.in_use.push_back(survivor);
                return (*survivor).payload;
            }
        }

        // relocate: allocate, move the old payload, release the old block
        let old_payload = (*header).payload_size;
        let newp = self.malloc(size);
        if newp.is_null() {
            return ptr::null_mut();
        }
        ptr::copy_nonoverlapping(oldp, newp, old_payload.min(size));
        self.free(oldp);
        newp
    }

    /// Mapped-path realloc. Requesting the recorded payload size exactly
    /// is a no-op; anything else gets a fresh allocation, and the old
    /// mapping is released exactly once, after a successful copy.
    unsafe fn realloc_mapped(&self, header: *mut BlockHeader, size: usize) -> *mut u8 {
        if size == (*header).payload_size {
            return (*header).payload;
        }
        let old_payload = (*header).payload_size;
        let newp = self.malloc(size);
        if newp.is_null() {
            return ptr::null_mut();
        }
        ptr::copy_nonoverlapping((*header).payload, newp, old_payload.min(size));
        self.free((*header).payload);
        newp
    }

    // ========================================================================
    // Counters
    // ========================================================================

    /// Number of free blocks across the order lists.
    ///
    /// # Safety
    /// Single-threaded use only.
    pub unsafe fn num_free_blocks(&self) -> usize {
        (*self.inner.get()).heap.free_block_count()
    }

    /// Usable free bytes across the order lists.
    ///
    /// # Safety
    /// Single-threaded use only.
    pub unsafe fn num_free_bytes(&self) -> usize {
        (*self.inner.get()).heap.free_usable_bytes()
    }

    /// Total block count: free, in use and mapped together (the whole
    /// footprint, not just live allocations).
    ///
    /// # Safety
    /// Single-threaded use only.
    pub unsafe fn num_allocated_blocks(&self) -> usize {
        let inner = &*self.inner.get();
        inner.heap.free_block_count() + inner.in_use.count() + inner.mapped.count()
    }

    /// Total usable bytes across free, in-use and mapped blocks.
    ///
    /// # Safety
    /// Single-threaded use only.
    pub unsafe fn num_allocated_bytes(&self) -> usize {
        let inner = &*self.inner.get();
        inner.heap.free_usable_bytes() + inner.in_use.usable_bytes() + inner.mapped.usable_bytes()
    }

    /// Bytes spent on headers across the whole footprint.
    ///
    /// # Safety
    /// Single-threaded use only.
    pub unsafe fn num_meta_data_bytes(&self) -> usize {
        self.num_allocated_blocks() * HEADER_SIZE
    }

    /// Size of a single block header.
    pub fn size_meta_data(&self) -> usize {
        HEADER_SIZE
    }
}
