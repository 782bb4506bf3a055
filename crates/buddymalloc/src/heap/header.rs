use crate::hardening::{self, cookie};
use core::ptr;

/// Per-block metadata record. Lives immediately before the payload it
/// describes, both for arena blocks and at the front of every page-mapped
/// region.
///
/// `block_size` is gross (header included): a power-of-two granule for
/// arena blocks, the exact mapped length for mapped blocks. That single
/// field also discriminates the two kinds -- arena blocks never exceed the
/// maximum granule, mapped blocks always do.
#[repr(C)]
pub struct BlockHeader {
    /// Process cookie; checked before the rest of the header is trusted.
    pub cookie: u32,
    pub is_free: bool,
    /// Gross size in bytes, header included.
    pub block_size: usize,
    /// Bytes the client asked for; zero while the block is free.
    pub payload_size: usize,
    /// Always `header address + HEADER_SIZE`.
    pub payload: *mut u8,
    pub next: *mut BlockHeader,
    pub prev: *mut BlockHeader,
}

/// Gross bytes occupied by a header.
pub const HEADER_SIZE: usize = core::mem::size_of::<BlockHeader>();

impl BlockHeader {
    /// Write a fresh header at `addr` and return it.
    ///
    /// # Safety
    /// `addr` must be valid for writes of `HEADER_SIZE` bytes and not
    /// overlap any live header or payload.
    pub unsafe fn init_at(addr: *mut u8, block_size: usize, is_free: bool) -> *mut BlockHeader {
        let header = addr as *mut BlockHeader;
        (*header).cookie = cookie::get();
        (*header).is_free = is_free;
        (*header).block_size = block_size;
        (*header).payload_size = 0;
        (*header).payload = addr.add(HEADER_SIZE);
        (*header).next = ptr::null_mut();
        (*header).prev = ptr::null_mut();
        header
    }

    /// Recover the header from a payload pointer handed back by a client.
    ///
    /// # Safety
    /// `payload` must be a pointer previously returned by this allocator.
    #[inline(always)]
    pub unsafe fn from_payload(payload: *mut u8) -> *mut BlockHeader {
        payload.sub(HEADER_SIZE) as *mut BlockHeader
    }

    /// Abort the process if `header` carries a foreign cookie. Null is
    /// ignored, so list code can validate `prev`/`next` unconditionally.
    ///
    /// # Safety
    /// `header`, when non-null, must be readable for `HEADER_SIZE` bytes.
    #[inline]
    pub unsafe fn check(header: *const BlockHeader) {
        if !header.is_null() && (*header).cookie != cookie::get() {
            hardening::integrity_abort("buddymalloc: block cookie mismatch (heap corruption)\n");
        }
    }

    /// Usable bytes: everything past the header.
    #[inline(always)]
    pub fn usable_size(&self) -> usize {
        self.block_size - HEADER_SIZE
    }
}
