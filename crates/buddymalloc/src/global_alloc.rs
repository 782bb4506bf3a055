//! `#[global_allocator]` support for buddymalloc.
//!
//! Lets a Rust program route its heap through the buddy allocator:
//!
//! ```rust,ignore
//! use buddymalloc::BuddyMalloc;
//!
//! #[global_allocator]
//! static GLOBAL: BuddyMalloc = BuddyMalloc;
//! ```
//!
//! The allocator is single-threaded by contract, so this is only sound in
//! programs that never allocate from a second thread.

use crate::init;
use crate::util::MIN_ALIGN;
use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

/// A zero-sized unit struct that implements [`GlobalAlloc`] by delegating
/// to the buddy allocator. Alignments above the allocator's natural
/// alignment are refused with null -- stronger guarantees are out of
/// scope here.
pub struct BuddyMalloc;

unsafe impl GlobalAlloc for BuddyMalloc {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let size = layout.size();
        let align = layout.align();

        // Zero-size types: return a well-aligned dangling pointer.
        // This is the standard pattern used by the Rust standard library.
        if size == 0 {
            return align as *mut u8;
        }
        if align > MIN_ALIGN {
            return ptr::null_mut();
        }

        init::ensure_initialized();
        init::allocator().malloc(size)
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let size = layout.size();
        let align = layout.align();

        if size == 0 {
            return align as *mut u8;
        }
        if align > MIN_ALIGN {
            return ptr::null_mut();
        }

        init::ensure_initialized();
        init::allocator().calloc(1, size)
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        // A valid ptr implies alloc() already ran init.
        init::allocator().free(ptr);
    }

    #[inline]
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let align = layout.align();

        // Old allocation was zero-sized: this is effectively a fresh alloc.
        if layout.size() == 0 {
            return self.alloc(Layout::from_size_align_unchecked(new_size, align));
        }
        if align > MIN_ALIGN {
            return ptr::null_mut();
        }

        init::allocator().realloc(ptr, new_size)
    }
}
